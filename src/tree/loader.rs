//! Tree input parsing
//!
//! Each non-blank line holds whitespace-separated integers. The first integer
//! is the root; the rest are inserted in the order they appear.

use crate::error::{LoadError, LoadResult};
use crate::tree::bst::{Bst, Value};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Load all trees from a file
pub fn load_trees(path: &Path) -> LoadResult<Vec<Bst>> {
    let file = File::open(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let trees = parse_trees(BufReader::new(file)).map_err(|e| match e {
        LoadError::Read { source, .. } => LoadError::Read {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;

    debug!(path = %path.display(), trees = trees.len(), "Trees loaded");
    Ok(trees)
}

/// Parse trees from any buffered reader, one tree per non-blank line
pub fn parse_trees<R: BufRead>(reader: R) -> LoadResult<Vec<Bst>> {
    let mut trees = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| LoadError::Read {
            path: Default::default(),
            source,
        })?;

        if let Some(tree) = parse_line(idx + 1, &line)? {
            trees.push(tree);
        }
    }

    Ok(trees)
}

/// Parse a single line; `None` for a blank line
pub fn parse_line(line_no: usize, line: &str) -> LoadResult<Option<Bst>> {
    let values = line
        .split_whitespace()
        .map(|token| {
            token.parse::<Value>().map_err(|_| LoadError::InvalidToken {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect::<LoadResult<Vec<_>>>()?;

    Ok(Bst::from_values(&values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_rows() {
        let input = "5 3 8\n8 3 5\n1 2 3\n";
        let trees = parse_trees(Cursor::new(input)).unwrap();
        assert_eq!(trees.len(), 3);
        assert_eq!(trees[0].in_order_values(), vec![3, 5, 8]);
        assert_eq!(trees[1].root_value(), 8);
        assert_eq!(trees[2].in_order_values(), vec![1, 2, 3]);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let trees = parse_trees(Cursor::new("1 2\n\n   \n-4\t9\n")).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[1].in_order_values(), vec![-4, 9]);
    }

    #[test]
    fn test_invalid_token() {
        let err = parse_trees(Cursor::new("1 2\n3 four 5\n")).unwrap_err();
        match err {
            LoadError::InvalidToken { line, token } => {
                assert_eq!(line, 2);
                assert_eq!(token, "four");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = load_trees(Path::new("/nonexistent/trees.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
