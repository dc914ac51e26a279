//! Result output for the CLI
//!
//! Result lines keep a fixed plain format so they can be diffed between
//! strategies; only headers are styled.

use crate::compare::ComparisonOutcome;
use crate::config::RunConfig;
use crate::hashing::HashGroups;
use crate::pipeline::{HashTimings, PipelineResult};
use crate::tree::Bst;
use console::style;
use std::io::{self, Write};

/// Print a header at the start of the run
pub fn print_header(config: &RunConfig, tree_count: usize) {
    println!();
    println!(
        "{} {}",
        style("bst-equiv").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Input:").bold(), config.input_path.display());
    println!("  {} {}", style("Trees:").bold(), tree_count);
    println!(
        "  {} {}",
        style("Hashing:").bold(),
        config.pipeline.hash_strategy
    );
    match config.pipeline.compare_strategy {
        Some(strategy) => println!("  {} {}", style("Comparison:").bold(), strategy),
        None => println!("  {} {}", style("Comparison:").bold(), style("disabled").dim()),
    }
    println!();
}

/// Format one bucket as `hash: i j k`
pub fn format_bucket(hash: i64, indices: &[usize]) -> String {
    let mut line = format!("{}:", hash);
    for index in indices {
        line.push_str(&format!(" {}", index));
    }
    line
}

/// Format one group as `group n: i j k`
pub fn format_group(number: usize, members: &[usize]) -> String {
    let mut line = format!("group {}:", number);
    for member in members {
        line.push_str(&format!(" {}", member));
    }
    line
}

/// Write shared buckets in ascending hash order
pub fn write_hash_groups<W: Write>(out: &mut W, groups: &HashGroups) -> io::Result<()> {
    for (hash, indices) in groups.shared_buckets() {
        writeln!(out, "{}", format_bucket(hash, indices))?;
    }
    Ok(())
}

/// Write equivalence groups numbered from 0
pub fn write_comparison<W: Write>(out: &mut W, outcome: &ComparisonOutcome) -> io::Result<()> {
    writeln!(out, "compareTreeTime: {:?}", outcome.compare_time)?;
    for (number, members) in outcome.groups.iter().enumerate() {
        writeln!(out, "{}", format_group(number, members))?;
    }
    Ok(())
}

/// Write the full run result
pub fn write_result<W: Write>(out: &mut W, result: &PipelineResult) -> io::Result<()> {
    writeln!(out, "hashTime: {:?}", result.hash.hash_time)?;
    writeln!(out, "hashGroupTime: {:?}", result.hash_group_time)?;
    write_hash_groups(out, &result.hash.groups)?;

    if let Some(ref comparison) = result.comparison {
        write_comparison(out, comparison)?;
    }
    Ok(())
}

/// Write hash-only timings
pub fn write_hash_timings<W: Write>(out: &mut W, timings: &HashTimings) -> io::Result<()> {
    writeln!(out, "Time taken for nTrees threads: {:?}", timings.per_tree)?;
    writeln!(
        out,
        "Time taken for {} threads: {:?}",
        timings.workers, timings.partitioned
    )
}

/// Write each tree's in-order sequence, one per line
pub fn write_trees<W: Write>(out: &mut W, trees: &[Bst]) -> io::Result<()> {
    for (index, tree) in trees.iter().enumerate() {
        writeln!(out, "{}: {}", index, tree.to_in_order_string())?;
    }
    Ok(())
}

/// Print a short summary line after the result
pub fn print_summary(result: &PipelineResult) {
    let buckets = result.hash.groups.len();
    let shared = result.hash.groups.shared_buckets().count();

    println!();
    println!("{}", style("Run Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {} ({} shared)", style("Buckets:").bold(), buckets, shared);
    if let Some(ref comparison) = result.comparison {
        println!(
            "  {} {} ({} matched)",
            style("Comparisons:").bold(),
            comparison.comparisons,
            comparison.matches
        );
        println!("  {} {}", style("Groups:").bold(), comparison.groups.len());
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashOutcome;
    use std::time::Duration;

    #[test]
    fn test_format_lines() {
        assert_eq!(format_bucket(780, &[0, 1]), "780: 0 1");
        assert_eq!(format_bucket(-10, &[2, 5, 9]), "-10: 2 5 9");
        assert_eq!(format_group(0, &[0, 1]), "group 0: 0 1");
    }

    #[test]
    fn test_write_result_without_comparison() {
        let mut groups = HashGroups::new();
        groups.insert(780, 0);
        groups.insert(780, 1);
        groups.insert(145, 2);
        let result = PipelineResult {
            hash: HashOutcome {
                groups,
                hash_time: Duration::from_micros(5),
            },
            hash_group_time: Duration::from_micros(7),
            comparison: None,
        };

        let mut out = Vec::new();
        write_result(&mut out, &result).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["hashTime: 5µs", "hashGroupTime: 7µs", "780: 0 1"]);
    }

    #[test]
    fn test_write_comparison() {
        let outcome = ComparisonOutcome {
            groups: vec![vec![0, 1], vec![3, 4, 7]],
            compare_time: Duration::from_millis(2),
            comparisons: 4,
            matches: 4,
        };
        let mut out = Vec::new();
        write_comparison(&mut out, &outcome).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "compareTreeTime: 2ms\ngroup 0: 0 1\ngroup 1: 3 4 7\n"
        );
    }

    #[test]
    fn test_write_trees() {
        let trees = vec![Bst::from_values(&[2, 1, 3]).unwrap()];
        let mut out = Vec::new();
        write_trees(&mut out, &trees).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0: 1 2 3\n");
    }
}
