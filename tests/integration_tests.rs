//! Integration tests for bst-equiv
//!
//! These run the full load → hash → compare pipeline over temporary input
//! files and check that every strategy combination agrees.

use bst_equiv::compare::{compare_trees, CompareStrategy};
use bst_equiv::config::PipelineConfig;
use bst_equiv::error::{ConfigError, EquivError, LoadError};
use bst_equiv::hashing::{group_trees, partition, HashStrategy};
use bst_equiv::pipeline::Pipeline;
use bst_equiv::report;
use bst_equiv::tree::{load_trees, Bst};
use std::io::Write;
use tempfile::NamedTempFile;

fn write_input(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// 40 trees drawn from 6 value multisets, each row a different insertion order
fn generated_input() -> String {
    let bases: [&[i64]; 6] = [
        &[50, 20, 70, 10, 30, 60, 80],
        &[5, 3, 8],
        &[1, 1, 2, 3],
        &[100],
        &[-4, 0, 4, 9],
        &[7, 7, 7],
    ];

    let mut lines = Vec::new();
    for i in 0..40 {
        let base = bases[i % bases.len()];
        let mut row = base.to_vec();
        let shift = i % row.len();
        row.rotate_left(shift);
        lines.push(
            row.iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    lines.join("\n")
}

fn expected_classes(n: usize, classes: usize) -> Vec<Vec<usize>> {
    (0..classes)
        .map(|c| (c..n).step_by(classes).collect::<Vec<_>>())
        .filter(|g| g.len() > 1)
        .collect()
}

#[test]
fn test_scenario_equal_rows() {
    let input = write_input("5 3 8\n8 3 5\n1 2 3\n");
    let trees = load_trees(input.path()).unwrap();

    let result = Pipeline::new(PipelineConfig::new(1, 1, 1).unwrap())
        .run(&trees)
        .unwrap();

    let comparison = result.comparison.unwrap();
    assert_eq!(comparison.groups, vec![vec![0, 1]]);
}

#[test]
fn test_scenario_partitioned_hashing() {
    let ranges = partition(10, 4);
    let sizes: Vec<_> = ranges.iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![3, 3, 2, 2]);

    let input = write_input(&generated_input());
    let trees: Vec<Bst> = load_trees(input.path()).unwrap().into_iter().take(10).collect();

    let sequential = group_trees(&trees, HashStrategy::Sequential).unwrap().groups;
    let channel = group_trees(&trees, HashStrategy::select(4, 1).unwrap())
        .unwrap()
        .groups;
    let locked = group_trees(&trees, HashStrategy::select(4, 4).unwrap())
        .unwrap()
        .groups;

    assert_eq!(channel.normalized(), sequential.normalized());
    assert_eq!(locked.normalized(), sequential.normalized());
}

#[test]
fn test_scenario_comparison_disabled() {
    let input = write_input("5 3 8\n8 3 5\n");
    let trees = load_trees(input.path()).unwrap();

    let result = Pipeline::new(PipelineConfig::new(2, 1, 0).unwrap())
        .run(&trees)
        .unwrap();
    assert!(result.comparison.is_none());

    let mut out = Vec::new();
    report::write_result(&mut out, &result).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("hashTime:"));
    assert!(!text.contains("compareTreeTime"));
    assert!(!text.contains("group"));
}

#[test]
fn test_all_strategy_combinations_agree() {
    let input = write_input(&generated_input());
    let trees = load_trees(input.path()).unwrap();
    assert_eq!(trees.len(), 40);

    let expected = expected_classes(trees.len(), 6);

    for (hash_workers, data_workers) in [(1, 1), (3, 1), (7, 2), (64, 1)] {
        for comp in [
            CompareStrategy::Sequential,
            CompareStrategy::Unbounded,
            CompareStrategy::WorkerPool {
                workers: 2,
                queue_capacity: 1,
            },
            CompareStrategy::WorkerPool {
                workers: 6,
                queue_capacity: 6,
            },
        ] {
            let config = PipelineConfig::new(hash_workers, data_workers, 1)
                .unwrap()
                .with_compare_strategy(Some(comp));
            let result = Pipeline::new(config).run(&trees).unwrap();

            assert_eq!(result.hash.groups.tree_count(), trees.len());
            let comparison = result.comparison.unwrap();
            assert_eq!(
                comparison.groups, expected,
                "hash {hash_workers}/{data_workers}, compare {comp}"
            );
        }
    }
}

#[test]
fn test_comparisons_limited_to_buckets() {
    let input = write_input(&generated_input());
    let trees = load_trees(input.path()).unwrap();
    let groups = group_trees(&trees, HashStrategy::Sequential).unwrap().groups;

    let outcome = compare_trees(&trees, &groups, CompareStrategy::Sequential).unwrap();
    assert_eq!(outcome.comparisons as usize, groups.candidate_count());
    assert!(outcome.comparisons < (trees.len() * (trees.len() - 1) / 2) as u64);
}

#[test]
fn test_degenerate_worker_counts_rejected() {
    assert!(matches!(
        PipelineConfig::new(0, 1, 0),
        Err(ConfigError::InvalidWorkerCount { .. })
    ));
    assert!(matches!(
        PipelineConfig::new(4, 0, 0),
        Err(ConfigError::InvalidWorkerCount { .. })
    ));
    assert!(matches!(
        CompareStrategy::select(4, false, Some(0)),
        Err(ConfigError::InvalidQueueSize { size: 0 })
    ));
}

#[test]
fn test_malformed_input() {
    let input = write_input("1 2 3\n4 five\n");
    let err = load_trees(input.path()).unwrap_err();
    assert!(matches!(err, LoadError::InvalidToken { line: 2, .. }));

    let err: EquivError = err.into();
    assert!(err.to_string().starts_with("Input error"));
}

#[test]
fn test_sorted_input_long_chain() {
    let row = (0..5_000).map(|v| v.to_string()).collect::<Vec<_>>().join(" ");
    let input = write_input(&format!("{row}\n{row}\n"));
    let trees = load_trees(input.path()).unwrap();

    let result = Pipeline::new(PipelineConfig::new(2, 2, 2).unwrap())
        .run(&trees)
        .unwrap();
    assert_eq!(result.comparison.unwrap().groups, vec![vec![0, 1]]);
}
