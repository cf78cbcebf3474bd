use std::{fs, path::PathBuf};

use tempfile::tempdir;

use metascope::MetascopeError;
use metascope_cli::{Args, Mode, run};

fn fixtures_path() -> PathBuf {
    // Fixtures are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|crates| crates.parent())
        .expect("Crate lives two levels below the workspace root")
        .join("fixtures")
}

/// Collects all .toml files from a directory
fn collect_toml_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(input: &PathBuf, output: &PathBuf, mode: Mode) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        mode,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let fixtures = collect_toml_files(fixtures_path());

    assert!(!fixtures.is_empty(), "No fixtures found in fixtures/");

    let mut failed = Vec::new();

    for fixture in &fixtures {
        let stem = fixture
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        for (mode, suffix) in [(Mode::Export, "export"), (Mode::Graph, "graph")] {
            let output = temp_dir.path().join(format!("{stem}.{suffix}.json"));
            if let Err(err) = run(&args(fixture, &output, mode)) {
                failed.push((fixture.clone(), mode, err));
                continue;
            }

            let written = fs::read_to_string(&output).expect("Output file written");
            if let Err(err) = serde_json::from_str::<serde_json::Value>(&written) {
                let err = MetascopeError::Serialization(err.to_string());
                failed.push((fixture.clone(), mode, err));
            }
        }
    }

    if !failed.is_empty() {
        eprintln!("\nFixtures that failed:");
        for (path, mode, err) in &failed {
            eprintln!("  - {} ({mode:?}): {}", path.display(), err);
        }
        panic!("{} fixture run(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_export_of_sales_fixture() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = fixtures_path().join("sales.toml");
    let output = temp_dir.path().join("sales.json");

    run(&args(&input, &output, Mode::Export)).expect("Export succeeds");

    let written = fs::read_to_string(&output).expect("Output file written");
    let json: serde_json::Value = serde_json::from_str(&written).expect("Valid JSON");
    let ids: Vec<&str> = json["domain_classes"]
        .as_array()
        .expect("Array of records")
        .iter()
        .filter_map(|record| record["id"].as_str())
        .collect();

    assert!(ids.contains(&"sales.Customer"));
    assert!(ids.contains(&"sales.Order"), "Lazily discovered type exported");
    let mut sorted = ids.clone();
    sorted.sort_unstable();
    assert_eq!(ids, sorted);
}

#[test]
fn e2e_graph_of_hierarchy_fixture() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = fixtures_path().join("hierarchy.toml");
    let output = temp_dir.path().join("hierarchy.json");

    run(&args(&input, &output, Mode::Graph)).expect("Graph succeeds");

    let written = fs::read_to_string(&output).expect("Output file written");
    let json: serde_json::Value = serde_json::from_str(&written).expect("Valid JSON");
    let inheritance = json["relations"]
        .as_array()
        .expect("Array of relations")
        .iter()
        .filter(|relation| relation["kind"] == "INHERITANCE")
        .count();

    // Manager -> Employee and Employee -> Person; Manager -> Person is implied
    assert_eq!(inheritance, 2);
}

#[test]
fn e2e_duplicate_fixture_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = fixtures_path().join("invalid").join("duplicate.toml");
    let output = temp_dir.path().join("duplicate.json");

    let result = run(&args(&input, &output, Mode::Export));

    let Err(MetascopeError::DuplicateLogicalTypes(err)) = result else {
        panic!("Expected a duplicate logical type error");
    };
    assert_eq!(err.mappings().len(), 1);
    assert!(!output.exists(), "No partial output is written");
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let input = temp_dir.path().join("absent.toml");
    let output = temp_dir.path().join("absent.json");

    let result = run(&args(&input, &output, Mode::Export));

    assert!(matches!(result, Err(MetascopeError::Io(_))));
}
