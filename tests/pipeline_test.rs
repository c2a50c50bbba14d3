//! End-to-end tests for the packing pipeline
//!
//! Each test builds a small Python repository in its own temp directory
//! and runs the public `Pipeline` API over it.

use contextpack::config::PackConfig;
use contextpack::parsers::python;
use contextpack::{Pipeline, Strategy};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// main.py -> utils.py, core/config.py; utils.py -> core; core -> core/helper.py
fn mock_repo() -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let root = dir.path();
    write(
        root,
        "main.py",
        r#""""Application entry point."""
import os
import utils
from core import config


def main():
    utils.run(config.SETTINGS)


if __name__ == "__main__":
    main()
"#,
    );
    write(
        root,
        "utils.py",
        r#"import core


def run(settings):
    """Run with settings."""
    return core.helper.apply(settings)
"#,
    );
    write(root, "core/__init__.py", "from . import helper\n");
    write(root, "core/config.py", "SETTINGS = {\"debug\": False}\n");
    write(
        root,
        "core/helper.py",
        "def apply(settings):\n    return dict(settings)\n",
    );
    dir
}

fn config_with_budget(total: usize) -> PackConfig {
    let mut config = PackConfig::default();
    config.budget.total = total;
    config.budget.oracle = "chars".to_string();
    config
}

#[test]
fn test_mock_repo_graph() {
    let dir = mock_repo();
    let outcome = Pipeline::new(PackConfig::default())
        .run(dir.path())
        .expect("pipeline should run");

    let main = &outcome.dependencies["main.py"];
    assert!(main.is_entry_point);
    assert!(main.dependencies.contains("utils.py"));
    assert!(main.dependencies.contains("core/config.py"));

    let config = &outcome.dependencies["core/config.py"];
    assert!(config.centrality() >= 1.0);
    assert_eq!(config.in_degree, 1);
    assert_eq!(config.out_degree, 0);

    assert!(outcome.dependencies["utils.py"]
        .dependencies
        .contains("core/__init__.py"));
    assert!(outcome.dependencies["core/__init__.py"]
        .dependencies
        .contains("core/helper.py"));

    assert!(outcome.external_imports.contains("os"));
    assert_eq!(
        outcome.entry_points.iter().collect::<Vec<_>>(),
        vec!["main.py"]
    );
}

#[test]
fn test_centrality_is_in_minus_out_for_every_file() {
    let dir = mock_repo();
    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();

    for (path, record) in &outcome.dependencies {
        assert_eq!(
            record.centrality(),
            record.in_degree as f64 - record.out_degree as f64,
            "{path}"
        );
        assert!(!record.dependencies.contains(path), "{path} depends on itself");
    }
}

#[test]
fn test_decisions_are_in_packing_order() {
    let dir = mock_repo();
    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();

    assert_eq!(outcome.decisions.len(), 5);
    for pair in outcome.decisions.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.priority_rank >= b.priority_rank);
        if a.priority_rank == b.priority_rank {
            assert!(a.centrality() >= b.centrality());
        }
        assert_eq!(a.priority_rank, a.strategy.priority_rank());
    }
}

#[test]
fn test_everything_packed_under_a_large_budget() {
    let dir = mock_repo();
    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();
    let doc = &outcome.document;

    assert_eq!(doc.included.len(), 5);
    assert!(doc.omitted.is_empty());
    assert!(doc.text.starts_with("# Repository Scaffold: "));
    assert!(doc.text.contains("## File: core/config.py"));
    assert!(doc.total_size <= doc.budget);
}

#[test]
fn test_small_budget_is_a_strict_prefix() {
    let dir = mock_repo();
    let full = Pipeline::new(config_with_budget(1_000_000))
        .run(dir.path())
        .unwrap();
    let full_order: Vec<&String> = full
        .decisions
        .iter()
        .filter(|d| d.strategy != Strategy::Skip)
        .map(|d| &d.file_path)
        .collect();

    let budget = 400;
    let outcome = Pipeline::new(config_with_budget(budget))
        .run(dir.path())
        .unwrap();
    let doc = &outcome.document;

    assert!(doc.total_size <= budget);
    assert!(!doc.omitted.is_empty());
    assert_eq!(doc.included.len() + doc.omitted.len(), full_order.len());

    let packed: Vec<&String> = doc.included.iter().chain(doc.omitted.iter()).collect();
    assert_eq!(packed, full_order);
}

#[test]
fn test_test_and_mock_files() {
    let dir = mock_repo();
    write(dir.path(), "test_main.py", "def test_it():\n    assert True\n");
    write(dir.path(), "tests/test_utils.py", "def test_run():\n    pass\n");
    write(dir.path(), "mock_server.py", "class MockServer:\n    pass\n");
    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();

    // Test files are never collected
    assert!(!outcome.dependencies.contains_key("test_main.py"));
    assert!(!outcome.dependencies.contains_key("tests/test_utils.py"));

    // Mock files are routed but skipped
    let mock = outcome
        .decisions
        .iter()
        .find(|d| d.file_path == "mock_server.py")
        .expect("mock decision");
    assert_eq!(mock.strategy, Strategy::Skip);
    assert_eq!(mock.priority_rank, 1);
    assert!(!outcome.document.text.contains("MockServer"));
}

#[test]
fn test_mid_richness_file_is_minimal_and_drops_imports() {
    let dir = mock_repo();
    let mut service = String::from("\"\"\"Service layer.\"\"\"\nimport json\n\n");
    for i in 0..5 {
        service.push_str(&format!(
            "def handler_{i}(request):\n    \"\"\"Handle {i}.\"\"\"\n    return json.dumps(request)\n\n"
        ));
    }
    write(dir.path(), "service.py", &service);

    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();
    let decision = outcome
        .decisions
        .iter()
        .find(|d| d.file_path == "service.py")
        .unwrap();
    assert_eq!(decision.strategy, Strategy::Minimal);

    let text = &outcome.document.text;
    let block_start = text.find("## File: service.py").unwrap();
    let block = &text[block_start..];
    let block = &block[..block.find("\n```\n").unwrap()];
    assert!(block.contains("def handler_0(request):"));
    assert!(block.contains("\"\"\"Handle 4.\"\"\""));
    assert!(!block.contains("import json"));
    assert!(!block.contains("json.dumps"));
}

#[test]
fn test_signature_output_reparses() {
    let dir = mock_repo();
    let mut heavy = String::from("import re\n\n");
    for i in 0..12 {
        heavy.push_str(&format!(
            "def rule_{i}(text):\n    \"\"\"Rule {i}.\"\"\"\n    if text and re.match('a', text):\n        return 1\n    return 0\n\n"
        ));
    }
    heavy.push_str(
        "try:\n    import regex\nexcept ImportError:\n    def fallback(text):\n        cached_text = text\n        return cached_text\n",
    );
    write(dir.path(), "rules.py", &heavy);

    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();
    let decision = outcome
        .decisions
        .iter()
        .find(|d| d.file_path == "rules.py")
        .unwrap();
    assert_eq!(decision.strategy, Strategy::Signature);

    let text = &outcome.document.text;
    let start = text.find("## File: rules.py").unwrap();
    let code_start = start + text[start..].find("```python\n").unwrap() + "```python\n".len();
    let code_end = code_start + text[code_start..].find("\n```\n").unwrap();
    let code = &text[code_start..code_end];

    assert!(python::parse_source(code, Path::new("rules.py")).is_ok());
    assert!(code.contains("import re"));
    assert!(code.contains("\"\"\"Rule 11.\"\"\""));
    assert!(!code.contains("return 1"));
    assert!(code.contains("def fallback(text):"));
    assert!(!code.contains("cached_text"));
}

#[test]
fn test_unparseable_file_is_tolerated() {
    let dir = mock_repo();
    write(dir.path(), "broken.py", "def broken(:\n    pass\n");
    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();

    // Nothing imports it and neither analyzer produced a record, so it
    // never reaches routing
    assert_eq!(outcome.parse_failures, 1);
    assert_eq!(outcome.files_analyzed, 6);
    assert!(!outcome.dependencies.contains_key("broken.py"));
    assert!(!outcome.complexity.contains_key("broken.py"));
    assert!(outcome.decisions.iter().all(|d| d.file_path != "broken.py"));
    assert_eq!(outcome.document.included.len(), 5);
}

#[test]
fn test_packignore_excludes_files() {
    let dir = mock_repo();
    write(dir.path(), "generated/big.py", "X = 1\n");
    write(dir.path(), ".packignore", "generated/\n");
    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();

    assert!(!outcome.dependencies.contains_key("generated/big.py"));
    assert_eq!(outcome.files_analyzed, 5);
}

#[test]
fn test_deeply_nested_expression_does_not_abort_the_run() {
    let dir = mock_repo();
    let mut deep = String::from("import utils\n\nTOTAL = 1");
    for _ in 1..20_000 {
        deep.push_str(" + 1");
    }
    deep.push('\n');
    write(dir.path(), "generated_table.py", &deep);

    let outcome = Pipeline::new(PackConfig::default()).run(dir.path()).unwrap();

    assert_eq!(outcome.parse_failures, 0);
    assert!(outcome.dependencies["generated_table.py"]
        .dependencies
        .contains("utils.py"));
    assert_eq!(
        outcome.complexity["generated_table.py"].cyclomatic_complexity,
        1
    );
}
