//! Scenario tests for hide/reset over a single package.
//!
//! Each test drives the library engine the way the CLI does and then checks
//! the three artifacts independently: the package listing, the link folder
//! and the `files.exclude` mapping.

#![cfg(unix)]

use heaven_core::{Engine, Mode, RunOptions, RunReport};
use heaven_test_utils::TestPackage;
use pretty_assertions::assert_eq;
use serde_json::json;

// =============================================================================
// Test Infrastructure
// =============================================================================

const ITEMS: &[&str] = &["src", "README.md", "node_modules"];

fn package() -> TestPackage {
    TestPackage::new()
        .with_dir("src")
        .with_file("README.md")
        .with_dir("node_modules")
}

fn run(pkg: &TestPackage, mode: Mode, link_folder_name: Option<&str>) -> RunReport {
    let options = RunOptions {
        mode,
        link_folder_name: link_folder_name.map(str::to_string),
        include: Some(vec!["node_modules".to_string()]),
        ..RunOptions::default()
    };
    let report = Engine::new(options).run(&[pkg.normalized_root()]);
    assert!(report.is_success(), "run failed: {:?}", report);
    report
}

/// Every hide invariant, checked against disk.
fn assert_hidden(pkg: &TestPackage, folder: &str, included: &[&str], excluded: &[&str]) {
    // Coverage: every listed item is classified one way or the other
    for item in ITEMS {
        assert!(
            included.contains(item) || excluded.contains(item),
            "item {item} not covered"
        );
    }

    let linked = pkg.linked_items(folder);
    let mut expected: Vec<String> = included.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(linked, expected, "link folder must hold exactly the included set");

    for name in included {
        let target = std::fs::read_link(pkg.root().join(folder).join(name)).unwrap();
        assert_eq!(target, pkg.root().join(name));
    }
    for name in excluded {
        assert!(!linked.contains(&name.to_string()), "{name} must not be linked");
    }

    let mut expected_keys: Vec<String> = included.iter().map(|n| pkg.exclusion_key(n)).collect();
    expected_keys.sort();
    assert_eq!(pkg.exclusion_keys(), expected_keys);
    for key in &expected_keys {
        assert_eq!(pkg.read_settings()["files.exclude"][key.as_str()], true);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_1_hide_single_included_item() {
    let pkg = package();

    run(&pkg, Mode::Hide, None);

    pkg.assert_exists(".heaven");
    assert_hidden(&pkg, ".heaven", &["node_modules"], &["src", "README.md"]);
}

#[test]
fn scenario_2_hide_twice_is_bit_for_bit_stable() {
    let pkg = package();

    run(&pkg, Mode::Hide, None);
    let after_first = pkg.snapshot(".heaven");
    let second = run(&pkg, Mode::Hide, None);

    assert_eq!(pkg.snapshot(".heaven"), after_first);
    assert!(second.packages[0].is_unchanged());
}

#[test]
fn scenario_3_reset_after_hide() {
    let pkg = package();
    run(&pkg, Mode::Hide, None);

    run(&pkg, Mode::Reset, None);

    pkg.assert_not_exists(".heaven");
    pkg.assert_exists("node_modules");
    assert_eq!(pkg.read_settings(), json!({ "files.exclude": {} }));
}

#[test]
fn scenario_4_overridden_link_folder_name() {
    let pkg = package();

    run(&pkg, Mode::Hide, Some("stash"));

    pkg.assert_exists("stash");
    pkg.assert_not_exists(".heaven");
    assert_hidden(&pkg, "stash", &["node_modules"], &["src", "README.md"]);

    run(&pkg, Mode::Reset, Some("stash"));
    pkg.assert_not_exists("stash");
    assert_eq!(pkg.read_settings(), json!({ "files.exclude": {} }));
}

#[test]
fn scenario_5_deleted_item_leaves_no_stale_references() {
    let pkg = package();
    run(&pkg, Mode::Hide, None);

    pkg.remove("node_modules");
    run(&pkg, Mode::Hide, None);

    assert!(pkg.linked_items(".heaven").is_empty());
    assert!(pkg.exclusion_keys().is_empty());
}

#[test]
fn reset_then_hide_reproduces_original_state() {
    let pkg = package();
    run(&pkg, Mode::Hide, None);
    let original = pkg.snapshot(".heaven");

    run(&pkg, Mode::Reset, None);
    run(&pkg, Mode::Hide, None);

    assert_eq!(pkg.snapshot(".heaven"), original);
}

#[test]
fn unrelated_settings_survive_hide_and_reset() {
    let pkg = package();
    pkg.write_settings(&json!({
        "editor.formatOnSave": true,
        "search.exclude": { "dist": true }
    }));

    run(&pkg, Mode::Hide, None);
    run(&pkg, Mode::Reset, None);

    assert_eq!(
        pkg.read_settings(),
        json!({
            "editor.formatOnSave": true,
            "search.exclude": { "dist": true },
            "files.exclude": {}
        })
    );
}
