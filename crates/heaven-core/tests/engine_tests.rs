//! Hide and reset runs on real package directories.

#![cfg(unix)]

use heaven_core::{Action, Engine, ErrorKind, Mode, RunOptions, Warning};
use heaven_test_utils::TestPackage;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;

fn options(mode: Mode, include: &[&str]) -> RunOptions {
    RunOptions {
        mode,
        include: Some(include.iter().map(|s| s.to_string()).collect()),
        ..RunOptions::default()
    }
}

fn hide(pkg: &TestPackage, include: &[&str]) -> heaven_core::RunReport {
    Engine::new(options(Mode::Hide, include)).run(&[pkg.normalized_root()])
}

fn reset(pkg: &TestPackage) -> heaven_core::RunReport {
    Engine::new(options(Mode::Reset, &[])).run(&[pkg.normalized_root()])
}

#[test]
fn test_hide_links_and_excludes_included_items() {
    let pkg = TestPackage::with_items(&["src", "node_modules"]).with_file("README.md");

    let report = hide(&pkg, &["node_modules"]);

    assert!(report.is_success());
    assert_eq!(pkg.linked_items(".heaven"), vec!["node_modules"]);
    assert_eq!(
        fs::read_link(pkg.root().join(".heaven/node_modules")).unwrap(),
        pkg.root().join("node_modules")
    );
    assert_eq!(pkg.exclusion_keys(), vec![pkg.exclusion_key("node_modules")]);
    assert_eq!(pkg.read_settings()["files.exclude"][pkg.exclusion_key("node_modules")], true);
}

#[test]
fn test_hide_never_links_tool_owned_entries() {
    let pkg = TestPackage::with_items(&["src", "lib"]);
    pkg.write(".hidden-heaven.toml", "include = [\"*\"]\n");

    Engine::new(RunOptions::default()).run(&[pkg.normalized_root()]);
    let report = Engine::new(RunOptions::default()).run(&[pkg.normalized_root()]);

    assert!(report.is_success());
    assert_eq!(pkg.linked_items(".heaven"), vec!["lib", "src"]);
    assert_eq!(
        pkg.exclusion_keys(),
        vec![pkg.exclusion_key("lib"), pkg.exclusion_key("src")]
    );
}

#[test]
fn test_second_hide_reports_no_actions() {
    let pkg = TestPackage::with_items(&["src", "node_modules"]);

    let first = hide(&pkg, &["node_modules"]);
    let snapshot = pkg.snapshot(".heaven");
    let second = hide(&pkg, &["node_modules"]);

    assert!(!first.packages[0].actions.is_empty());
    assert!(second.packages[0].is_unchanged());
    assert_eq!(pkg.snapshot(".heaven"), snapshot);
}

#[test]
fn test_policy_change_unlinks_and_retracts() {
    let pkg = TestPackage::with_items(&["src", "node_modules", "coverage"]);
    hide(&pkg, &["node_modules", "coverage"]);

    let report = hide(&pkg, &["node_modules"]);

    assert!(
        report.packages[0]
            .actions
            .contains(&Action::Unlinked { name: "coverage".to_string() })
    );
    assert_eq!(pkg.linked_items(".heaven"), vec!["node_modules"]);
    assert_eq!(pkg.exclusion_keys(), vec![pkg.exclusion_key("node_modules")]);
}

#[test]
fn test_user_exclusions_survive_hide() {
    let pkg = TestPackage::with_items(&["src", "node_modules"]);
    pkg.write_settings(&json!({
        "editor.fontSize": 14,
        "files.exclude": { "**/.git": true }
    }));

    hide(&pkg, &["node_modules"]);

    let settings = pkg.read_settings();
    assert_eq!(settings["editor.fontSize"], 14);
    assert_eq!(settings["files.exclude"]["**/.git"], true);
    assert_eq!(settings["files.exclude"][pkg.exclusion_key("node_modules")], true);
}

#[test]
fn test_reset_removes_folder_and_clears_settings() {
    let pkg = TestPackage::with_items(&["src", "node_modules"]);
    pkg.write_settings(&json!({ "editor.fontSize": 14 }));
    hide(&pkg, &["node_modules"]);

    let report = reset(&pkg);

    assert!(report.is_success());
    pkg.assert_not_exists(".heaven");
    pkg.assert_exists("node_modules");
    assert_eq!(
        pkg.read_settings(),
        json!({ "editor.fontSize": 14, "files.exclude": {} })
    );
}

#[test]
fn test_reset_twice_is_noop() {
    let pkg = TestPackage::with_items(&["node_modules"]);
    hide(&pkg, &["node_modules"]);

    reset(&pkg);
    let snapshot = pkg.snapshot(".heaven");
    let second = reset(&pkg);

    assert!(second.packages[0].is_unchanged());
    assert_eq!(pkg.snapshot(".heaven"), snapshot);
}

#[test]
fn test_hide_after_reset_reproduces_state() {
    let pkg = TestPackage::with_items(&["src", "node_modules"]).with_file("yarn.lock");
    hide(&pkg, &["node_modules", "yarn.lock"]);
    let original = pkg.snapshot(".heaven");

    reset(&pkg);
    hide(&pkg, &["node_modules", "yarn.lock"]);

    assert_eq!(pkg.snapshot(".heaven"), original);
}

#[test]
fn test_failure_is_isolated_per_package() {
    let broken = TestPackage::with_items(&["node_modules"]);
    broken.write(".vscode/settings.json", "{ nope");
    let healthy = TestPackage::with_items(&["node_modules"]);

    let report = Engine::new(options(Mode::Hide, &["node_modules"]))
        .run(&[broken.normalized_root(), healthy.normalized_root()]);

    assert!(!report.is_success());
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].root, broken.normalized_root().as_str());
    assert_eq!(
        failures[0].failure.as_ref().unwrap().kind,
        ErrorKind::MalformedSettings
    );
    assert_eq!(healthy.linked_items(".heaven"), vec!["node_modules"]);
}

#[test]
fn test_malformed_settings_fails_before_linking() {
    let pkg = TestPackage::with_items(&["node_modules"]);
    pkg.write(".vscode/settings.json", "[]");

    let report = hide(&pkg, &["node_modules"]);

    assert_eq!(
        report.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::MalformedSettings
    );
    pkg.assert_not_exists(".heaven");
}

#[test]
fn test_invalid_utf8_settings_is_malformed() {
    let pkg = TestPackage::with_items(&["node_modules"]);
    fs::create_dir_all(pkg.root().join(".vscode")).unwrap();
    fs::write(pkg.root().join(".vscode/settings.json"), [0xff, 0xfe, b'{', b'}']).unwrap();

    let report = hide(&pkg, &["node_modules"]);

    assert_eq!(
        report.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::MalformedSettings
    );
    pkg.assert_not_exists(".heaven");
}

#[test]
fn test_stale_exclusion_retracted_after_failed_settings_step() {
    let pkg = TestPackage::with_items(&["node_modules", "coverage"]);
    hide(&pkg, &["node_modules", "coverage"]);
    let settings_path = pkg.root().join(".vscode/settings.json");
    let settings = fs::read_to_string(&settings_path).unwrap();

    pkg.remove("coverage");
    pkg.write(".vscode/settings.json", "// comment\n{}");
    let failed = hide(&pkg, &["node_modules", "coverage"]);

    assert_eq!(
        failed.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::MalformedSettings
    );
    assert_eq!(pkg.linked_items(".heaven"), vec!["coverage", "node_modules"]);

    fs::write(&settings_path, settings).unwrap();
    let report = hide(&pkg, &["node_modules", "coverage"]);

    assert!(report.is_success());
    assert_eq!(pkg.linked_items(".heaven"), vec!["node_modules"]);
    assert_eq!(pkg.exclusion_keys(), vec![pkg.exclusion_key("node_modules")]);
}

#[test]
fn test_orphaned_exclusion_retracted_after_link_folder_deleted() {
    let pkg = TestPackage::with_items(&["src", "node_modules", "coverage"]);
    hide(&pkg, &["node_modules", "coverage"]);
    let mut settings = pkg.read_settings();
    settings["files.exclude"][pkg.exclusion_key("src")] = json!(true);
    settings["files.exclude"]["**/.git"] = json!(true);
    pkg.write_settings(&settings);

    pkg.remove("coverage");
    fs::remove_dir_all(pkg.root().join(".heaven")).unwrap();
    let report = hide(&pkg, &["node_modules", "coverage"]);

    assert!(report.is_success());
    assert_eq!(pkg.linked_items(".heaven"), vec!["node_modules"]);
    let mut expected = vec![
        "**/.git".to_string(),
        pkg.exclusion_key("node_modules"),
        pkg.exclusion_key("src"),
    ];
    expected.sort();
    assert_eq!(pkg.exclusion_keys(), expected);
}

#[test]
fn test_corrupted_link_folder_is_reported() {
    let pkg = TestPackage::with_items(&["node_modules"]);
    pkg.write(".heaven/node_modules", "user content");

    let report = hide(&pkg, &["node_modules"]);

    assert_eq!(
        report.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::ManagedFolderCorrupted
    );
    assert_eq!(
        fs::read_to_string(pkg.root().join(".heaven/node_modules")).unwrap(),
        "user content"
    );
    pkg.assert_not_exists(".vscode/settings.json");
}

#[test]
fn test_missing_root_is_invalid_argument() {
    let pkg = TestPackage::new();
    let missing = pkg.normalized_root().join("does-not-exist");

    let report = Engine::new(options(Mode::Hide, &["x"])).run(&[missing]);

    assert_eq!(
        report.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_relative_root_is_invalid_argument() {
    let report = Engine::new(options(Mode::Hide, &["x"]))
        .run(&[heaven_fs::NormalizedPath::new("relative/pkg")]);

    assert_eq!(
        report.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::InvalidArgument
    );
}

#[test]
fn test_dry_run_changes_nothing() {
    let pkg = TestPackage::with_items(&["src", "node_modules"]);
    let options = RunOptions {
        dry_run: true,
        ..options(Mode::Hide, &["node_modules"])
    };

    let report = Engine::new(options).run(&[pkg.normalized_root()]);

    assert!(report.dry_run);
    assert!(report.packages[0].actions.contains(&Action::Linked {
        name: "node_modules".to_string()
    }));
    pkg.assert_not_exists(".heaven");
    pkg.assert_not_exists(".vscode");
}

#[test]
fn test_invalid_pattern_fails_package() {
    let pkg = TestPackage::with_items(&["src"]);

    let report = hide(&pkg, &["[oops"]);

    assert_eq!(
        report.packages[0].failure.as_ref().unwrap().kind,
        ErrorKind::InvalidPattern
    );
    pkg.assert_not_exists(".heaven");
}

#[test]
fn test_link_folder_name_from_config_file() {
    let pkg = TestPackage::with_items(&["node_modules"]);
    pkg.write(
        ".hidden-heaven.toml",
        "link_folder_name = \"stash\"\ninclude = [\"node_modules\"]\n",
    );

    let report = Engine::new(RunOptions::default()).run(&[pkg.normalized_root()]);

    assert_eq!(report.packages[0].link_folder_name.as_deref(), Some("stash"));
    assert_eq!(pkg.linked_items("stash"), vec!["node_modules"]);
    pkg.assert_not_exists(".heaven");
}

#[test]
fn test_item_deleted_since_link_produces_no_warning_after_cleanup() {
    let pkg = TestPackage::with_items(&["node_modules", "coverage"]);
    hide(&pkg, &["node_modules", "coverage"]);
    pkg.remove("coverage");

    let report = hide(&pkg, &["node_modules", "coverage"]);

    let package = &report.packages[0];
    assert!(package.warnings.iter().all(|w| !matches!(w, Warning::MissingLinkTarget { .. })));
    assert_eq!(pkg.linked_items(".heaven"), vec!["node_modules"]);
    assert_eq!(pkg.exclusion_keys(), vec![pkg.exclusion_key("node_modules")]);
}
