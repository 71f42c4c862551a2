use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const FIXTURE: &str = include_str!("../../installdata-lib/tests/fixtures/installData.json");

fn run_check(path: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_installdata-check"))
        .arg(path)
        .arg("--offline")
        .args(extra)
        .env("RUST_LOG", "error")
        .output()
        .unwrap()
}

fn write_listing(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("installData.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_valid_listing_passes() {
    let dir = TempDir::new().unwrap();
    let path = write_listing(&dir, FIXTURE);

    let output = run_check(&path, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "{}", stdout);
    assert!(stdout.contains("installData.json passed validation"));
}

#[test]
fn test_stray_key_fails_with_location() {
    let dir = TempDir::new().unwrap();
    let listing = FIXTURE.replacen("\"version\": 2,", "\"version\": 2, \"comment\": \"draft\",", 1);
    let path = write_listing(&dir, &listing);

    let output = run_check(&path, &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(!output.status.success());
    assert!(stdout.contains("The keys [comment] were in installData.json at the top level"));
    assert!(stdout.contains("failed validation with 1 problem(s)"));
}

#[test]
fn test_coverage_mode_flag() {
    let dir = TempDir::new().unwrap();
    let listing = serde_json::json!({
        "version": 2,
        "mods": [{
            "family": "umineko",
            "name": "Umineko Question",
            "target": "Umineko1to4",
            "dataname": "Umineko1to4_Data",
            "identifiers": ["Umineko1to4"],
            "submods": [{
                "name": "full",
                "files": [{"name": "exe", "url": null, "priority": 0}],
                "fileOverrides": [{
                    "name": "exe",
                    "os": ["windows", "mac", "linux"],
                    "steam": true,
                    "url": "https://07th-mod.com/umineko/question/exe-steam.7z",
                }],
            }],
        }],
    });
    let path = write_listing(&dir, &listing.to_string());

    let symmetric = String::from_utf8_lossy(&run_check(&path, &[]).stdout).into_owned();
    assert_eq!(symmetric.matches("only available with Steam").count(), 3);

    let any = String::from_utf8_lossy(&run_check(&path, &["--coverage", "any"]).stdout).into_owned();
    assert_eq!(any.matches("steam false will have no overrides available").count(), 3);
}

#[test]
fn test_print_document() {
    let dir = TempDir::new().unwrap();
    let path = write_listing(&dir, FIXTURE);

    let output = run_check(&path, &["--print-document"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("\"CFBundleName\": \"Higurashi When They Cry - Ch.1 Onikakushi\""));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let output = run_check(&dir.path().join("nope.json"), &[]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
}
