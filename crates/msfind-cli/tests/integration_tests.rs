//! Integration tests for the msfind CLI
//!
//! These tests verify the CLI behavior end-to-end

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const PATIENT_PROFILE: &str = r#"{
  "resourceType": "StructureDefinition",
  "url": "http://example.org/fhir/StructureDefinition/example-patient",
  "name": "ExamplePatient",
  "title": "Example Patient",
  "type": "Patient",
  "differential": {
    "element": [
      {"path": "Patient.identifier", "min": 1, "max": "*", "mustSupport": true},
      {"path": "Patient.gender", "mustSupport": true}
    ]
  }
}"#;

/// Helper function to create a test CLI command
#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("msfind").unwrap();
    cmd.env_remove("MSFIND_ROOT").env_remove("RUST_LOG");
    cmd
}

/// Lay out a package cache, config and instances directory under one temp dir
fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let package_dir = root.join("cache").join("example.fhir.core#1.0.0").join("package");
    fs::create_dir_all(&package_dir).unwrap();
    fs::write(
        package_dir.join("StructureDefinition-example-patient.json"),
        PATIENT_PROFILE,
    )
    .unwrap();

    fs::create_dir_all(root.join("instances")).unwrap();
    fs::write(
        root.join("instances").join("patient.json"),
        r#"{"resourceType": "Patient", "id": "p1", "gender": "female"}"#,
    )
    .unwrap();

    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(
        root.join("config").join("config.json"),
        serde_json::json!({
            "init": [{"mode": "clean"}],
            "fhir-package-cache": root.join("cache"),
            "packages": [
                {"name": "example.fhir.core", "version": "1.0.0", "title": "Example Core"},
                {"name": "example.fhir.missing", "version": "2.0.0"}
            ]
        })
        .to_string(),
    )
    .unwrap();

    temp_dir
}

fn report_path(root: &Path) -> std::path::PathBuf {
    root.join("work")
        .join("reports")
        .join("must_support_elements.tsv")
}

#[test]
fn test_help_command() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("msfind extracts the mustSupport elements"))
        .stdout(predicate::str::contains("packages"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_command() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(VERSION));

    cli()
        .args(["version", "--detailed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Build information:"));
}

#[test]
fn test_run_writes_report() {
    let project = create_test_project();
    let root = project.path();

    cli()
        .current_dir(root)
        .args(["--no-color", "--rootdir"])
        .arg(root.join("work"))
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"))
        .stdout(predicate::str::contains("1 not found"));

    let report = fs::read_to_string(report_path(root)).unwrap();
    assert!(report.starts_with("Resource Type\tProfile Name\tElement\tCardinality\tUse Count\n"));
    assert!(report.contains("Patient\tExample Patient\tPatient.identifier\t1..*\t0\n"));
    assert!(report.contains("Patient\tExample Patient\tPatient.gender\t0..1\t1\n"));

    let logs: Vec<_> = fs::read_dir(root.join("work").join("logs"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].starts_with("ms-find-") && logs[0].ends_with(".log"));
}

#[test]
fn test_default_command_runs_pipeline() {
    let project = create_test_project();
    let root = project.path();

    cli()
        .current_dir(root)
        .env("MSFIND_ROOT", root.join("work"))
        .arg("--no-color")
        .assert()
        .success();

    assert!(report_path(root).is_file());
}

#[test]
fn test_run_with_instances_override() {
    let project = create_test_project();
    let root = project.path();
    let empty = root.join("empty-instances");
    fs::create_dir_all(&empty).unwrap();

    cli()
        .current_dir(root)
        .args(["--no-color", "--rootdir"])
        .arg(root.join("work"))
        .args(["run", "--mode", "keep", "--instances"])
        .arg(&empty)
        .assert()
        .success()
        .stdout(predicate::str::contains("No instance resources analyzed"));

    let report = fs::read_to_string(report_path(root)).unwrap();
    assert!(report.contains("Patient.gender\t0..1\t0\n"));
}

#[test]
fn test_run_without_config_fails() {
    let temp_dir = TempDir::new().unwrap();

    cli()
        .current_dir(temp_dir.path())
        .args(["--rootdir"])
        .arg(temp_dir.path().join("work"))
        .args(["--config"])
        .arg(temp_dir.path().join("missing.json"))
        .arg("run")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_packages_command() {
    let project = create_test_project();

    cli()
        .current_dir(project.path())
        .args(["--no-color", "packages"])
        .assert()
        .success()
        .stdout(predicate::str::contains("example.fhir.core#1.0.0 (Example Core)"))
        .stdout(predicate::str::contains("example.fhir.missing#2.0.0"))
        .stdout(predicate::str::contains("not found"));
}

#[test]
fn test_check_command() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("bundle.json");
    fs::write(
        &file,
        r#"{"resourceType": "Bundle", "entry": [
            {"resource": {"resourceType": "Patient", "id": "a", "name": [{"given": ["Jo"]}]}},
            {"resource": {"resourceType": "Patient", "id": "b", "name": []}}
        ]}"#,
    )
    .unwrap();

    cli()
        .args(["--no-color", "check"])
        .arg(&file)
        .arg("Patient.name.given")
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient/a: Patient.name.given populated"))
        .stdout(predicate::str::contains("Patient/b: Patient.name.given not populated"))
        .stdout(predicate::str::contains("1 of 2 resources"));
}

#[test]
fn test_check_extension_slice() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("patient.json");
    fs::write(
        &file,
        r#"{"resourceType": "Patient", "id": "p", "extension": [
            {"url": "http://example.org/birthPlace", "valueAddress": {"city": "Perth"}}
        ]}"#,
    )
    .unwrap();

    cli()
        .args(["--no-color", "check", "--extension-uri", "http://example.org/birthPlace"])
        .arg(&file)
        .arg("Patient.extension:birthPlace")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 of 1 resources"));
}

#[test]
fn test_check_unreadable_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    cli()
        .args(["check"])
        .arg(temp_dir.path().join("missing.json"))
        .arg("Patient.name")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn test_generate_completion() {
    cli()
        .args(["--generate-completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("msfind"));
}
