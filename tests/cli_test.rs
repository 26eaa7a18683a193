/// CLI binary integration tests using assert_cmd
///
/// These tests invoke the actual binary and verify command-line behavior
mod common;

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use common::{RecordBuilder, SessionDirBuilder, conversation};
use hypertransparency::encode_project_path;
use predicates::prelude::*;
use tempfile::TempDir;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_hypertransparency"))
}

#[test]
fn test_cli_build_with_sessions_dir_and_no_git() {
    let sessions = SessionDirBuilder::new().with_session("s1", &conversation(4)).build();
    let repo = TempDir::new().unwrap();
    let out = repo.path().join("site");

    // Empty PATH: no git executable can be found.
    bin()
        .env("PATH", "")
        .env("HOME", repo.path())
        .arg("build")
        .arg(repo.path())
        .arg("--sessions-dir")
        .arg(sessions.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Messages: 4"))
        .stdout(predicate::str::contains("Commits: 0"))
        .stdout(predicate::str::contains("Sessions: 1"))
        .stdout(predicate::str::contains("Git history unavailable"));

    assert!(out.join("index.html").is_file());
    assert!(out.join("data/sessions/s1/page-001.json").is_file());

    let commits: serde_json::Value =
        serde_json::from_slice(&fs::read(out.join("data/commits.json")).unwrap()).unwrap();
    assert_eq!(commits["commits"].as_array().unwrap().len(), 0);
    let versions: serde_json::Value =
        serde_json::from_slice(&fs::read(out.join("data/image-versions.json")).unwrap()).unwrap();
    assert!(versions["imageVersions"].as_object().unwrap().is_empty());
}

#[test]
fn test_cli_build_finds_sessions_under_home() {
    let home = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    let repo_path = repo.path().canonicalize().unwrap();

    let project_dir = home.path().join(".claude/projects").join(encode_project_path(&repo_path));
    fs::create_dir_all(&project_dir).unwrap();
    let content = conversation(3).iter().map(|r| r.to_json() + "\n").collect::<String>();
    fs::write(project_dir.join("abc.jsonl"), content).unwrap();

    bin()
        .env("HOME", home.path())
        .arg("build")
        .arg(&repo_path)
        .arg("--name")
        .arg("Paper")
        .assert()
        .success()
        .stdout(predicate::str::contains("Messages: 3"));

    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(repo_path.join("docs/data/manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["project"]["name"], "Paper");
    assert_eq!(manifest["sessions"][0]["id"], "abc");
}

#[test]
fn test_cli_build_with_no_sessions_still_writes_site() {
    let home = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();

    bin()
        .env("HOME", home.path())
        .arg("build")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Messages: 0"));

    assert!(repo.path().join("docs/data/index.json").is_file());
}

#[test]
fn test_cli_build_rejects_invalid_config() {
    let repo = TempDir::new().unwrap();
    fs::write(
        repo.path().join(".hypertransparency.json"),
        r#"{"build":{"messages_per_page":0}}"#,
    )
    .unwrap();

    bin()
        .env("HOME", repo.path())
        .arg("build")
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config file"))
        .stderr(predicate::str::contains("messages_per_page"));
}

#[test]
fn test_cli_build_rejects_malformed_config() {
    let repo = TempDir::new().unwrap();
    let config = repo.path().join("custom.json");
    fs::write(&config, "{ not json").unwrap();

    bin()
        .env("HOME", repo.path())
        .arg("build")
        .arg(repo.path())
        .arg("-c")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom.json"));
}

#[test]
fn test_cli_build_missing_repository() {
    bin()
        .arg("build")
        .arg("/nonexistent/repository/path")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository not found"));
}

#[test]
fn test_cli_init_writes_config_and_refuses_overwrite() {
    let repo = TempDir::new().unwrap();
    let repo_path = repo.path().canonicalize().unwrap();
    let config_path = repo_path.join(".hypertransparency.json");
    let dir_name = repo_path.file_name().unwrap().to_string_lossy().into_owned();

    bin()
        .env("PATH", "")
        .arg("init")
        .arg(&repo_path)
        .arg("--no-build")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let config: serde_json::Value = serde_json::from_slice(&fs::read(&config_path).unwrap()).unwrap();
    assert_eq!(config["project"]["name"], dir_name.as_str());
    assert_eq!(config["project"]["branch"], "main");
    assert_eq!(config["build"]["messages_per_page"], 100);
    assert!(!repo_path.join("docs").exists());

    bin()
        .arg("init")
        .arg(&repo_path)
        .arg("--no-build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    bin()
        .env("PATH", "")
        .arg("init")
        .arg(&repo_path)
        .arg("--no-build")
        .arg("--force")
        .assert()
        .success();
}

#[test]
fn test_cli_init_runs_initial_build() {
    let home = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();

    bin()
        .env("HOME", home.path())
        .env("PATH", "")
        .arg("init")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Site built"));

    assert!(repo.path().join("docs/index.html").is_file());
}

#[test]
fn test_cli_build_skips_bad_lines() {
    let mut records = conversation(2);
    records.push(RecordBuilder::assistant("late answer").at("2024-01-15T11:00:00Z").uuid("ffffffff-1"));
    let content = records.iter().map(|r| r.to_json()).collect::<Vec<_>>().join("\n{broken\n") + "\n";
    let sessions = SessionDirBuilder::new().with_raw_session("s", &content).build();
    let repo = TempDir::new().unwrap();

    bin()
        .env("PATH", "")
        .env("HOME", repo.path())
        .arg("build")
        .arg(repo.path())
        .arg("--sessions-dir")
        .arg(sessions.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Messages: 3"))
        .stdout(predicate::str::contains("Skipped: 2 lines"));
}

#[test]
fn test_cli_serve_without_site_fails() {
    let dir = TempDir::new().unwrap();
    bin()
        .arg("serve")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No built site"));
}

#[test]
fn test_cli_help_flag() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn test_cli_version_flag() {
    bin().arg("--version").assert().success().stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    bin().arg("invalid-command").assert().failure();
}
