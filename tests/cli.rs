use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn crawler() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ai-crawler"));
    cmd.env_remove("AI_CRAWLER_DIRECTORY")
        .env_remove("AI_CRAWLER_OUTPUT_DIRECTORY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_crawl_respects_ignore_files_and_hidden_entries() {
    let dir = tempdir().unwrap();
    let ws = dir.path();

    write_file(&ws.join("proj/a.py"), "print('a')\n");
    write_file(&ws.join("proj/ignored.py"), "print('ignored')\n");
    write_file(&ws.join("proj/.hidden.py"), "print('hidden')\n");
    write_file(&ws.join("proj/debug.log"), "noise\n");
    write_file(&ws.join("proj/.gitignore"), "*.log\n");
    write_file(&ws.join("proj/.aiignore"), "ignored.py\n");

    let output = crawler()
        .args([
            "crawl",
            "--directory",
            "proj",
            "--output-directory",
            "out",
            "--workspace-root",
            ws.to_str().unwrap(),
            "--json",
        ])
        .output()
        .unwrap();

    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(v.get("bundle_count").and_then(|c| c.as_u64()), Some(1));

    let remote = v["directories"][0]["tracking"]["remote_files"]
        .as_object()
        .unwrap();
    assert!(remote.contains_key("a.py"));
    assert!(!remote.contains_key("ignored.py"));
    assert!(!remote.contains_key(".hidden.py"));
    assert!(!remote.contains_key("debug.log"));

    let bundle = fs::read_to_string(ws.join("out/directory_contents_1.md")).unwrap();
    assert!(bundle.contains("## File: a.py"));
    assert!(!bundle.contains("ignored.py"));
    assert!(!bundle.contains(".hidden.py"));
    assert!(!bundle.contains("debug.log"));
}

#[test]
fn cli_crawl_reports_bundle_count() {
    let dir = tempdir().unwrap();
    let ws = dir.path();

    write_file(&ws.join("one/a.py"), "0123456789");
    write_file(&ws.join("two/b.py"), "0123456789");

    let output = crawler()
        .args([
            "crawl",
            "--directory",
            "one,two",
            "--output-directory",
            "out",
            "--workspace-root",
            ws.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout.trim(),
        "Successfully crawled directory and generated 2 markdown file(s)"
    );
    assert!(ws.join("out/change_tracking-0.json").is_file());
    assert!(ws.join("out/change_tracking-1.json").is_file());
}

#[test]
fn cli_crawl_reads_settings_from_environment() {
    let dir = tempdir().unwrap();
    let ws = dir.path();

    write_file(&ws.join("src/main.go"), "package main\n");

    let output = crawler()
        .env("AI_CRAWLER_DIRECTORY", "src")
        .env("AI_CRAWLER_OUTPUT_DIRECTORY", "snap")
        .args(["crawl", "--workspace-root", ws.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let bundle = fs::read_to_string(ws.join("snap/directory_contents_1.md")).unwrap();
    assert!(bundle.contains("```go\npackage main\n\n```"));
}

#[test]
fn cli_missing_setting_is_a_json_error() {
    let dir = tempdir().unwrap();

    let output = crawler()
        .args([
            "crawl",
            "--output-directory",
            "out",
            "--workspace-root",
            dir.path().to_str().unwrap(),
            "--json",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("out").exists());

    let stderr = String::from_utf8(output.stderr).unwrap();
    let v: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(
        v.get("error").and_then(|e| e.as_str()),
        Some("configuration must specify 'directory'")
    );
}

#[test]
fn cli_languages_json() {
    let output = crawler().args(["languages", "--json"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let v: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let languages = v.get("languages").and_then(|l| l.as_array()).unwrap();
    let yaml = languages
        .iter()
        .find(|l| l["name"] == "yaml")
        .unwrap();
    assert_eq!(yaml["extensions"], serde_json::json!([".yaml", ".yml"]));
    assert_eq!(v["default"], "text");
}
