use assert_cmd::Command;
use predicates::prelude::*;

fn devobs(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("devobs").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DEVOBS_CONFIG")
        .env_remove("DEVOBS_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("github-changes"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn validate_accepts_https_with_query() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["validate", "https://github.com/acme/api"])
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid"));
    devobs(&dir)
        .args(["validate", "https://github.com/acme/api?tab=readme"])
        .assert()
        .success();
}

#[test]
fn validate_rejects_ssh_remote_with_exit_4() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["validate", "git@github.com:acme/api.git"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid URL format"));
}

#[test]
fn validate_rejects_non_github_with_exit_4() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["validate", "https://gitlab.com/acme/api"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains(
            "URL must be a valid GitHub repository URL",
        ));
    devobs(&dir)
        .args(["validate", "not a url"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Invalid URL format"));
}

#[test]
fn validate_website_mode() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["validate", "--website", "https://acme.dev/docs"])
        .assert()
        .success();
    devobs(&dir)
        .args(["validate", "--website", "ftp://acme.dev"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("URL must use http or https"));
}

#[test]
fn key_prints_normalized_prefix() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["key", "https://www.example.com:8080/docs/?q=1"])
        .assert()
        .success()
        .stdout("example_com/docs\n");
    devobs(&dir)
        .args(["key", "https://example.com"])
        .assert()
        .success()
        .stdout("example_com/root\n");
}

#[test]
fn key_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = devobs(&dir)
        .args(["--json", "key", "https://blog.acme.dev/posts/hello-world"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["domain"], "blog_acme_dev");
    assert_eq!(value["name"], "hello_world");
    assert_eq!(value["prefix"], "blog_acme_dev/hello_world");
}

#[test]
fn missing_config_file_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["--config", "does-not-exist.toml", "repos", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot load config"));
}

#[test]
fn malformed_local_config_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".devobs")).unwrap();
    std::fs::write(
        dir.path().join(".devobs/config.toml"),
        "[server]\nbase_url = \"localhost\"\n",
    )
    .unwrap();
    devobs(&dir)
        .args(["repos", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn malformed_base_url_flag_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["--quiet", "--base-url", "localhost:8090", "repos", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("server.base_url"));
}

#[test]
fn unreachable_backend_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    devobs(&dir)
        .args(["--quiet", "--base-url", "http://127.0.0.1:9", "repos", "list"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Failed to list repositories"));
}
