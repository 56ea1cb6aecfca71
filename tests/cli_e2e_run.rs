//! End-to-end tests for the `repo-catalog run` and `repo-catalog pass` commands.
//!
//! The GitHub API is played by a local `mockito` server passed through
//! `--api-base`; nothing here touches the network or git.

mod common;
use common::prelude::*;

use mockito::{Server, ServerGuard};
use serde_json::{json, Value};

fn summary(server: &ServerGuard, full_name: &str) -> Value {
    let name = full_name.split('/').nth(1).unwrap();
    json!({
        "full_name": full_name,
        "name": name,
        "description": format!("{name} description"),
        "url": format!("{}/repos/{full_name}", server.url()),
        "html_url": format!("https://github.com/{full_name}"),
        "updated_at": "2024-01-01T00:00:00Z",
        "stargazers_count": 3
    })
}

fn read_store(fixture: &TestFixture) -> Value {
    let content = std::fs::read_to_string(fixture.work_dir().join("repo_info.json")).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[test]
fn test_run_help() {
    let mut cmd = cargo_bin_cmd!("repo-catalog");
    cmd.arg("run")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-publish"))
        .stdout(predicate::str::contains("--curated-list"))
        .stdout(predicate::str::contains("--skip-union"));
}

#[test]
fn test_run_without_token_fails() {
    let fixture = TestFixture::new();
    fixture
        .command()
        .args(["run", "--backup-repo", "https://github.com/g0v/repo-backup.git"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("token"));

    assert!(!fixture.work_dir().exists());
}

#[test]
fn test_run_without_backup_repo_fails() {
    let fixture = TestFixture::new().with_config(r#"{"token": "t"}"#);
    fixture
        .command()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("backup_repo"));
}

#[test]
fn test_run_with_malformed_config_fails() {
    let fixture = TestFixture::new().with_config("{token");
    fixture
        .command()
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.json"));
}

#[test]
fn test_run_no_publish_builds_snapshot() {
    let mut server = Server::new();
    let a = summary(&server, "g0v/a");
    let b = summary(&server, "g0v/b");

    let _listing = server
        .mock("GET", "/orgs/g0v/repos?type=public")
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([a]).to_string())
        .create();
    let curated_lookup = server
        .mock("GET", "/repos/g0v/b")
        .with_status(200)
        .with_body(b.to_string())
        .expect(1)
        .create();
    let _languages_a = server
        .mock("GET", "/repos/g0v/a/languages")
        .with_status(200)
        .with_body(r#"{"Python": 1234, "Shell": 56}"#)
        .create();
    let _languages_b = server
        .mock("GET", "/repos/g0v/b/languages")
        .with_status(200)
        .with_body("{}")
        .create();
    let _readme_a = server
        .mock("GET", "/repos/g0v/a/readme")
        .with_status(200)
        .with_body(r#"{"name": "README.md", "encoding": "base64", "content": "aGVs\nbG8=\n"}"#)
        .create();
    let _metadata_b = server
        .mock("GET", "/repos/g0v/b/contents/g0v.json")
        .with_status(200)
        .with_body(r#"{"name": "g0v.json", "encoding": "base64", "content": "e30="}"#)
        .create();
    // every other request gets mockito's 501 and is skipped

    let fixture = TestFixture::new().with_file(
        "curated.json",
        r#"[{"repository": "https://github.com/g0v/b.git"}, {"name": "no url"}]"#,
    );
    fixture
        .command()
        .args(["run", "--no-publish", "--token", "secret"])
        .args(["--backup-repo", "https://github.com/g0v/repo-backup.git"])
        .args(["--api-base", &server.url()])
        .arg("--curated-list")
        .arg(fixture.path().join("curated.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("discovery: 1 visited, 1 updated, 0 skipped"))
        .stdout(predicate::str::contains("union: 1 visited, 1 updated, 0 skipped"))
        .stdout(predicate::str::contains("Snapshot left in"));

    curated_lookup.assert();

    let store = read_store(&fixture);
    assert_eq!(store["g0v/a"]["languages"], json!({"Python": 1234, "Shell": 56}));
    assert_eq!(store["g0v/a"]["readme_filename"], "g0v`a`README.md");
    assert!(store["g0v/a"].get("g0vjson_filename").is_none());
    assert!(store["g0v/a"].get("stargazers_count").is_none());
    assert_eq!(store["g0v/b"]["g0vjson_filename"], "g0v`b`g0v.json");
    assert_eq!(store["g0v/b"]["languages"], json!({}));

    fixture.child("temp/g0v`a`README.md").assert("hello");
    fixture.child("temp/g0v`b`g0v.json").assert("{}");
}

#[test]
fn test_pass_discover_follows_pages() {
    let mut server = Server::new();
    let page_two = format!("{}/orgs/g0v/repos?type=public&page=2", server.url());
    let _first = server
        .mock("GET", "/orgs/g0v/repos?type=public")
        .with_status(200)
        .with_header("link", &format!("<{page_two}>; rel=\"next\""))
        .with_body(json!([summary(&server, "g0v/a")]).to_string())
        .create();
    let _second = server
        .mock("GET", "/orgs/g0v/repos?type=public&page=2")
        .with_status(200)
        .with_body(json!([summary(&server, "g0v/b")]).to_string())
        .create();

    let fixture = TestFixture::new().with_config(
        r#"{"token": "secret", "backup_repo": "https://github.com/g0v/repo-backup.git"}"#,
    );
    fixture
        .command()
        .args(["pass", "discover", "--api-base", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("discovery: 2 visited, 2 updated, 0 skipped"));

    let store = read_store(&fixture);
    let keys: Vec<&String> = store.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["g0v/a", "g0v/b"]);
}

#[test]
fn test_pass_languages_keeps_unknown_fields() {
    let mut server = Server::new();
    let _languages = server
        .mock("GET", "/repos/g0v/a/languages")
        .with_status(200)
        .with_body(r#"{"Go": 7}"#)
        .create();

    let store = json!({
        "g0v/a": {
            "name": "a",
            "url": format!("{}/repos/g0v/a", server.url()),
            "html_url": "https://github.com/g0v/a",
            "updated_at": "2024-01-01T00:00:00Z",
            "maintainer": "someone"
        }
    });
    let fixture = TestFixture::new()
        .with_config(r#"{"token": "secret", "backup_repo": "git@github.com:g0v/repo-backup.git"}"#)
        .with_store(&store.to_string());

    fixture
        .command()
        .args(["pass", "languages", "--api-base", &server.url()])
        .assert()
        .success()
        .stdout(predicate::str::contains("languages: 1 visited, 1 updated, 0 skipped"));

    let store = read_store(&fixture);
    assert_eq!(store["g0v/a"]["languages"], json!({"Go": 7}));
    assert_eq!(store["g0v/a"]["maintainer"], "someone");
}

#[test]
fn test_pass_union_with_missing_list_fails() {
    let fixture = TestFixture::new().with_config(
        r#"{"token": "secret", "backup_repo": "https://github.com/g0v/repo-backup.git"}"#,
    );
    fixture
        .command()
        .args(["pass", "union", "--curated-list"])
        .arg(fixture.path().join("missing.json"))
        .args(["--api-base", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}
