// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn list_local_repos_finds_git_checkouts() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("widget/.git")).unwrap();
    std::fs::create_dir_all(tmp.path().join("gadget/.git")).unwrap();
    std::fs::create_dir_all(tmp.path().join("not-a-repo")).unwrap();
    std::fs::write(tmp.path().join("loose-file"), "").unwrap();

    let publisher = GitPublisher::new(tmp.path());
    assert_eq!(publisher.list_local_repos("acme"), ["acme/gadget", "acme/widget"]);
}

#[test]
fn list_local_repos_of_missing_base_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let publisher = GitPublisher::new(tmp.path().join("nope"));
    assert!(publisher.list_local_repos("acme").is_empty());
}

#[tokio::test]
async fn ensure_repo_short_circuits_on_existing_checkout() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("widget/.git")).unwrap();

    let publisher = GitPublisher::new(tmp.path());
    let dir = publisher.ensure_repo("acme", "widget").await.unwrap();
    assert_eq!(dir, tmp.path().join("widget"));
}

#[tokio::test]
async fn fake_publisher_records_calls_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let publisher = FakePublisher::new()
        .with_repo("acme/widget", tmp.path())
        .with_changes(true)
        .with_pr_url("https://example/pr/1");

    let dir = publisher.ensure_repo("acme", "widget").await.unwrap();
    publisher.fresh_branch(&dir, "sichter/autofix-x").await.unwrap();
    assert!(publisher.commit_if_changes(&dir).await.unwrap());
    publisher.push(&dir, "sichter/autofix-x").await.unwrap();
    let url = publisher.create_or_update_pr("acme/widget", &dir, "sichter/autofix-x").await.unwrap();

    assert_eq!(url, "https://example/pr/1");
    let calls = publisher.calls();
    assert_eq!(calls[0], "ensure_repo acme/widget");
    assert_eq!(calls[1], "fresh_branch sichter/autofix-x");
    assert_eq!(calls.last().unwrap(), "create_or_update_pr acme/widget sichter/autofix-x");
}

#[tokio::test]
async fn fake_publisher_scripted_failures() {
    let publisher = FakePublisher::new().failing_clone();
    assert!(publisher.ensure_repo("acme", "widget").await.is_err());

    let publisher = FakePublisher::new().failing_list();
    assert!(publisher.list_org_repos("acme").await.is_err());
}
