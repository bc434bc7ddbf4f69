//! State repository tests against a real git remote

use riserd::core::ResourceFile;
use riserd::git::{CommitOutcome, GitError, RepoSettings, StateRepo};

use crate::helpers::{git, TestRemote, SEED_CONTENTS, SEED_FILE};

#[tokio::test]
async fn test_open_clones_remote_branch() {
    let remote = TestRemote::new().await;

    let repo = StateRepo::open(remote.settings("work")).await.unwrap();

    let work = remote.root.subdir("work");
    assert_eq!(work.file(SEED_FILE).read_string().await.unwrap(), SEED_CONTENTS);
    assert_eq!(repo.settings().branch(), "main");
    remote.cleanup().await;
}

#[tokio::test]
async fn test_identical_commit_returns_no_changes() {
    let remote = TestRemote::new().await;
    let repo = StateRepo::open(remote.settings("work")).await.unwrap();
    let files = vec![ResourceFile::new("stages/dev/route.yaml", "kind: Route\n")];

    let first = repo.commit("update route", &files).await.unwrap();
    let second = repo.commit("update route", &files).await.unwrap();

    assert_eq!(first, CommitOutcome::Committed);
    assert_eq!(second, CommitOutcome::NoChanges);
    remote.cleanup().await;
}

#[tokio::test]
async fn test_commit_uses_synthetic_author() {
    let remote = TestRemote::new().await;
    let repo = StateRepo::open(remote.settings("work")).await.unwrap();

    repo.commit("my message", &[ResourceFile::new("a.yaml", "a: 1\n")])
        .await
        .unwrap();

    let work = remote.root.subdir("work");
    let log = git(work.path(), &["log", "-1", "--format=%an <%ae>|%s"]).await;
    assert_eq!(log.trim(), "riser-server <riser-server@tempuri.org>|my message");
    remote.cleanup().await;
}

#[tokio::test]
async fn test_push_publishes_commit() {
    let remote = TestRemote::new().await;
    let repo = StateRepo::open(remote.settings("work")).await.unwrap();

    repo.commit("add config", &[ResourceFile::new("configs/app.yaml", "x: 1\n")])
        .await
        .unwrap();
    repo.push().await.unwrap();

    let _other = StateRepo::open(remote.settings("other")).await.unwrap();
    let other = remote.root.subdir("other");
    assert_eq!(
        other.file("configs/app.yaml").read_string().await.unwrap(),
        "x: 1\n"
    );
    remote.cleanup().await;
}

#[tokio::test]
async fn test_reset_hard_remote_discards_local_state() {
    let remote = TestRemote::new().await;
    let repo = StateRepo::open(remote.settings("work")).await.unwrap();
    let work = remote.root.subdir("work");

    // An unpushed commit, a modified tracked file, and an untracked file
    repo.commit("local only", &[ResourceFile::new("local.yaml", "l: 1\n")])
        .await
        .unwrap();
    work.file(SEED_FILE).write_bytes(b"changed\n").await.unwrap();
    work.file("stray/untracked.yaml").write_bytes(b"u").await.unwrap();

    repo.reset_hard_remote().await.unwrap();

    assert_eq!(work.file(SEED_FILE).read_string().await.unwrap(), SEED_CONTENTS);
    assert!(!work.file("local.yaml").exists().await);
    assert!(!work.file("stray/untracked.yaml").exists().await);
    let status = git(work.path(), &["status", "--porcelain"]).await;
    assert!(status.is_empty());
    remote.cleanup().await;
}

#[tokio::test]
async fn test_reopen_discards_aborted_transaction() {
    let remote = TestRemote::new().await;
    let work = remote.root.subdir("work");
    {
        let _repo = StateRepo::open(remote.settings("work")).await.unwrap();
    }
    work.file("half-written.yaml").write_bytes(b"h").await.unwrap();

    let _repo = StateRepo::open(remote.settings("work")).await.unwrap();

    assert!(!work.file("half-written.yaml").exists().await);
    assert_eq!(work.file(SEED_FILE).read_string().await.unwrap(), SEED_CONTENTS);
    remote.cleanup().await;
}

#[tokio::test]
async fn test_open_unreachable_remote_fails_initialization() {
    let remote = TestRemote::new().await;
    let settings = RepoSettings::new(
        format!("{}-missing", remote.url()),
        None,
        "main",
        remote.root.subdir("work").path(),
    )
    .unwrap();

    let err = StateRepo::open(settings).await.err().unwrap();

    assert!(matches!(err, GitError::Initialization { .. }));
    remote.cleanup().await;
}
