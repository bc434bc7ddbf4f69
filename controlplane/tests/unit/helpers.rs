//! Shared fixtures: throwaway git remotes and seeded deployments

use std::path::Path;

use riserd::core::{Deployment, DeploymentDoc};
use riserd::filesys::dir::Dir;
use riserd::git::RepoSettings;

pub const SEED_FILE: &str = "README.md";
pub const SEED_CONTENTS: &str = "state repository\n";

/// A bare remote seeded with one commit on `main`, plus scratch space for clones
pub struct TestRemote {
    pub root: Dir,
    pub bare: Dir,
}

impl TestRemote {
    pub async fn new() -> Self {
        let root = Dir::create_temp_dir("riser-remote").await.unwrap();
        let bare = root.subdir("remote.git");
        let seed = root.subdir("seed");
        bare.create().await.unwrap();
        seed.create().await.unwrap();

        git(bare.path(), &["init", "--bare"]).await;

        git(seed.path(), &["init"]).await;
        git(seed.path(), &["checkout", "-b", "main"]).await;
        seed.file(SEED_FILE)
            .write_bytes(SEED_CONTENTS.as_bytes())
            .await
            .unwrap();
        git(seed.path(), &["add", "--all"]).await;
        git(
            seed.path(),
            &[
                "-c",
                "user.name=seed",
                "-c",
                "user.email=seed@example.com",
                "commit",
                "-m",
                "seed",
            ],
        )
        .await;
        let url = format!("file://{}", bare.path().display());
        git(seed.path(), &["remote", "add", "origin", &url]).await;
        git(seed.path(), &["push", "origin", "main"]).await;

        Self { root, bare }
    }

    pub fn url(&self) -> String {
        format!("file://{}", self.bare.path().display())
    }

    /// Settings for a fresh working copy named `name`
    pub fn settings(&self, name: &str) -> RepoSettings {
        RepoSettings::new(self.url(), None, "main", self.root.subdir(name).path()).unwrap()
    }

    pub async fn cleanup(self) {
        self.root.delete().await.unwrap();
    }
}

/// Run git in `dir`, panicking with its output on failure
pub async fn git(dir: &Path, args: &[&str]) -> String {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await
        .unwrap();
    assert!(
        output.status.success(),
        "git {:?} failed: {}{}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn deployment(name: &str, namespace: &str, stage: &str) -> Deployment {
    Deployment {
        name: name.to_string(),
        namespace: namespace.to_string(),
        stage_name: stage.to_string(),
        app_name: "myapp".to_string(),
        riser_revision: 2,
        doc: DeploymentDoc::default(),
    }
}
