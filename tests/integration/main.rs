//! Integration tests for repocache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn repocache() -> Command {
        cargo_bin_cmd!("repocache")
    }

    /// Command isolated from the user's configuration file
    fn isolated(dir: &TempDir) -> Command {
        let mut cmd = repocache();
        cmd.env("REPOCACHE_CONFIG", dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        repocache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("archive-cache accelerated checkouts"));
    }

    #[test]
    fn version_displays() {
        repocache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("repocache"));
    }

    #[test]
    fn key_for_scp_remote() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["key", "git@GitHub.com:mozilla-b2g/gaia.git"])
            .assert()
            .success()
            .stdout(predicate::str::contains("github.com/mozilla-b2g/gaia"))
            .stdout(predicate::str::contains("github.com/mozilla-b2g/gaia/master"))
            .stdout(predicate::str::contains("tc-vcs.v1.repo-project."));
    }

    #[test]
    fn key_equivalent_remotes_match() {
        let dir = TempDir::new().unwrap();
        let namespace = |remote: &str| {
            let output = isolated(&dir)
                .args(["key", "-b", "v2.2", remote])
                .output()
                .unwrap();
            assert!(output.status.success());
            String::from_utf8(output.stdout).unwrap()
        };

        assert_eq!(
            namespace("https://github.com/mozilla-b2g/gaia.git"),
            namespace("ssh://git@github.com/mozilla-b2g/gaia")
        );
    }

    #[test]
    fn key_uses_configured_namespace() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[cache]\nnamespace = \"ci.archives\"\n",
        )
        .unwrap();

        isolated(&dir)
            .args(["key", "https://hg.mozilla.org/mozilla-central"])
            .assert()
            .success()
            .stdout(predicate::str::contains("ci.archives."));
    }

    #[test]
    fn key_rejects_empty_remote() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["key", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid repository identity"));
    }

    #[test]
    fn stats_reads_workspace_record() {
        let dir = TempDir::new().unwrap();
        let metadata = dir.path().join("work/.repo");
        std::fs::create_dir_all(&metadata).unwrap();
        std::fs::write(
            metadata.join(".repocache-stats.json"),
            r#"{
                "start": "2026-01-05T10:00:00Z",
                "stop": "2026-01-05T10:02:00Z",
                "duration": 120000,
                "projects": {"gaia": {"duration": 1500}, "build": {"duration": 0}}
            }"#,
        )
        .unwrap();

        isolated(&dir)
            .args(["stats"])
            .arg(dir.path().join("work"))
            .assert()
            .success()
            .stdout(predicate::str::contains("gaia"))
            .stdout(predicate::str::contains("1.5s"))
            .stdout(predicate::str::contains("2 project(s)"));

        isolated(&dir)
            .args(["stats", "--format", "json"])
            .arg(dir.path().join("work"))
            .assert()
            .success()
            .stdout(predicate::str::contains("\"duration\": 120000"));
    }

    #[test]
    fn stats_missing_file() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["stats"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("reading stats file"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"))
            .stdout(predicate::str::contains("tc-vcs.v1.repo-project"));
    }

    #[test]
    fn config_init_writes_file() {
        let dir = TempDir::new().unwrap();
        isolated(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[cache\n").unwrap();

        isolated(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn repo_checkout_requires_manifest() {
        repocache()
            .args(["repo-checkout", "/tmp/work", "https://github.com/mozilla-b2g/B2G"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("<MANIFEST>"));
    }

    #[test]
    fn checkout_rejects_unknown_vcs() {
        repocache()
            .args(["checkout", "--vcs", "svn", "/tmp/work", "https://x.org/r"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid value 'svn'"));
    }

    #[test]
    fn repo_checkout_help() {
        repocache()
            .args(["repo-checkout", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force-clone"));
    }
}
