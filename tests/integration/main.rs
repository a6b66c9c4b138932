//! Integration tests for bundlekit

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's config and cache
    fn bundlekit(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("bundlekit");
        cmd.current_dir(home.path())
            .env("XDG_CACHE_HOME", home.path().join("cache"))
            .env("BUNDLEKIT_CONFIG", home.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("cached script and stylesheet bundling"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("bundlekit"));
    }

    #[test]
    fn config_path_honors_env() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]").and(predicate::str::contains("[style]")));
    }

    #[test]
    fn local_config_is_merged() {
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join(".bundlekit.toml"),
            "[style]\ntargets = \"chrome 120\"\n",
        )
        .unwrap();

        bundlekit(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("chrome 120"));

        bundlekit(&home)
            .args(["--no-local", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("chrome 120").not());
    }

    #[test]
    fn config_init_writes_file() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(home.path().join("config.toml").is_file());
    }

    #[test]
    fn cache_path_uses_platform_cache_root() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("bundlekit"));
    }

    #[test]
    fn cache_clear_when_empty() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached bundles"));
    }

    #[test]
    fn script_missing_file() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["script", "does-not-exist.ts"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("File not found"));
    }

    #[test]
    fn css_missing_file() {
        let home = TempDir::new().unwrap();
        bundlekit(&home)
            .args(["css", "missing.css"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("File not found"));
    }

    #[test]
    fn script_requires_a_source() {
        let home = TempDir::new().unwrap();
        bundlekit(&home).arg("script").assert().failure();
    }

    #[test]
    fn missing_bundler_binary_gets_a_hint() {
        let home = TempDir::new().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[script]\nprogram = \"bundlekit-no-such-runtime\"\n",
        )
        .unwrap();

        bundlekit(&home)
            .args(["script", "--eval", "export const x = 1;", "--no-cache"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Command failed"))
            .stderr(predicate::str::contains("Hint:"));
    }
}
