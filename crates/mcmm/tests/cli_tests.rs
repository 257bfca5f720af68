//! Smoke tests for the `mcmm` binary against an isolated directory layout.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

struct Layout {
    _root: TempDir,
    config: PathBuf,
    jars: PathBuf,
    cache: PathBuf,
    minecraft: PathBuf,
}

impl Layout {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let base = root.path().to_path_buf();
        let layout = Self {
            config: base.join("config"),
            jars: base.join("jar_storage"),
            cache: base.join("cache"),
            minecraft: base.join("minecraft"),
            _root: root,
        };
        fs::create_dir_all(&layout.minecraft).unwrap();
        layout
    }

    fn mcmm(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("mcmm").unwrap();
        cmd.env("MCMM_CONFIG_DIR", &self.config)
            .env("MCMM_JAR_STORAGE_DIR", &self.jars)
            .env("MCMM_CACHE_DIR", &self.cache)
            .env("MCMM_MINECRAFT_DIR", &self.minecraft)
            .env_remove("RUST_LOG");
        cmd
    }

    fn write_profile(&self, name: &str, profile: &serde_json::Value) {
        let dir = self.config.join("profiles");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{name}.json")),
            serde_json::to_string_pretty(profile).unwrap(),
        )
        .unwrap();
    }

    fn local_jar(&self, name: &str) -> PathBuf {
        let dir = self.minecraft.parent().unwrap().join("local");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, name.as_bytes()).unwrap();
        path
    }

    fn mods(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.minecraft.join("mods"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

fn file_entry(path: &Path) -> serde_json::Value {
    json!({"provider": "file", "metadata": {"file_path": path}})
}

#[test]
fn test_list_empty_and_populated() {
    let layout = Layout::new();
    layout.mcmm().arg("list").assert().success().stdout("");

    layout.write_profile("zeta", &json!({"minecraft_version": "1.20.1", "mods": []}));
    layout.write_profile("alpha", &json!({"minecraft_version": "1.20.1", "mods": []}));

    layout
        .mcmm()
        .arg("list")
        .assert()
        .success()
        .stdout("alpha\nzeta\n");
}

#[test]
fn test_providers_lists_builtins() {
    let layout = Layout::new();
    layout
        .mcmm()
        .arg("providers")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("file")
                .and(predicate::str::contains("modrinth"))
                .and(predicate::str::contains("github"))
                .and(predicate::str::contains("curse_forge")),
        );
}

#[test]
fn test_download_then_activate() {
    let layout = Layout::new();
    let sodium = layout.local_jar("sodium.jar");
    let lithium = layout.local_jar("lithium.jar");
    layout.write_profile(
        "perf",
        &json!({
            "minecraft_version": "1.20.1",
            "mods": [file_entry(&sodium), file_entry(&lithium)]
        }),
    );
    fs::create_dir_all(layout.minecraft.join("mods")).unwrap();
    fs::write(layout.minecraft.join("mods").join("stale.jar"), b"old").unwrap();

    layout
        .mcmm()
        .args(["download", "perf"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Downloaded 2 of 2 mod(s) for profile 'perf'",
        ));
    assert!(layout.jars.join("perf").join("sodium.jar").exists());

    layout
        .mcmm()
        .args(["activate", "perf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile 'perf' activated"));
    assert_eq!(layout.mods(), ["lithium.jar", "sodium.jar"]);

    layout
        .mcmm()
        .arg("deactivate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 2 jar(s)"));
    assert!(layout.mods().is_empty());
}

#[test]
fn test_download_with_failed_entry_exits_2() {
    let layout = Layout::new();
    let sodium = layout.local_jar("sodium.jar");
    layout.write_profile(
        "perf",
        &json!({
            "minecraft_version": "1.20.1",
            "mods": [
                {"provider": "nonexistent", "metadata": {}},
                file_entry(&sodium)
            ]
        }),
    );

    layout
        .mcmm()
        .args(["download", "perf", "--mc-version", "1.19.2"])
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("Could not locate mod provider with id 'nonexistent'")
                .and(predicate::str::contains("Downloaded 1 of 2 mod(s)"))
                .and(predicate::str::contains("Minecraft 1.19.2")),
        )
        .stderr(predicate::str::contains("1 of 2 profile entries failed"));
    assert!(layout.jars.join("perf").join("sodium.jar").exists());
}

#[test]
fn test_missing_profile_exits_1_without_touching_mods() {
    let layout = Layout::new();
    let mods = layout.minecraft.join("mods");
    fs::create_dir_all(&mods).unwrap();
    fs::write(mods.join("keep.jar"), b"keep").unwrap();

    layout
        .mcmm()
        .args(["activate", "ghost"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not find a profile named 'ghost'"));
    assert_eq!(layout.mods(), ["keep.jar"]);
}

#[test]
fn test_json_error_envelope() {
    let layout = Layout::new();
    let output = layout
        .mcmm()
        .args(["--json", "download", "ghost"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["error"]["code"], "config");
}

#[test]
fn test_json_list() {
    let layout = Layout::new();
    layout.write_profile("solo", &json!({"minecraft_version": "1.17", "mods": []}));

    let output = layout.mcmm().args(["list", "--json"]).output().unwrap();

    assert!(output.status.success());
    let envelope: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(envelope, json!({"status": "ok", "data": {"profiles": ["solo"]}}));
}

#[test]
fn test_generate_from_stdin() {
    let layout = Layout::new();
    let jar = layout.local_jar("custom.jar");

    layout
        .mcmm()
        .args(["generate", "custom"])
        .write_stdin(format!("\n1.20.1\nfile\n{}\nfinish\n", jar.display()))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Available Mod Providers:")
                .and(predicate::str::contains("Profile 'custom' successfully generated.")),
        );

    let saved: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(layout.config.join("profiles").join("custom.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["minecraft_version"], "1.20.1");
    assert_eq!(saved["mods"][0]["provider"], "file");
    assert!(saved.get("minecraft_folder").is_none());
}

#[test]
fn test_activate_help_warns_about_deletion() {
    let layout = Layout::new();
    layout
        .mcmm()
        .args(["activate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("every .jar file in the mods folder is deleted"));
}
