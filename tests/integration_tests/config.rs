use crate::common::{TestWorkspace, stderr, stdout, succeed};

#[test]
fn test_config_path_uses_env() {
    let workspace = TestWorkspace::new();

    let output = workspace.gbt().args(["config", "path"]).output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        workspace.config_path().display().to_string()
    );
}

#[test]
fn test_config_path_defaults_to_xdg_config_home() {
    let workspace = TestWorkspace::new();
    let xdg = workspace.root().join("xdg");

    let output = workspace
        .gbt()
        .env_remove("GBT_CONFIG_PATH")
        .env("XDG_CONFIG_HOME", &xdg)
        .args(["config", "path"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        xdg.join("gbt").join("config.toml").display().to_string()
    );
}

#[test]
fn test_config_flag_overrides_env() {
    let workspace = TestWorkspace::new();
    let other = workspace.root().join("other.toml");

    let output = workspace
        .gbt()
        .arg("--config")
        .arg(&other)
        .args(["config", "path"])
        .output()
        .unwrap();

    assert_eq!(stdout(&output).trim(), other.display().to_string());
}

#[test]
fn test_set_then_get() {
    let workspace = TestWorkspace::new();

    succeed(workspace.gbt().args(["config", "set", "max_depth", "3"]));
    succeed(workspace.gbt().args(["config", "set", "repo_blacklist", "scratch,old"]));

    let output = workspace
        .gbt()
        .args(["config", "get", "max_depth"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output).trim(), "3");

    let output = workspace
        .gbt()
        .args(["config", "get", "repo_blacklist"])
        .output()
        .unwrap();
    assert_eq!(stdout(&output).trim(), "scratch,old");
}

#[test]
fn test_set_keeps_existing_content() {
    let workspace = TestWorkspace::new();
    workspace.write_config("# keep me\ninclude_submodules = false\n");

    succeed(workspace.gbt().args(["config", "set", "command_timeout_secs", "60"]));

    let content = std::fs::read_to_string(workspace.config_path()).unwrap();
    assert!(content.contains("# keep me"), "{content}");
    assert!(content.contains("include_submodules = false"), "{content}");
    assert!(content.contains("command_timeout_secs = 60"), "{content}");
    assert!(content.contains("root_dir = "), "{content}");
}

#[test]
fn test_set_creates_missing_file() {
    let workspace = TestWorkspace::new();
    let fresh = workspace.root().join("nested").join("gbt.toml");

    succeed(
        workspace
            .gbt()
            .arg("--config")
            .arg(&fresh)
            .args(["config", "set", "include_submodules", "false"]),
    );

    let content = std::fs::read_to_string(&fresh).unwrap();
    assert!(content.contains("[default]"), "{content}");
    assert!(content.contains("include_submodules = false"), "{content}");
}

#[test]
fn test_unknown_key_is_rejected() {
    let workspace = TestWorkspace::new();
    let before = std::fs::read_to_string(workspace.config_path()).unwrap();

    let output = workspace
        .gbt()
        .args(["config", "set", "colour", "red"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Unknown config key 'colour'"), "{}", stderr(&output));
    assert_eq!(std::fs::read_to_string(workspace.config_path()).unwrap(), before);
}

#[test]
fn test_invalid_value_is_rejected() {
    let workspace = TestWorkspace::new();

    let output = workspace
        .gbt()
        .args(["config", "set", "max_depth", "lots"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("'lots' is not a valid value for max_depth"));
}

#[test]
fn test_get_unset_key_prints_nothing() {
    let workspace = TestWorkspace::new();

    let output = workspace
        .gbt()
        .args(["config", "get", "self_repo_id"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_invalid_config_file_fails_run() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("widget");
    std::fs::write(workspace.config_path(), "[default\nroot_dir = ").unwrap();

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load configuration"), "{}", stderr(&output));
}
