use crate::common::{TestWorkspace, git, stderr, stdout};

/// Names of the repositories in a status report, in order.
fn listed(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(" [ "))
        .filter_map(|line| line.split(" [ ").next())
        .map(|name| name.trim_end().to_string())
        .collect()
}

#[test]
fn test_scan_finds_nested_repositories() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("alpha");
    workspace.add_repo("group/beta");
    workspace.add_repo("a/b/too-deep");
    std::fs::create_dir_all(workspace.root().join("plain-dir")).unwrap();

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(listed(&stdout(&output)), ["alpha", "beta"]);
}

#[test]
fn test_max_depth_is_configurable() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("a/b/deep");
    workspace.write_config("max_depth = 3\n");

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(listed(&stdout(&output)), ["deep"]);
}

#[test]
fn test_blacklist_from_file() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("keep");
    workspace.add_repo("scratch");
    workspace.write_config("repo_blacklist = \"scratch\"\n");

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(listed(&stdout(&output)), ["keep"]);
}

#[test]
fn test_blacklist_from_environment() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("keep");
    workspace.add_repo("scratch");
    workspace.add_repo("old");

    let output = workspace
        .gbt()
        .env("GBT_DEFAULT__REPO_BLACKLIST", "scratch,old")
        .arg("status")
        .output()
        .unwrap();

    assert_eq!(listed(&stdout(&output)), ["keep"]);
}

#[test]
fn test_explicit_repository_list() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("one");
    workspace.add_repo("two");
    std::fs::create_dir_all(workspace.root().join("not-a-repo")).unwrap();
    workspace.write_config("repos = [\"two\", \"not-a-repo\"]\n");

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(listed(&stdout(&output)), ["two"]);
    assert!(stderr(&output).contains("is not a git repository, skipping"));
}

#[test]
fn test_no_repositories_warns() {
    let workspace = TestWorkspace::new();

    let output = workspace.gbt().arg("status").output().unwrap();

    assert!(output.status.success());
    assert!(stderr(&output).contains("No repositories found"), "{}", stderr(&output));
    assert!(stdout(&output).contains("Everything up to date"));
}

fn add_submodule(workspace: &TestWorkspace) {
    let upstream = workspace.add_upstream("lib");
    let app = workspace.add_repo("app");
    git(
        &app,
        &[
            "-c",
            "protocol.file.allow=always",
            "submodule",
            "add",
            upstream.to_str().unwrap(),
            "lib",
        ],
    );
    git(&app, &["commit", "-m", "Add lib"]);
}

#[test]
fn test_submodules_listed_under_superproject() {
    let workspace = TestWorkspace::new();
    add_submodule(&workspace);

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(listed(&stdout(&output)), ["app", "↳ lib"]);
}

#[test]
fn test_submodules_can_be_excluded() {
    let workspace = TestWorkspace::new();
    add_submodule(&workspace);
    workspace.write_config("include_submodules = false\n");

    let output = workspace.gbt().arg("status").output().unwrap();

    assert_eq!(listed(&stdout(&output)), ["app"]);
}

#[test]
fn test_submodules_skip_fetch() {
    let workspace = TestWorkspace::new();
    add_submodule(&workspace);

    let output = workspace.gbt().args(["-v", "fetch"]).output().unwrap();

    assert!(output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("$ git fetch [app]"), "{stderr}");
    assert!(!stderr.contains("$ git fetch [lib]"), "{stderr}");
}
