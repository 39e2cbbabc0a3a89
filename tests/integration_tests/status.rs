use crate::common::{TestWorkspace, git, stdout};

fn report_line<'a>(output: &'a str, repo: &str) -> &'a str {
    output
        .lines()
        .find(|line| line.starts_with(&format!("{repo} ")))
        .unwrap_or_else(|| panic!("no line for {repo} in:\n{output}"))
}

#[test]
fn test_status_clean_and_dirty() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("clean");
    let dirty = workspace.add_repo("dirty");
    std::fs::write(dirty.join("README.md"), "changed\n").unwrap();
    std::fs::write(dirty.join("new.txt"), "new\n").unwrap();

    let output = workspace.gbt().arg("status").output().unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = stdout(&output);

    let clean = report_line(&stdout, "clean");
    assert!(clean.contains("[ Up to date on main ]"), "{clean}");
    assert!(clean.ends_with("Nothing to commit"), "{clean}");

    let dirty = report_line(&stdout, "dirty");
    assert!(dirty.ends_with("2 file(s) modified/untracked"), "{dirty}");

    // Local changes mean there is work to do
    assert!(!stdout.contains("Everything up to date"));
}

#[test]
fn test_status_everything_up_to_date() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("alpha");
    workspace.add_repo("beta");

    let output = workspace.gbt().arg("status").output().unwrap();
    let stdout = stdout(&output);

    assert!(stdout.contains("Everything up to date"), "{stdout}");
    // Repositories are listed in path order, framed by rules
    let alpha = stdout.find("alpha").unwrap();
    let beta = stdout.find("beta").unwrap();
    assert!(alpha < beta);
    assert!(stdout.lines().next().unwrap().starts_with('─'));
}

#[test]
fn test_fetch_status_reports_behind_then_pull_catches_up() {
    let workspace = TestWorkspace::new();
    let (upstream, _clone) = workspace.add_clone("widget");
    workspace.commit(&upstream, "lib.rs", "Add library");

    // Default command is fetch + status
    let output = workspace.gbt().output().unwrap();
    let stdout_text = stdout(&output);
    let line = report_line(&stdout_text, "widget");
    assert!(line.contains("Behind 1 on main"), "{line}");

    let output = workspace.gbt().args(["pull", "status"]).output().unwrap();
    let stdout_text = stdout(&output);
    let line = report_line(&stdout_text, "widget");
    assert!(line.contains("Up to date on main"), "{line}");
    assert!(stdout_text.contains("Everything up to date"));
}

#[test]
fn test_ahead_is_work_to_do() {
    let workspace = TestWorkspace::new();
    let (_upstream, clone) = workspace.add_clone("widget");
    workspace.commit(&clone, "notes.md", "Local work");

    let output = workspace.gbt().arg("status").output().unwrap();
    let stdout_text = stdout(&output);

    let line = report_line(&stdout_text, "widget");
    assert!(line.contains("Ahead 1 on main"), "{line}");
    assert!(!stdout_text.contains("Everything up to date"));
}

#[test]
fn test_fetch_failure_is_listed() {
    let workspace = TestWorkspace::new();
    let broken = workspace.add_repo("broken");
    git(&broken, &["remote", "add", "origin", "/nonexistent/upstream"]);
    workspace.add_repo("fine");

    let output = workspace.gbt().args(["fetch", "status"]).output().unwrap();
    // Repository failures are reported, not fatal
    assert!(output.status.success());
    let stdout_text = stdout(&output);

    let line = report_line(&stdout_text, "broken");
    assert!(line.contains("Error(s): Fetching ("), "{line}");
    assert!(!line.contains("Pulling"));
    let fine = report_line(&stdout_text, "fine");
    assert!(fine.ends_with("Nothing to commit"));
}

#[test]
fn test_empty_repository() {
    let workspace = TestWorkspace::new();
    let empty = workspace.root().join("empty");
    std::fs::create_dir(&empty).unwrap();
    git(&empty, &["init", "-b", "trunk"]);

    let output = workspace.gbt().arg("status").output().unwrap();
    let stdout_text = stdout(&output);

    let line = report_line(&stdout_text, "empty");
    assert!(line.contains("Empty on trunk"), "{line}");
}

#[test]
fn test_status_only_does_not_fetch() {
    let workspace = TestWorkspace::new();
    let (upstream, _clone) = workspace.add_clone("widget");
    workspace.commit(&upstream, "lib.rs", "Add library");

    let output = workspace.gbt().arg("status").output().unwrap();
    let stdout_text = stdout(&output);

    let line = report_line(&stdout_text, "widget");
    assert!(line.contains("Up to date"), "{line}");
}
