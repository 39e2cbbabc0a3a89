use crate::common::{TestWorkspace, commit_at, git, git_date_ago, stdout};

const HOUR: u64 = 60 * 60;

#[test]
fn test_log_merges_repositories_newest_first() {
    let workspace = TestWorkspace::new();
    let alpha = workspace.add_repo("alpha");
    let beta = workspace.add_repo("beta");
    commit_at(&alpha, "a.txt", "Alpha change", Some(&git_date_ago(3 * HOUR)));
    commit_at(&beta, "b.txt", "Beta change", Some(&git_date_ago(HOUR)));

    let output = workspace.gbt().arg("log").output().unwrap();
    assert!(output.status.success(), "{output:?}");
    let stdout = stdout(&output);

    let beta_at = stdout.find("Beta change").expect("beta commit listed");
    let alpha_at = stdout.find("Alpha change").expect("alpha commit listed");
    assert!(beta_at < alpha_at, "{stdout}");

    let line = stdout.lines().find(|l| l.contains("Alpha change")).unwrap();
    assert!(line.starts_with("alpha [ Test User 3 hours ago"), "{line}");
}

#[test]
fn test_log_excludes_old_commits() {
    let workspace = TestWorkspace::new();
    workspace.add_repo("fresh");
    let ancient = workspace.add_repo("ancient");
    commit_at(&ancient, "old.txt", "Ancient change", Some("978307200 +0000"));

    let output = workspace.gbt().args(["log", "30"]).output().unwrap();
    let stdout = stdout(&output);

    assert!(stdout.contains("Initial commit"), "{stdout}");
    assert!(!stdout.contains("Ancient change"), "{stdout}");
}

#[test]
fn test_log_window_ends_at_source_date_epoch() {
    let workspace = TestWorkspace::new();
    let ancient = workspace.add_repo("ancient");
    commit_at(&ancient, "old.txt", "Ancient change", Some("978307200 +0000"));

    // Five days after the ancient commit
    let output = workspace
        .gbt()
        .env("SOURCE_DATE_EPOCH", (978_307_200 + 5 * 24 * HOUR).to_string())
        .args(["log", "30"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("Ancient change"), "{}", stdout(&output));
}

#[test]
fn test_log_includes_other_branches() {
    let workspace = TestWorkspace::new();
    let repo = workspace.add_repo("widget");
    git(&repo, &["checkout", "-b", "topic"]);
    workspace.commit(&repo, "topic.txt", "Topic work");
    git(&repo, &["checkout", "main"]);

    let output = workspace.gbt().args(["log", "1"]).output().unwrap();

    assert!(stdout(&output).contains("Topic work"));
}

#[test]
fn test_log_without_commits_prints_frame_only() {
    let workspace = TestWorkspace::new();
    let empty = workspace.root().join("empty");
    std::fs::create_dir(&empty).unwrap();
    git(&empty, &["init", "-b", "main"]);

    let output = workspace.gbt().arg("log").output().unwrap();

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert_eq!(stdout.lines().count(), 2, "{stdout}");
}
