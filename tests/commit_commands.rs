mod common;

use common::command::{head_commit_id, init_repository_dir, run_lit_command};
use common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

#[rstest]
fn committing_staged_changes_advances_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    let first_commit = head_commit_id(dir.path());

    write_file(FileSpec::new(dir.path().join("new.txt"), "new".to_string()));
    run_lit_command(dir.path(), &["add", "new.txt"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["commit", "Second commit"])
        .assert()
        .success();

    let second_commit = head_commit_id(dir.path());
    assert_ne!(first_commit, second_commit);

    run_lit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Second commit"))
        .stdout(predicate::str::contains("First commit"));
}

#[rstest]
fn committing_with_an_empty_stage_fails(init_repository_dir: TempDir) {
    run_lit_command(init_repository_dir.path(), &["commit", "Nothing here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No changes added to the commit."));
}

#[rstest]
fn committing_with_a_blank_message_fails(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("new.txt"), "new".to_string()));
    run_lit_command(dir.path(), &["add", "new.txt"])
        .assert()
        .success();

    run_lit_command(dir.path(), &["commit", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a commit message."));
}

#[rstest]
fn commit_clears_the_stage(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("new.txt"), "new".to_string()));
    run_lit_command(dir.path(), &["add", "new.txt"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["commit", "Second commit"])
        .assert()
        .success();

    run_lit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "=== Staged Files ===\n\n=== Removed Files ===",
        ));
}

#[rstest]
fn a_staged_removal_untracks_the_path(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_lit_command(dir.path(), &["rm", "1.txt"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["commit", "Drop 1.txt"])
        .assert()
        .success();

    // removing again has nothing to act on
    run_lit_command(dir.path(), &["rm", "1.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No reason to remove the file."));
}

#[rstest]
fn global_log_sees_commits_from_every_branch(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_lit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.path().join("f.txt"), "f".to_string()));
    run_lit_command(dir.path(), &["add", "f.txt"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["commit", "Feature commit"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();

    // the feature commit is unreachable from master but still listed
    run_lit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Feature commit").not());
    run_lit_command(dir.path(), &["global-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Feature commit"))
        .stdout(predicate::str::contains("First commit"));
}

#[rstest]
fn find_prints_ids_of_matching_commits(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    let first_commit = head_commit_id(dir.path());

    run_lit_command(dir.path(), &["find", "First commit"])
        .assert()
        .success()
        .stdout(predicate::str::contains(&first_commit));

    run_lit_command(dir.path(), &["find", "No such message"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Found no commit with that message."));
}

#[rstest]
fn log_marks_merge_commits_with_both_parents(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_lit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();

    write_file(FileSpec::new(dir.path().join("m.txt"), "m".to_string()));
    run_lit_command(dir.path(), &["add", "m.txt"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["commit", "Master side"])
        .assert()
        .success();

    run_lit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.path().join("f.txt"), "f".to_string()));
    run_lit_command(dir.path(), &["add", "f.txt"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["commit", "Feature side"])
        .assert()
        .success();

    run_lit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success();

    run_lit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Merge: "))
        .stdout(predicate::str::contains("Merged feature into master."));
}
