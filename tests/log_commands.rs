mod common;

use common::command::{head_commit_ids, init_repository_dir, run_lit_command};
use common::file::{FileSpec, write_file, write_generated_files};
use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;
use std::path::Path;

fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(name), content.to_string()));
    run_lit_command(dir, &["add", name]).assert().success();
    run_lit_command(dir, &["commit", message]).assert().success();
}

#[rstest]
fn log_walks_history_newest_first(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    commit_file(dir.path(), "1.txt", "v2", "Second commit");
    commit_file(dir.path(), "1.txt", "v3", "Third commit");

    let output = run_lit_command(dir.path(), &["log"])
        .output()
        .unwrap()
        .stdout;
    let output = String::from_utf8(output).unwrap();

    let third = output.find("Third commit").unwrap();
    let second = output.find("Second commit").unwrap();
    let first = output.find("First commit").unwrap();
    let root = output.find("initial commit").unwrap();
    assert!(third < second && second < first && first < root);

    // one block per reachable commit
    assert_eq!(output.matches("===").count(), 4);
}

#[rstest]
fn log_blocks_carry_id_date_and_message(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    let head_id = head_commit_ids(dir.path()).remove(0);

    run_lit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("commit {}", head_id)))
        .stdout(predicate::str::is_match(r"Date: \w{3} \w{3} \d{1,2} \d{2}:\d{2}:\d{2} \d{4} \+0000").unwrap());
}

#[rstest]
fn log_follows_only_first_parents_through_merges(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_lit_command(dir.path(), &["branch", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "master.txt", "m", "Master side");

    run_lit_command(dir.path(), &["checkout", "feature"])
        .assert()
        .success();
    commit_file(dir.path(), "feature.txt", "f", "Feature side");

    run_lit_command(dir.path(), &["checkout", "master"])
        .assert()
        .success();
    run_lit_command(dir.path(), &["merge", "feature"])
        .assert()
        .success();

    run_lit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Master side"))
        .stdout(predicate::str::contains("Feature side").not());
}

#[rstest]
fn log_reflects_a_reset_head(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    let first_commit = head_commit_ids(dir.path()).remove(0);

    commit_file(dir.path(), "1.txt", "v2", "Second commit");
    run_lit_command(dir.path(), &["reset", &first_commit])
        .assert()
        .success();

    run_lit_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Second commit").not());
}

#[rstest]
fn status_lists_staged_files_in_name_order(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    let mut files = write_generated_files(dir.path(), 5);
    for file in &files {
        let name = file.path.file_name().unwrap().to_string_lossy().to_string();
        run_lit_command(dir.path(), &["add", &name])
            .assert()
            .success();
    }

    files.sort_by_key(|file| file.path.file_name().unwrap().to_os_string());
    let expected = files
        .iter()
        .map(|file| file.path.file_name().unwrap().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("\n");

    run_lit_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "=== Staged Files ===\n{}",
            expected
        )));
}
