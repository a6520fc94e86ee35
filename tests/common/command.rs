use crate::common::file::{FileSpec, write_file};
use crate::common::redirect_temp_dir;
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    redirect_temp_dir();
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with one commit tracking 1.txt, a/2.txt and a/b/3.txt
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_lit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    let file1 = FileSpec::new(repository_dir.path().join("1.txt"), "one".to_string());
    write_file(file1);

    let file2 = FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    );
    write_file(file2);

    let file3 = FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    );
    write_file(file3);

    for file in ["1.txt", "a/2.txt", "a/b/3.txt"] {
        run_lit_command(repository_dir.path(), &["add", file])
            .assert()
            .success();
    }

    run_lit_command(repository_dir.path(), &["commit", "First commit"])
        .assert()
        .success();

    repository_dir
}

pub fn run_lit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("lit").expect("Failed to find lit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

/// Ids of the commits reachable from HEAD along first parents, newest first
pub fn head_commit_ids(dir: &Path) -> Vec<String> {
    let output = run_lit_command(dir, &["log"])
        .output()
        .expect("Failed to run log");

    String::from_utf8(output.stdout)
        .expect("log output is not UTF-8")
        .lines()
        .filter_map(|line| line.strip_prefix("commit "))
        .map(|id| id.to_string())
        .collect()
}

pub fn head_commit_id(dir: &Path) -> String {
    head_commit_ids(dir)
        .into_iter()
        .next()
        .expect("no commits reachable from HEAD")
}
