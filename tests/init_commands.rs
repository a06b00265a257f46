use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;
use common::command::{read_ref, repository_dir, run_dotgit_command};

#[rstest]
fn init_creates_the_control_directory(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized empty repository in"));

    let control = dir.path().join(".dotgit");
    assert!(control.join("objects").is_dir());
    assert!(control.join("refs/heads").is_dir());
    assert!(control.join("refs/tags").is_dir());
    assert!(control.join("refs/remotes").is_dir());
    assert!(control.join("config").is_file());
    assert!(control.join("index").is_file());

    assert_eq!(read_ref(dir.path(), "HEAD"), "ref: refs/heads/main");

    Ok(())
}

#[rstest]
fn init_twice_fails_with_repository_exists(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    run_dotgit_command(dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    Ok(())
}

#[rstest]
fn init_honors_a_path_argument(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;
    let nested = dir.path().join("nested/project");

    run_dotgit_command(dir.path(), &["init", nested.to_str().unwrap()])
        .assert()
        .success();

    assert!(nested.join(".dotgit").is_dir());

    Ok(())
}

#[rstest]
fn commands_outside_a_repository_fail(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a dotgit repository"));

    Ok(())
}
