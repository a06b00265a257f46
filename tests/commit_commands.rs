use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;
use common::command::{
    dotgit_commit, porcelain_status, read_ref, repository_dir, run_dotgit_command,
};
use common::file::{FileSpec, write_file};

/// Scenario: init, stage one file, commit.
///
/// The store holds exactly three objects (blob, tree, commit), the default
/// branch holds the commit hash, HEAD stays symbolic, and nothing is left
/// pending in the index.
#[rstest]
fn first_commit_writes_blob_tree_and_commit(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("hello.txt"), "hi\n".into()));
    run_dotgit_command(dir.path(), &["add", "hello.txt"])
        .assert()
        .success();

    dotgit_commit(dir.path(), "first")
        .assert()
        .success()
        .stdout(predicate::str::contains("root-commit"))
        .stdout(predicate::str::contains("first"));

    let objects: Vec<_> = std::fs::read_dir(dir.path().join(".dotgit/objects"))?
        .filter_map(|entry| entry.ok())
        .collect();
    assert_eq!(objects.len(), 3);

    let commit_hash = read_ref(dir.path(), "refs/heads/main");
    assert_eq!(commit_hash.len(), 64);
    assert_eq!(read_ref(dir.path(), "HEAD"), "ref: refs/heads/main");

    // Nothing staged, nothing modified, nothing untracked.
    assert!(porcelain_status(dir.path()).is_empty());

    Ok(())
}

#[rstest]
fn committing_with_nothing_staged_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    dotgit_commit(dir.path(), "empty")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn committing_an_unchanged_tree_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("a.txt"), "a\n".into()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "first").assert().success();

    dotgit_commit(dir.path(), "again")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to commit"));

    Ok(())
}

#[rstest]
fn commits_chain_through_first_parents(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("a.txt"), "v1\n".into()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "first").assert().success();
    let first = read_ref(dir.path(), "refs/heads/main");

    write_file(FileSpec::new(dir.path().join("a.txt"), "v2\n".into()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "second").assert().success();
    let second = read_ref(dir.path(), "refs/heads/main");

    assert_ne!(first, second);

    let output = run_dotgit_command(dir.path(), &["cat-file", "-p", &second])
        .assert()
        .success();
    let rendered = String::from_utf8(output.get_output().stdout.clone())?;
    assert!(rendered.contains(&format!("parent {}", first)));

    Ok(())
}

/// Scenario: committing on a detached HEAD creates a commit without moving
/// any branch.
#[rstest]
fn detached_commit_does_not_advance_a_branch(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("a.txt"), "v1\n".into()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "first").assert().success();
    let main_before = read_ref(dir.path(), "refs/heads/main");

    run_dotgit_command(dir.path(), &["checkout", &main_before])
        .assert()
        .success();

    let status = run_dotgit_command(dir.path(), &["status"]).assert().success();
    let rendered = String::from_utf8(status.get_output().stdout.clone())?;
    assert!(rendered.contains("HEAD detached at"));

    write_file(FileSpec::new(dir.path().join("a.txt"), "v2\n".into()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "floating").assert().success();

    // The branch stays put; HEAD itself carries the new commit.
    assert_eq!(read_ref(dir.path(), "refs/heads/main"), main_before);
    let head = read_ref(dir.path(), "HEAD");
    assert_eq!(head.len(), 64);
    assert_ne!(head, main_before);

    Ok(())
}
