use assert_fs::TempDir;
use predicates::prelude::*;
use rstest::rstest;

mod common;
use common::command::{dotgit_commit, init_repository_dir, repository_dir, run_dotgit_command};
use common::file::{FileSpec, write_file};

/// Scenario: a one-line rewrite shows the old line with `-` and the new one
/// with `+`.
#[rstest]
fn workspace_diff_shows_minus_and_plus_lines(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    write_file(FileSpec::new(dir.path().join("hello.txt"), "hi\n".into()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "first").assert().success();

    write_file(FileSpec::new(
        dir.path().join("hello.txt"),
        "hi there\n".into(),
    ));

    run_dotgit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- a/hello.txt"))
        .stdout(predicate::str::contains("+++ b/hello.txt"))
        .stdout(predicate::str::contains("-hi\n"))
        .stdout(predicate::str::contains("+hi there\n"));

    Ok(())
}

#[rstest]
fn clean_tree_diffs_empty(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    run_dotgit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}

#[rstest]
fn staged_diff_compares_index_against_head(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("1.txt"), "one edited\n".into()));
    run_dotgit_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    // The edit is staged, so the plain diff is empty and --staged shows it.
    run_dotgit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    run_dotgit_command(dir.path(), &["diff", "--staged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-one\n"))
        .stdout(predicate::str::contains("+one edited\n"));

    Ok(())
}

#[rstest]
fn staged_diff_labels_new_files_against_dev_null(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    write_file(FileSpec::new(dir.path().join("new.txt"), "fresh\n".into()));
    run_dotgit_command(dir.path(), &["add", "new.txt"])
        .assert()
        .success();

    run_dotgit_command(dir.path(), &["diff", "--staged"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- /dev/null"))
        .stdout(predicate::str::contains("+++ b/new.txt"))
        .stdout(predicate::str::contains("+fresh\n"));

    Ok(())
}

#[rstest]
fn binary_content_is_not_line_diffed(
    init_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = init_repository_dir;

    std::fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, 3, 0, 255])?;
    run_dotgit_command(dir.path(), &["add", "blob.bin"])
        .assert()
        .success();
    dotgit_commit(dir.path(), "add binary").assert().success();

    std::fs::write(dir.path().join("blob.bin"), [0u8, 9, 9, 9, 0, 254])?;

    run_dotgit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Binary files a/blob.bin and b/blob.bin differ",
        ))
        .stdout(predicate::str::contains("+").not());

    Ok(())
}

#[rstest]
fn context_width_is_configurable(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;

    run_dotgit_command(dir.path(), &["init"]).assert().success();
    let body: String = (0..9).map(|n| format!("line {n}\n")).collect();
    write_file(FileSpec::new(dir.path().join("wide.txt"), body.clone()));
    run_dotgit_command(dir.path(), &["add", "."]).assert().success();
    dotgit_commit(dir.path(), "first").assert().success();

    write_file(FileSpec::new(
        dir.path().join("wide.txt"),
        body.replace("line 4\n", "LINE 4\n"),
    ));

    run_dotgit_command(dir.path(), &["config", "diff.context", "1"])
        .assert()
        .success();

    let output = run_dotgit_command(dir.path(), &["diff"]).assert().success();
    let rendered = String::from_utf8(output.get_output().stdout.clone())?;

    let context_lines = rendered
        .lines()
        .filter(|line| line.starts_with(' '))
        .count();
    assert_eq!(context_lines, 2);

    Ok(())
}
