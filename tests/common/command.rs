use assert_cmd::Command;
use assert_fs::TempDir;
use derive_new::new;
use rstest::fixture;
use std::path::Path;

use crate::common::file::{FileSpec, write_file};

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository with one initial commit: `1.txt` at the root and `a/2.txt`
/// nested one level down.
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_dotgit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one\n".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two\n".to_string(),
    ));

    run_dotgit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    dotgit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_dotgit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("dotgit").expect("Failed to find dotgit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

#[derive(Debug, Clone, new)]
struct RandomAuthor {
    name: String,
    email: String,
}

fn generate_random_author() -> RandomAuthor {
    use fake::Fake;
    use fake::faker::internet::en::FreeEmail;
    use fake::faker::name::en::Name;

    let name = Name().fake::<String>().replace(' ', "_");
    let email = FreeEmail().fake::<String>();
    RandomAuthor::new(name, email)
}

pub fn dotgit_commit(dir: &Path, message: &str) -> Command {
    let author = generate_random_author();
    let mut cmd = run_dotgit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("DOTGIT_AUTHOR_NAME", author.name.as_str()),
        ("DOTGIT_AUTHOR_EMAIL", author.email.as_str()),
    ]);
    cmd
}

/// Read a reference file and return the trimmed hash it holds.
pub fn read_ref(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(".dotgit").join(name))
        .unwrap_or_else(|e| panic!("Failed to read ref {}: {}", name, e))
        .trim()
        .to_string()
}

/// Lines of `status --porcelain` output.
pub fn porcelain_status(dir: &Path) -> Vec<String> {
    let output = run_dotgit_command(dir, &["status", "--porcelain"])
        .assert()
        .success();
    String::from_utf8(output.get_output().stdout.clone())
        .expect("status output is UTF-8")
        .lines()
        .map(String::from)
        .collect()
}
