#![allow(dead_code)]

use crate::areas::repository::Repository;
use crate::artifacts::merge::three_way::MergeStrategy;
use crate::commands::porcelain::reset::ResetMode;
use crate::errors::RepoError;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod areas;
mod artifacts;
mod commands;
mod errors;

#[derive(Parser)]
#[command(
    name = "dotgit",
    version = "0.1.0",
    about = "A local, file-based version control engine",
    long_about = "dotgit keeps snapshots of a workspace in a content-addressed \
    object store under a hidden control directory, with branches, tags, a \
    staging index, diffs, and three-way merges. No network, no daemons.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Initialize a new repository")]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "cat-file", about = "Print the content of an object")]
    CatFile {
        #[arg(short = 'p', long, help = "The object id to print")]
        id: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object store"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(about = "Add files or directories to the index")]
    Add {
        #[arg(index = 1, required = true, help = "The files or directories to stage")]
        paths: Vec<String>,
    },
    #[command(about = "Create a new commit from the index")]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(about = "Show the working tree status")]
    Status {
        #[arg(long, help = "Machine-readable XY output")]
        porcelain: bool,
    },
    #[command(about = "Show changes between the workspace, index, and HEAD")]
    Diff {
        #[arg(long, help = "Compare the index against HEAD instead")]
        staged: bool,
    },
    #[command(about = "List, create, or delete branches")]
    Branch {
        #[arg(index = 1, help = "Name of the branch to create")]
        name: Option<String>,
        #[arg(short = 'd', long = "delete", help = "Delete a merged branch")]
        delete: Option<String>,
        #[arg(short = 'D', help = "Delete a branch even if unmerged")]
        force_delete: Option<String>,
    },
    #[command(about = "Switch to another branch or commit")]
    Checkout {
        #[arg(index = 1, help = "Branch, tag, or commit to switch to")]
        target: String,
        #[arg(short, long, help = "Discard local changes in the way")]
        force: bool,
    },
    #[command(about = "Merge another branch into the current one")]
    Merge {
        #[arg(index = 1, help = "The branch to merge in")]
        branch: String,
        #[arg(short, long, help = "Message for the merge commit")]
        message: Option<String>,
        #[arg(long, conflicts_with = "theirs", help = "Resolve conflicts keeping our side")]
        ours: bool,
        #[arg(long, help = "Resolve conflicts taking their side")]
        theirs: bool,
    },
    #[command(about = "Show the commit history")]
    Log {
        #[arg(index = 1, help = "Revision to start from (default HEAD)")]
        revision: Option<String>,
        #[arg(short, long, help = "Show the patch of each commit")]
        patch: bool,
        #[arg(short = 'n', long = "max-count", help = "Bound the number of commits")]
        max_count: Option<usize>,
    },
    #[command(about = "List, create, or delete tags")]
    Tag {
        #[arg(index = 1, help = "Name of the tag to create")]
        name: Option<String>,
        #[arg(index = 2, help = "Message (creates an annotated tag)")]
        message: Option<String>,
        #[arg(short = 'd', long = "delete", help = "Delete a tag")]
        delete: Option<String>,
    },
    #[command(about = "Manage the remote-URL registry")]
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    #[command(about = "Read or write configuration values")]
    Config {
        #[arg(index = 1, help = "Key in section.key form")]
        key: Option<String>,
        #[arg(index = 2, help = "Value to set")]
        value: Option<String>,
        #[arg(long, help = "List all settings")]
        list: bool,
        #[arg(long, help = "Remove the key")]
        unset: bool,
    },
    #[command(about = "Move HEAD, and optionally the index and workspace")]
    Reset {
        #[arg(index = 1, help = "Revision to reset to")]
        revision: String,
        #[arg(long, conflicts_with_all = ["mixed", "hard"], help = "Move HEAD only")]
        soft: bool,
        #[arg(long, conflicts_with = "hard", help = "Move HEAD and the index (default)")]
        mixed: bool,
        #[arg(long, help = "Also rewrite the workspace")]
        hard: bool,
        #[arg(short, long, help = "Discard local changes without asking")]
        force: bool,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    #[command(about = "Register a remote URL")]
    Add {
        #[arg(index = 1)]
        name: String,
        #[arg(index = 2)]
        url: String,
    },
    #[command(about = "Remove a remote")]
    Remove {
        #[arg(index = 1)]
        name: String,
    },
    #[command(about = "List remotes")]
    List,
}

fn open_here() -> anyhow::Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::open(pwd, Box::new(std::io::stdout()))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let root = match path {
                Some(path) => std::path::PathBuf::from(path),
                None => std::env::current_dir()?,
            };
            let repository = Repository::new(root, Box::new(std::io::stdout()))?;
            repository.init().await
        }
        Commands::CatFile { id } => open_here()?.cat_file(&id).await,
        Commands::HashObject { write, file } => open_here()?.hash_object(&file, write).await,
        Commands::Add { paths } => open_here()?.add(&paths).await,
        Commands::Commit { message } => {
            open_here()?.commit(&message).await?;
            Ok(())
        }
        Commands::Status { porcelain } => {
            open_here()?.status(porcelain).await?;
            Ok(())
        }
        Commands::Diff { staged } => open_here()?.diff(staged).await,
        Commands::Branch {
            name,
            delete,
            force_delete,
        } => {
            let repository = open_here()?;
            if let Some(name) = delete {
                repository.branch_delete(&name, false).await
            } else if let Some(name) = force_delete {
                repository.branch_delete(&name, true).await
            } else if let Some(name) = name {
                repository.branch_create(&name).await
            } else {
                repository.branch_list().await
            }
        }
        Commands::Checkout { target, force } => open_here()?.checkout(&target, force).await,
        Commands::Merge {
            branch,
            message,
            ours,
            theirs,
        } => {
            let strategy = if ours {
                MergeStrategy::Ours
            } else if theirs {
                MergeStrategy::Theirs
            } else {
                MergeStrategy::Mark
            };
            open_here()?.merge(&branch, strategy, message).await
        }
        Commands::Log {
            revision,
            patch,
            max_count,
        } => open_here()?.log(revision, patch, max_count).await,
        Commands::Tag {
            name,
            message,
            delete,
        } => {
            let repository = open_here()?;
            if let Some(name) = delete {
                repository.tag_delete(&name).await
            } else if let Some(name) = name {
                repository.tag_create(&name, message).await
            } else {
                repository.tag_list().await
            }
        }
        Commands::Remote { command } => {
            let repository = open_here()?;
            match command {
                RemoteCommands::Add { name, url } => repository.remote_add(&name, &url).await,
                RemoteCommands::Remove { name } => repository.remote_remove(&name).await,
                RemoteCommands::List => repository.remote_list().await,
            }
        }
        Commands::Config {
            key,
            value,
            list,
            unset,
        } => {
            let repository = open_here()?;
            if list {
                repository.config_list().await
            } else if let Some(key) = key {
                repository.config_access(&key, value, unset).await
            } else {
                Err(RepoError::InvalidArgument("a key or --list is required".into()).into())
            }
        }
        Commands::Reset {
            revision,
            soft,
            mixed: _,
            hard,
            force,
        } => {
            let mode = if soft {
                ResetMode::Soft
            } else if hard {
                ResetMode::Hard
            } else {
                ResetMode::Mixed
            };
            open_here()?.reset(&revision, mode, force).await
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("fatal: {}", error);

        let code = error
            .chain()
            .find_map(|cause| cause.downcast_ref::<RepoError>())
            .map(RepoError::exit_code)
            .unwrap_or(1);
        std::process::exit(code);
    }
}
