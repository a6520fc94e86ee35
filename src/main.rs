use clap::{Parser, Subcommand};
use lit::areas::repository::Repository;
use lit::errors::RepoError;
use std::path::Path;

#[derive(Parser)]
#[command(
    name = "lit",
    version = "0.1.0",
    about = "A simple local version-control system",
    long_about = "This is a simple local version-control system, written in Rust. \
    It is not meant to be a full replacement for git, \
    but rather a learning project to understand how version control works under the hood.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(name = "add", about = "Stage a file for the next commit")]
    Add {
        #[arg(index = 1, help = "The file to stage")]
        file: String,
    },
    #[command(
        name = "rm",
        about = "Unstage a file, or stage a tracked file for removal"
    )]
    Rm {
        #[arg(index = 1, help = "The file to remove")]
        file: String,
    },
    #[command(name = "commit", about = "Create a new commit from the staged changes")]
    Commit {
        #[arg(index = 1, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Display the history of the current branch")]
    Log,
    #[command(name = "global-log", about = "Display every commit ever made")]
    GlobalLog,
    #[command(name = "find", about = "Print the ids of commits with the given message")]
    Find {
        #[arg(index = 1, help = "The commit message to search for")]
        message: String,
    },
    #[command(name = "status", about = "Display branches and staged changes")]
    Status,
    #[command(
        name = "checkout",
        about = "Check out a branch, or restore files from a commit",
        long_about = "This command switches to a branch, restores a file from the head commit \
        (checkout -- <file>) or restores a file from an arbitrary commit \
        (checkout <commit-id> -- <file>)."
    )]
    Checkout {
        #[arg(index = 1, help = "The branch or commit id to check out from")]
        target: Option<String>,
        #[arg(index = 2, last = true, help = "The file to restore")]
        file: Option<String>,
    },
    #[command(name = "branch", about = "Create a new branch at the current commit")]
    Branch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "rm-branch", about = "Delete a branch pointer")]
    RmBranch {
        #[arg(index = 1, help = "The branch name")]
        name: String,
    },
    #[command(name = "reset", about = "Move the current branch to a commit and check it out")]
    Reset {
        #[arg(index = 1, help = "The commit id to reset to")]
        commit: String,
    },
    #[command(name = "merge", about = "Merge a branch into the current branch")]
    Merge {
        #[arg(index = 1, help = "The branch to merge from")]
        branch: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(error) = run(&cli) {
        match error.downcast_ref::<RepoError>() {
            Some(repo_error) => eprintln!("{repo_error}"),
            None => eprintln!("{error:#}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init { path } => {
            let repository = match path {
                Some(path) => Repository::new(path, Box::new(std::io::stdout()))?,
                None => open_repository()?,
            };

            repository.init()
        }
        Commands::Add { file } => open_repository()?.add(Path::new(file)),
        Commands::Rm { file } => open_repository()?.rm(Path::new(file)),
        Commands::Commit { message } => open_repository()?.commit(message),
        Commands::Log => open_repository()?.log(),
        Commands::GlobalLog => open_repository()?.global_log(),
        Commands::Find { message } => open_repository()?.find(message),
        Commands::Status => open_repository()?.status(),
        Commands::Checkout { target, file } => {
            let repository = open_repository()?;

            match (target, file) {
                (Some(commit_id), Some(file)) => {
                    repository.checkout_file_from_commit(commit_id, Path::new(file))
                }
                (None, Some(file)) => repository.checkout_file_from_head(Path::new(file)),
                (Some(branch), None) => repository.checkout_branch(branch),
                (None, None) => anyhow::bail!("Incorrect operands."),
            }
        }
        Commands::Branch { name } => open_repository()?.branch(name),
        Commands::RmBranch { name } => open_repository()?.rm_branch(name),
        Commands::Reset { commit } => open_repository()?.reset(commit),
        Commands::Merge { branch } => open_repository()?.merge(branch),
    }
}

fn open_repository() -> anyhow::Result<Repository> {
    let pwd = std::env::current_dir()?;
    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}
