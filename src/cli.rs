use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "nametidy")]
#[command(author, version, long_about = None)]
#[command(about = "Clean up and number file names across a directory tree, with undo and redo")]
pub struct Args {
    /// History database to use instead of ~/.name_tidy_history.db
    #[arg(long, global = true, value_name = "FILE")]
    pub history_db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replace disallowed characters in every file name under a directory
    Clean(TreeArgs),

    /// Prefix every file name under a directory with a sequence number
    Number(NumberArgs),

    /// Restore the names changed by the most recent operation
    Undo(TreeArgs),

    /// Re-apply the most recently undone operation
    Redo(TreeArgs),

    /// Inspect or erase the rename history
    #[command(subcommand)]
    History(HistoryCommand),
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Delete every history entry
    Clear(HistoryArgs),

    /// List recorded operations, newest first
    List(HistoryArgs),
}

/// Options shared by commands that work on a directory tree
#[derive(ClapArgs, Debug, Clone)]
pub struct TreeArgs {
    /// Root of the directory tree
    #[arg(short, long, value_name = "DIR")]
    pub path: PathBuf,

    /// Show what would change without renaming anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Keep history in a .NameTidy_History file at the tree root
    #[arg(long)]
    pub sidecar: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct NumberArgs {
    #[command(flatten)]
    pub tree: TreeArgs,

    /// Minimum width of the zero-padded number
    #[arg(
        short = 'n',
        long,
        default_value = "3",
        value_name = "DIGITS",
        value_parser = clap::value_parser!(u32).range(1..=255)
    )]
    pub numbered: u32,

    /// Restart numbering in every directory
    #[arg(long)]
    pub hierarchical: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct HistoryArgs {
    /// Tree whose sidecar history to use
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Use the .NameTidy_History file at --path
    #[arg(long, requires = "path")]
    pub sidecar: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn verbosity(&self) -> u8 {
        match &self.command {
            Command::Clean(tree) | Command::Undo(tree) | Command::Redo(tree) => tree.verbose,
            Command::Number(number) => number.tree.verbose,
            Command::History(HistoryCommand::Clear(h) | HistoryCommand::List(h)) => h.verbose,
        }
    }
}
