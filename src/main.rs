use std::path::Path;

use clap::Parser;
use nametidy::cli::{Args, Command, HistoryArgs, HistoryCommand, TreeArgs};
use nametidy::rename::{self, CleanStrategy, NamingStrategy, NumberStrategy, RenameOptions};
use nametidy::revert::{self, RevertDirection, RevertOptions};
use nametidy::{
    logging, resolve_root, AppError, ExitCode, HistoryLocation, HistoryStore, Reporter,
};
use tracing::{debug, info};

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version also arrive here
            let code = if e.use_stderr() {
                ExitCode::InvalidUsage
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            std::process::exit(code.into());
        }
    };

    logging::init(args.verbosity());

    let mut reporter = Reporter::new();

    if let Err(e) = run(args, &mut reporter) {
        debug!("Command failed: {:?}", e);
        eprintln!("Error: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

fn run(args: Args, reporter: &mut Reporter) -> Result<(), AppError> {
    let history_db = args.history_db.as_deref();

    match args.command {
        Command::Clean(tree) => run_rename(history_db, &tree, &CleanStrategy, reporter),
        Command::Number(number) => {
            let strategy = NumberStrategy::new(number.numbered as usize, number.hierarchical);
            run_rename(history_db, &number.tree, &strategy, reporter)
        }
        Command::Undo(tree) => run_revert(history_db, &tree, RevertDirection::Undo, reporter),
        Command::Redo(tree) => run_revert(history_db, &tree, RevertDirection::Redo, reporter),
        Command::History(HistoryCommand::Clear(history)) => {
            let mut store = open_history(history_db, &history)?;
            let removed = store.clear()?;
            info!("Cleared {} history entries", removed);
            reporter.history_cleared(removed);
            Ok(())
        }
        Command::History(HistoryCommand::List(history)) => {
            let store = open_history(history_db, &history)?;
            reporter.batch_list(&store.batches()?);
            Ok(())
        }
    }
}

fn run_rename(
    history_db: Option<&Path>,
    tree: &TreeArgs,
    strategy: &dyn NamingStrategy,
    reporter: &mut Reporter,
) -> Result<(), AppError> {
    let root = resolve_root(&tree.path)?;
    let mut store = HistoryLocation::resolve(history_db, tree.sidecar, Some(&root))?.open()?;

    let options = RenameOptions {
        dry_run: tree.dry_run,
        ..Default::default()
    };
    let result = rename::run(&root, strategy, &options, store.as_mut(), reporter)?;
    reporter.rename_summary(&result);

    if result.has_failures() {
        return Err(AppError::PartialFailure {
            failed: result.failures.len(),
        });
    }
    Ok(())
}

fn run_revert(
    history_db: Option<&Path>,
    tree: &TreeArgs,
    direction: RevertDirection,
    reporter: &mut Reporter,
) -> Result<(), AppError> {
    let root = resolve_root(&tree.path)?;
    let mut store = HistoryLocation::resolve(history_db, tree.sidecar, Some(&root))?.open()?;

    let options = RevertOptions {
        dry_run: tree.dry_run,
    };
    let result = match direction {
        RevertDirection::Undo => revert::undo(store.as_mut(), &options, reporter)?,
        RevertDirection::Redo => revert::redo(store.as_mut(), &options, reporter)?,
    };
    reporter.revert_summary(&result);

    if result.has_failures() {
        return Err(AppError::PartialFailure {
            failed: result.failures.len(),
        });
    }
    Ok(())
}

fn open_history(
    history_db: Option<&Path>,
    history: &HistoryArgs,
) -> Result<Box<dyn HistoryStore>, AppError> {
    let root = match (&history.path, history.sidecar) {
        (Some(path), true) => Some(resolve_root(path)?),
        _ => None,
    };
    HistoryLocation::resolve(history_db, history.sidecar, root.as_deref())?.open()
}
