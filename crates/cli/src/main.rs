//! swstack: command-line front end for swinstall stacks.
//!
//! One command per invocation: the stack is opened, queried or mutated,
//! and the result printed. Errors go to stderr and exit with status 1.

mod commands;
mod format;
mod parse;

use std::path::{Path, PathBuf};
use std::process;

use swstack_core::Result;
use swstack_engine::{StackConfig, StackManager, CONFIG_FILE_NAME};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_created, format_entries, format_error, format_metadata, OutputMode};
use parse::{install_request, matches_to_action, CliAction};

fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_count("verbose"));

    let mode = if matches.get_flag("json") {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let action = match matches_to_action(&matches) {
        Ok(action) => action,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(1);
        }
    };

    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    let result = load_manager(config_path.as_deref()).and_then(|manager| run(&manager, action, mode));

    match result {
        Ok(text) => {
            if !text.is_empty() {
                println!("{}", text);
            }
        }
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    }
}

/// `RUST_LOG` wins; otherwise warnings only, raised by `-v`.
fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn load_manager(config_path: Option<&Path>) -> Result<StackManager> {
    let config = match config_path {
        Some(path) => StackConfig::from_file(path)?,
        None => StackConfig::load_or_default(Path::new(CONFIG_FILE_NAME))?,
    };
    debug!(?config, "Loaded configuration");
    StackManager::new(&config)
}

fn run(manager: &StackManager, action: CliAction, mode: OutputMode) -> Result<String> {
    debug!(file = %action.file().display(), "Running command");

    match action {
        CliAction::Init { file, schema } => {
            let stack = manager.create(&file, &schema)?;
            Ok(format_created(
                stack.paths().document(),
                stack.schema_id().as_str(),
                mode,
            ))
        }
        CliAction::Install {
            file,
            content,
            revision,
            at,
        } => {
            let request = install_request(content.as_ref(), revision.as_ref(), at)?;
            let mut stack = manager.resolve(&file)?;
            let installed = stack.insert(request)?;
            Ok(format_metadata(&installed, mode))
        }
        CliAction::Rollback { file, at } => {
            let mut stack = manager.resolve(&file)?;
            let restored = stack.rollback(at)?;
            Ok(format_metadata(&restored, mode))
        }
        CliAction::Current { file } => {
            let stack = manager.resolve(&file)?;
            Ok(format_metadata(&stack.current()?, mode))
        }
        CliAction::Version { file, version } => {
            let stack = manager.resolve(&file)?;
            Ok(format_metadata(&stack.version(&version)?, mode))
        }
        CliAction::FileOn { file, at } => {
            let stack = manager.resolve(&file)?;
            Ok(format_metadata(&stack.file_on(at)?, mode))
        }
        CliAction::History { file } => {
            let stack = manager.resolve(&file)?;
            let current = match stack.current() {
                Ok(current) => Some(current),
                Err(e) if e.is_not_found() => None,
                Err(e) => return Err(e),
            };
            Ok(format_entries(&stack.entries()?, current.as_ref(), mode))
        }
    }
}
