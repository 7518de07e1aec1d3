//! Clap command tree definition.

use clap::{Arg, ArgAction, ArgGroup, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("swstack")
        .about("Install and rollback history for swinstalled files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file (default: ./swstack.toml if present)")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log engine activity to stderr (-vv for trace)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_init())
        .subcommand(build_install())
        .subcommand(build_rollback())
        .subcommand(build_current())
        .subcommand(build_version())
        .subcommand(build_file_on())
        .subcommand(build_history())
}

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_name("FILE")
        .help("Versionless file tracked by the stack")
}

fn at_arg(help: &'static str) -> Arg {
    Arg::new("at")
        .long("at")
        .value_name("YYYYMMDD-HHMMSS")
        .help(help)
}

// =========================================================================
// Mutations
// =========================================================================

fn build_init() -> Command {
    Command::new("init")
        .about("Create an empty stack for a file")
        .arg(file_arg())
        .arg(
            Arg::new("schema")
                .long("schema")
                .value_name("ID")
                .default_value("2")
                .help("Stack schema"),
        )
}

fn build_install() -> Command {
    Command::new("install")
        .about("Record a new install and make it current")
        .arg(file_arg())
        .arg(
            Arg::new("hash")
                .long("hash")
                .value_name("HASH")
                .help("Content hash of the installed file"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .value_name("PATH")
                .help("Hash this file's contents with SHA-256"),
        )
        .group(ArgGroup::new("content").args(["hash", "source"]))
        .arg(
            Arg::new("revision")
                .long("revision")
                .short('r')
                .value_name("REV")
                .help("VCS revision of the installed content"),
        )
        .arg(at_arg("Install time (default: now)"))
}

fn build_rollback() -> Command {
    Command::new("rollback")
        .about("Make the previous version current")
        .arg(file_arg())
        .arg(at_arg("Rollback time (default: now)"))
}

// =========================================================================
// Queries
// =========================================================================

fn build_current() -> Command {
    Command::new("current")
        .about("Show the current version")
        .arg(file_arg())
}

fn build_version() -> Command {
    Command::new("version")
        .about("Show one version (number for schema 2, timestamp for schema 1)")
        .arg(file_arg())
        .arg(Arg::new("version").required(true).value_name("VERSION"))
}

fn build_file_on() -> Command {
    Command::new("file-on")
        .about("Show the version that was current at a point in time")
        .arg(file_arg())
        .arg(
            Arg::new("timestamp")
                .required(true)
                .value_name("YYYYMMDD-HHMMSS"),
        )
}

fn build_history() -> Command {
    Command::new("history")
        .about("List every entry in document order")
        .arg(file_arg())
}
