//! ArgMatches → CliAction conversion.
//!
//! Argument text is validated here (timestamps, versions, schema ids) so the
//! stack is never opened for a command that cannot run.

use std::fs;
use std::path::PathBuf;

use clap::ArgMatches;
use sha2::{Digest, Sha256};
use swstack_core::{InstallRequest, SchemaId, StackError, StackVersion, Timestamp};

/// Where an install's content hash comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentHash {
    /// Hash given on the command line.
    Literal(String),
    /// SHA-256 of a file's contents.
    Source(PathBuf),
}

impl ContentHash {
    /// Produce the hash text.
    pub fn resolve(&self) -> Result<String, StackError> {
        match self {
            ContentHash::Literal(hash) => Ok(hash.clone()),
            ContentHash::Source(path) => {
                let bytes = fs::read(path)?;
                Ok(Sha256::digest(&bytes)
                    .iter()
                    .map(|b| format!("{:02x}", b))
                    .collect())
            }
        }
    }
}

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Init {
        file: PathBuf,
        schema: SchemaId,
    },
    Install {
        file: PathBuf,
        content: Option<ContentHash>,
        revision: Option<String>,
        at: Option<Timestamp>,
    },
    Rollback {
        file: PathBuf,
        at: Option<Timestamp>,
    },
    Current {
        file: PathBuf,
    },
    Version {
        file: PathBuf,
        version: StackVersion,
    },
    FileOn {
        file: PathBuf,
        at: Timestamp,
    },
    History {
        file: PathBuf,
    },
}

impl CliAction {
    /// The versionless file the action targets.
    pub fn file(&self) -> &PathBuf {
        match self {
            CliAction::Init { file, .. }
            | CliAction::Install { file, .. }
            | CliAction::Rollback { file, .. }
            | CliAction::Current { file }
            | CliAction::Version { file, .. }
            | CliAction::FileOn { file, .. }
            | CliAction::History { file } => file,
        }
    }
}

/// Build the engine request for an install.
pub fn install_request(
    content: Option<&ContentHash>,
    revision: Option<&String>,
    at: Option<Timestamp>,
) -> Result<InstallRequest, StackError> {
    let mut request = InstallRequest {
        hash: content.map(ContentHash::resolve).transpose()?,
        timestamp: at,
        revision: None,
    };
    if let Some(rev) = revision {
        request = request.revision(rev.as_str());
    }
    Ok(request)
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;
    let file = PathBuf::from(required(sub, "file")?);

    match sub_name {
        "init" => Ok(CliAction::Init {
            file,
            schema: SchemaId::new(required(sub, "schema")?),
        }),
        "install" => {
            let content = match (sub.get_one::<String>("hash"), sub.get_one::<String>("source")) {
                (Some(hash), _) => Some(ContentHash::Literal(hash.clone())),
                (None, Some(source)) => Some(ContentHash::Source(PathBuf::from(source))),
                (None, None) => None,
            };
            Ok(CliAction::Install {
                file,
                content,
                revision: sub.get_one::<String>("revision").cloned(),
                at: optional_timestamp(sub)?,
            })
        }
        "rollback" => Ok(CliAction::Rollback {
            file,
            at: optional_timestamp(sub)?,
        }),
        "current" => Ok(CliAction::Current { file }),
        "version" => {
            let text = required(sub, "version")?;
            let version = text.parse::<StackVersion>().map_err(|e| e.to_string())?;
            Ok(CliAction::Version { file, version })
        }
        "file-on" => Ok(CliAction::FileOn {
            file,
            at: parse_timestamp(required(sub, "timestamp")?)?,
        }),
        "history" => Ok(CliAction::History { file }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("Missing argument: {}", name))
}

fn optional_timestamp(matches: &ArgMatches) -> Result<Option<Timestamp>, String> {
    matches
        .get_one::<String>("at")
        .map(|text| parse_timestamp(text))
        .transpose()
}

fn parse_timestamp(text: &str) -> Result<Timestamp, String> {
    Timestamp::parse(text).map_err(|e| e.to_string())
}
