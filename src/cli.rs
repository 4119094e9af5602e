//! Command-line argument routing.
//!
//! Arguments are parsed once at the boundary into an [`Invocation`]: a typed
//! [`Command`] plus an immutable [`Config`]. Every validation happens here, so
//! a rejected invocation never touches the network.
//!
//! Single-dash long flags (`-host localhost`, `-unique`) are accepted
//! alongside the usual `--host` form.

use crate::config::{
    Config, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_LOG_LEVEL, DEFAULT_MAX_TIME_SECS,
    DEFAULT_PORT, OutputFormat,
};
use crate::error::{DbError, DbResult};
use crate::models::{Command, IndexOrder, IndexSpec};
use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::ffi::OsString;

/// Long flags that consume the following argument as their value.
const VALUE_FLAGS: &[&str] = &[
    "host",
    "port",
    "database",
    "username",
    "password",
    "collection",
    "field",
    "order",
    "name",
    "connect-timeout",
    "max-time",
    "format",
    "log-level",
];

/// Result of routing the process arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    /// Connect and run one command.
    Run { config: Config, command: Command },
    /// Print the version and exit.
    Version,
    /// Print the rendered help text and exit.
    Help(String),
}

/// Command-line interface for mlongo.
#[derive(Debug, Parser)]
#[command(
    name = "mlongo",
    about = "Inspect and manage MongoDB collections and indexes",
    disable_version_flag = true,
    subcommand_required = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub resource: Resource,

    /// Output format (text or json)
    #[arg(
        long,
        value_enum,
        global = true,
        default_value = "text",
        env = "MLONGO_FORMAT"
    )]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = DEFAULT_LOG_LEVEL, env = "MLONGO_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, global = true, env = "MLONGO_JSON_LOGS")]
    pub json_logs: bool,
}

#[derive(Debug, Subcommand)]
pub enum Resource {
    /// Database commands
    Database {
        #[command(subcommand)]
        action: DatabaseAction,
    },
    /// Collection commands
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Index commands
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum DatabaseAction {
    /// List database names
    List(ConnectionArgs),
}

#[derive(Debug, Subcommand)]
pub enum CollectionAction {
    /// List collection names of a database
    List(ConnectionArgs),
}

#[derive(Debug, Subcommand)]
pub enum IndexAction {
    /// List indexes of every collection, or of one collection
    List(ListIndexArgs),
    /// Create a single-field index
    Create(CreateIndexArgs),
    /// Drop an index by name
    Drop(DropIndexArgs),
}

/// Flags shared by every command.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// MongoDB host, e.g. localhost or 127.0.0.1
    #[arg(long, default_value = DEFAULT_HOST, env = "MLONGO_HOST")]
    pub host: String,

    /// MongoDB port
    #[arg(
        long,
        default_value_t = DEFAULT_PORT,
        value_parser = clap::value_parser!(u16).range(1..),
        env = "MLONGO_PORT"
    )]
    pub port: u16,

    /// Database name
    #[arg(long, env = "MLONGO_DATABASE")]
    pub database: Option<String>,

    /// MongoDB server username
    #[arg(long, env = "MLONGO_USERNAME")]
    pub username: Option<String>,

    /// MongoDB server password
    #[arg(long, env = "MLONGO_PASSWORD", allow_hyphen_values = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "MLONGO_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Server-side time limit in seconds for listing and dropping indexes
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_TIME_SECS,
        value_parser = clap::value_parser!(u64).range(1..),
        env = "MLONGO_MAX_TIME"
    )]
    pub max_time: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ListIndexArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Only list the indexes of this collection
    #[arg(long)]
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CreateIndexArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Collection name
    #[arg(long)]
    pub collection: Option<String>,

    /// Field name
    #[arg(long)]
    pub field: Option<String>,

    /// Index order: asc or desc
    #[arg(long)]
    pub order: Option<IndexOrder>,

    /// Create a unique index
    #[arg(
        long,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub unique: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DropIndexArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Collection name
    #[arg(long)]
    pub collection: Option<String>,

    /// Name of the index to drop
    #[arg(long)]
    pub name: Option<String>,
}

impl Cli {
    /// Turn the parsed tree into a typed command and its configuration.
    pub fn into_invocation(self) -> DbResult<Invocation> {
        let (connection, command) = match self.resource {
            Resource::Database {
                action: DatabaseAction::List(connection),
            } => (connection, Command::ListDatabases),
            Resource::Collection {
                action: CollectionAction::List(connection),
            } => {
                let database = required(&connection.database, "database")?;
                (connection, Command::ListCollections { database })
            }
            Resource::Index {
                action: IndexAction::List(args),
            } => {
                let database = required(&args.connection.database, "database")?;
                let collection = args.collection.filter(|c| !c.is_empty());
                (
                    args.connection,
                    Command::ListIndexes {
                        database,
                        collection,
                    },
                )
            }
            Resource::Index {
                action: IndexAction::Create(args),
            } => {
                let database = required(&args.connection.database, "database")?;
                let collection = required(&args.collection, "collection")?;
                let field = required(&args.field, "field")?;
                let order = args
                    .order
                    .ok_or_else(|| DbError::usage("missing required flag -order (asc or desc)"))?;
                (
                    args.connection,
                    Command::CreateIndex {
                        database,
                        collection,
                        spec: IndexSpec::new(field, order, args.unique),
                    },
                )
            }
            Resource::Index {
                action: IndexAction::Drop(args),
            } => {
                let database = required(&args.connection.database, "database")?;
                let collection = required(&args.collection, "collection")?;
                let name = required(&args.name, "name")?;
                (
                    args.connection,
                    Command::DropIndex {
                        database,
                        collection,
                        name,
                    },
                )
            }
        };

        let config = Config {
            host: connection.host,
            port: connection.port,
            database: connection.database.filter(|d| !d.is_empty()),
            username: connection.username.filter(|u| !u.is_empty()),
            password: connection.password,
            connect_timeout: connection.connect_timeout,
            max_time: connection.max_time,
            format: self.format,
            log_level: self.log_level,
            json_logs: self.json_logs,
        };

        Ok(Invocation::Run { config, command })
    }
}

fn required(value: &Option<String>, flag: &str) -> DbResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| DbError::usage(format!("missing required flag -{}", flag)))
}

/// Route raw process arguments (including the program name) to an invocation.
pub fn route<I, T>(args: I) -> DbResult<Invocation>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args = normalize_args(args);

    if requests_version(&args) {
        return Ok(Invocation::Version);
    }

    if args.len() < 2 {
        return Err(DbError::usage("required sub command"));
    }

    match Cli::try_parse_from(&args) {
        Ok(cli) => cli.into_invocation(),
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            Ok(Invocation::Help(err.render().to_string()))
        }
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            Err(DbError::usage("missing sub command"))
        }
        Err(err) => Err(usage_from_clap(&err)),
    }
}

/// Keep only the first line of clap's rendered error, without its prefix.
fn usage_from_clap(err: &clap::Error) -> DbError {
    let rendered = err.render().to_string();
    let line = rendered
        .lines()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("invalid arguments");
    DbError::usage(line.trim_start_matches("error: ").trim())
}

/// Rewrite single-dash long flags (`-host`) to their double-dash form.
///
/// Single-letter flags, negative numbers, values of value-taking flags and
/// everything after `--` are left untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut normalized = Vec::new();
    let mut expects_value = false;
    let mut passthrough = false;

    for (position, arg) in args.into_iter().map(Into::into).enumerate() {
        if position == 0 || passthrough || expects_value {
            expects_value = false;
            normalized.push(arg);
            continue;
        }

        let Some(token) = arg.to_str() else {
            normalized.push(arg);
            continue;
        };

        if token == "--" {
            passthrough = true;
            normalized.push(arg);
            continue;
        }

        let rewritten = match token.strip_prefix('-') {
            Some(rest)
                if rest.len() > 1
                    && rest.starts_with(|c: char| c.is_ascii_alphabetic()) =>
            {
                format!("--{}", rest)
            }
            _ => token.to_string(),
        };

        expects_value = takes_separate_value(&rewritten);
        normalized.push(OsString::from(rewritten));
    }

    normalized
}

/// True for `--flag` tokens whose value is the next argument.
fn takes_separate_value(token: &str) -> bool {
    token
        .strip_prefix("--")
        .is_some_and(|name| !name.contains('=') && VALUE_FLAGS.contains(&name))
}

/// Whether `--version` or `-V` appears as a flag (not as a flag's value).
pub fn requests_version(args: &[OsString]) -> bool {
    let mut expects_value = false;
    for arg in args.iter().skip(1) {
        let Some(token) = arg.to_str() else {
            expects_value = false;
            continue;
        };
        if expects_value {
            expects_value = false;
            continue;
        }
        if token == "--" {
            return false;
        }
        if token == "--version" || token == "-V" {
            return true;
        }
        expects_value = takes_separate_value(token);
    }
    false
}
