//! `qc`: compare dacpac(s) and/or database(s) and create a drop script

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use quick_compare::config::{self, Config, ConnectionModel, LoggingConfig};
use quick_compare::utils::logging::init_logging;
use quick_compare::{Category, OutputTarget};

const DEFAULT_OUTPUT: &str = "output.sql";

/// Compare dacpac(s) and/or database(s) and create sql script.
#[derive(Parser, Debug)]
#[command(name = "qc", version, about)]
struct Cli {
    /// TOML or YAML configuration file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// A SQL Server object type to include (Table, View, Procedure); repeatable
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    types: Vec<Category>,

    /// Output file, `-` for stdout
    #[arg(short, long = "output-file", value_name = "FILE")]
    output: Option<PathBuf>,

    /// Target dacpac file; if given, the target is a dacpac
    #[arg(long, visible_alias = "tf", value_name = "FILE")]
    target_dacpac: Option<PathBuf>,

    /// Target connection string; used exclusively of the server and database name
    #[arg(long, visible_alias = "tcs")]
    target_connection_string: Option<String>,

    /// Target database name
    #[arg(long, visible_alias = "tdn")]
    target_database_name: Option<String>,

    /// Target database server
    #[arg(long, visible_alias = "tds")]
    target_database_server: Option<String>,

    /// Source dacpac file; if given, the source is a dacpac
    #[arg(long, visible_alias = "sf", value_name = "FILE")]
    source_dacpac: Option<PathBuf>,

    /// Source connection string; used exclusively of the server and database name
    #[arg(long, visible_alias = "scs")]
    source_connection_string: Option<String>,

    /// Source database name
    #[arg(long, visible_alias = "sdn")]
    source_database_name: Option<String>,

    /// Source database server
    #[arg(long, visible_alias = "sds")]
    source_database_server: Option<String>,

    /// Seconds to wait for a database connection
    #[arg(long, value_name = "SECONDS")]
    connect_timeout: Option<u64>,

    /// Read source and target at the same time
    #[arg(long)]
    concurrent_refresh: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Merge the flags over the configuration file, if any
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => config::load_from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        };

        if !self.types.is_empty() {
            config.types = self.types;
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if config.output.is_none() {
            config.output = Some(PathBuf::from(DEFAULT_OUTPUT));
        }
        if self.concurrent_refresh {
            config.concurrent_refresh = true;
        }

        override_side(
            &mut config.source,
            self.source_dacpac,
            self.source_connection_string,
            self.source_database_server,
            self.source_database_name,
            self.connect_timeout,
        );
        override_side(
            &mut config.target,
            self.target_dacpac,
            self.target_connection_string,
            self.target_database_server,
            self.target_database_name,
            self.connect_timeout,
        );

        if let Some(level) = self.log_level {
            config.logging.get_or_insert_with(LoggingConfig::default).level = level;
        }

        Ok(config)
    }
}

/// Replace `side` when any of its flags is given, so a flag never loses to a file value
fn override_side(
    side: &mut ConnectionModel,
    dacpac: Option<PathBuf>,
    connection_string: Option<String>,
    server: Option<String>,
    database: Option<String>,
    connect_timeout: Option<u64>,
) {
    if dacpac.is_some() || connection_string.is_some() || server.is_some() || database.is_some() {
        *side = ConnectionModel {
            dacpac,
            connection_string,
            server,
            database,
            connect_timeout_seconds: side.connect_timeout_seconds,
        };
    }
    if connect_timeout.is_some() {
        side.connect_timeout_seconds = connect_timeout;
    }
}

/// Single-dash spellings accepted by earlier releases (`-tf App.dacpac`)
const LEGACY_OPTIONS: [&str; 8] = ["tf", "tcs", "tdn", "tds", "sf", "scs", "sdn", "sds"];

/// Rewrite `-tf`, `-tf=x` and `-tf:x` style arguments to their `--tf` aliases
fn rewrite_legacy_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut options_done = false;

    args.into_iter()
        .map(|arg| {
            if options_done {
                return arg;
            }
            if arg == "--" {
                options_done = true;
                return arg;
            }

            let Some(rest) = arg.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return arg;
            };
            let (name, value) = match rest.find(['=', ':']) {
                Some(at) => (&rest[..at], Some(&rest[at + 1..])),
                None => (rest, None),
            };

            match (LEGACY_OPTIONS.contains(&name), value) {
                (true, Some(value)) => format!("--{}={}", name, value),
                (true, None) => format!("--{}", name),
                (false, _) => arg,
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse_from(rewrite_legacy_args(std::env::args())).into_config()?;

    init_logging(&config.logging.clone().unwrap_or_default())
        .context("initializing logging")?;

    let diff = quick_compare::run_with_config(&config)
        .await
        .context("comparison failed")?;

    let summary = diff
        .categories
        .iter()
        .map(|c| format!("{}: {} to drop", c.category, c.objects_to_drop.len()))
        .collect::<Vec<_>>()
        .join(", ");

    // Keep stdout clean when the script itself goes there
    if config.output_target()? == OutputTarget::Stdout {
        eprintln!("{}", summary);
        eprintln!("Complete.");
    } else {
        println!("{}", summary);
        println!("Complete.");
    }

    Ok(())
}
