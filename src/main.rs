use std::{env, sync::Arc};

use chrono::Duration;
use colored::Colorize;
use log::{error, info};
use shellac_library::{DatabaseError, Library, PgDatabase, TokenCodec};
use shellac_server::{run_server, ServerContext};
use thiserror::Error;
use tokio::runtime::{self, Runtime};

mod logging;

/// How long issued tokens stay valid, unless configured otherwise
const DEFAULT_TOKEN_VALIDITY_IN_DAYS: i64 = 7;

struct Shellac {
    context: ServerContext,
    runtime: Runtime,
}

#[derive(Debug, Error)]
enum ShellacError {
    #[error("Missing required configuration: {0}")]
    Config(&'static str),
    #[error("Could not initialize database: {0}")]
    Database(#[from] DatabaseError),
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Shellac {
    fn new() -> Result<Self, ShellacError> {
        info!("Building async runtime...");
        let runtime = runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("shellac-async")
            .build()
            .map_err(|e| ShellacError::Fatal(e.to_string()))?;

        let database_url = required_var("SHELLAC_DATABASE_URL")?;
        let secret = required_var("SHELLAC_TOKEN_SECRET")?;

        let validity_in_days = env::var("SHELLAC_TOKEN_VALIDITY_DAYS")
            .map(|x| x.parse::<i64>().expect("Token validity must be a number"))
            .unwrap_or(DEFAULT_TOKEN_VALIDITY_IN_DAYS);

        info!("Connecting to database...");
        let database = runtime.block_on(PgDatabase::new(&database_url))?;

        let tokens = TokenCodec::new(&secret, Duration::days(validity_in_days));
        let library = Arc::new(Library::new(database, tokens));

        Ok(Self {
            context: ServerContext { library },
            runtime,
        })
    }

    fn run(&self) {
        self.runtime.block_on(run_server(self.context.clone()))
    }
}

impl ShellacError {
    fn hint(&self) -> String {
        match self {
            ShellacError::Config(_) => {
                "Set this environment variable before starting shellac.".to_string()
            }
            ShellacError::Database(_) => {
                "This is a database error. Make sure the Postgres instance is properly installed and running, then try again.".to_string()
            }
            ShellacError::Fatal(_) => "This error is fatal, and should not happen.".to_string(),
        }
    }
}

/// Reads an environment variable that must be present and non-empty
fn required_var(name: &'static str) -> Result<String, ShellacError> {
    env::var(name)
        .ok()
        .filter(|x| !x.trim().is_empty())
        .ok_or(ShellacError::Config(name))
}

fn main() {
    logging::init_logger();

    match Shellac::new() {
        Ok(shellac) => {
            info!("Initialized successfully.");
            shellac.run();
        }
        Err(error) => {
            error!(
                "{} Read the error below to troubleshoot the issue. If you think this might be a bug, please report it by making a GitHub issue.",
                "Shellac failed to start!".bold().red()
            );
            error!("{}", error);
            error!("{}", format!("Hint: {}", error.hint()).dimmed().italic());
        }
    }
}
