mod error;
mod output;
mod scenario;
mod services;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::CliError;
use crate::output::OutputFormat;
use crate::scenario::{SignupRequest, SignupResult};
use crate::services::{Collaborator, Services};

const LOG_ENV: &str = "COMPENSATE_LOG";

#[derive(Parser)]
#[command(name = "compensate-demo")]
#[command(about = "Sign up a customer across three services, rolling back on failure", long_about = None)]
#[command(version)]
struct Cli {
    /// Customer to sign up
    #[arg(long, default_value = "customer")]
    customer: String,

    /// Service whose forward operation fails ("none" lets the signup complete)
    #[arg(long, value_enum, value_name = "SERVICE", default_value = "payments")]
    fail_at: FailAt,

    /// Service whose undo operation fails (repeatable)
    #[arg(long = "break-compensation", value_enum, value_name = "SERVICE")]
    broken_compensations: Vec<Collaborator>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,

    /// Log every step and compensation to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FailAt {
    #[value(name = "none")]
    Nowhere,
    Database,
    Files,
    Payments,
}

impl FailAt {
    fn collaborator(self) -> Option<Collaborator> {
        match self {
            Self::Nowhere => None,
            Self::Database => Some(Collaborator::Database),
            Self::Files => Some(Collaborator::Files),
            Self::Payments => Some(Collaborator::Payments),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let services = Services::new(cli.fail_at.collaborator(), &cli.broken_compensations);
    let outcome = scenario::run_signup(
        &services,
        &SignupRequest {
            customer: cli.customer,
        },
    );

    match cli.format.formatter().format(&outcome) {
        Ok(text) => print!("{text}"),
        Err(e) => {
            print_error(&e);
            return ExitCode::from(e.exit_code());
        }
    }

    match into_result(outcome.customer, outcome.result) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn into_result(customer: String, result: SignupResult) -> Result<(), CliError> {
    match result {
        SignupResult::Completed => Ok(()),
        SignupResult::RolledBack {
            reason,
            rollback_error: None,
            ..
        } => Err(CliError::SignupFailed {
            customer,
            source: reason,
        }),
        SignupResult::RolledBack {
            reason,
            rollback_error: Some(source),
            ..
        } => Err(CliError::RollbackFailed {
            customer,
            reason,
            source,
        }),
    }
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("caused by: {cause}");
        source = std::error::Error::source(cause);
    }
}
