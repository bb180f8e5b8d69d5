use crate::check::{run_check, run_sections, CheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use ncc_compliance::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "NCC Section J compliance",
    about = "Resolve NCC Section J energy-efficiency provisions for building projects",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List the rule sections the configured table declares
    Sections,
    /// Resolve a project file against the configured rule table
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Sections => run_sections(),
        Command::Check(args) => run_check(args),
    }
}
