use crate::demo::{run_deadline, run_demo, DeadlineArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use deposit_disposition::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Deposit Disposition Service",
    about = "Run and demonstrate the security-deposit disposition engine from the command line",
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
    /// Print the statutory return deadline for a move-out date
    Deadline(DeadlineArgs),
    /// Walk one lease through move-out, damage itemization and refund in memory
    Demo(DemoArgs),
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
        Command::Deadline(args) => run_deadline(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
