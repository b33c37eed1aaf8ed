use clap::Parser;
use luto_cli::{Cli, Commands};
use tracing_subscriber::FmtSubscriber;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(cli.log_level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match cli.command {
        Commands::Run { config, yr_cal_target } => {
            luto_cli::commands::run::handle(config.as_deref(), yr_cal_target)
        }
        Commands::Doctor { config } => luto_cli::commands::doctor::handle(config.as_deref()),
    }
}
