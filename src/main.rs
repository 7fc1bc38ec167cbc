use clap::Parser;
use ratewise::cli::{check, run, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Run(args) => run::execute(&cli, args)?,
        Commands::Check(args) => check::execute(&args.config)?,
    }

    Ok(())
}
