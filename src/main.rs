use anyhow::Result;
use cli::Cli;
use config_wizard::Configuration;
use std::process::ExitCode;

mod cli;
mod commands;
mod config_wizard;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    match &cli.command {
        cli::Commands::Config => config_wizard::run(&cli.config),
        cli::Commands::Render(args) => {
            println!("Loading configuration...");
            let config = Configuration::load(&cli.config)?;
            commands::render(&config, args)
        }
        cli::Commands::Qr(args) => commands::qr(&Configuration::load(&cli.config)?, args),
        cli::Commands::Plan(args) => commands::plan(&Configuration::load(&cli.config)?, args),
    }
}
