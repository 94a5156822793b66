use clap::Parser;
use wardline_cli::{commands, config::AppConfig, logging, Cli};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    logging::init_logging(&config.logging)?;

    let output = commands::run(&cli, &config)?;
    print!("{output}");
    Ok(())
}
