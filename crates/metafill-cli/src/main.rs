//! Metafill CLI - extract file metadata with Box AI and write it back.

use clap::Parser;
use metafill_cli::commands;
use metafill_cli::{AuthOverrides, Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("metafill=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> metafill_cli::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(profile_name) = cli.profile {
        config.switch_profile(profile_name)?;
    }

    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    let overrides = AuthOverrides {
        developer_token: cli.developer_token,
        client_secret: cli.client_secret,
    };

    match cli.command {
        Command::Login(args) => commands::execute_login(args, &mut config, &overrides, &formatter).await,
        Command::Whoami => commands::execute_whoami(&config, &overrides, &formatter).await,
        Command::Files(args) => commands::execute_files(args, &config, &overrides, &formatter).await,
        Command::Template(args) => commands::execute_template(args, &config, &overrides, &formatter).await,
        Command::Extract(args) => commands::execute_extract(args, &config, &overrides, &formatter).await,
        Command::Apply(args) => commands::execute_apply(args, &config, &overrides, &formatter).await,
        Command::Profile(args) => commands::execute_profile(args, &mut config, &formatter).await,
    }
}
