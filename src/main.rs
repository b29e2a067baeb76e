mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};

use gifforge_core::config::Config;

async fn start_server(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    tracing::info!("Starting gifforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    gifforge_server::start(config).await?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "gifforge=trace,gifforge_av=trace,gifforge_server=trace,tower_http=debug".to_string()
        } else {
            "gifforge=debug,gifforge_av=debug,gifforge_server=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("gifforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let registry = gifforge_av::ToolRegistry::discover(&config.tools);

    let mut all_found = true;
    for info in registry.check_all() {
        if info.available {
            println!(
                "{}: {} ({})",
                info.name,
                info.path
                    .as_deref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                info.version.as_deref().unwrap_or("unknown version")
            );
        } else {
            println!("{}: NOT FOUND", info.name);
            all_found = false;
        }
    }

    if !all_found {
        anyhow::bail!("Some required tools are missing");
    }
    Ok(())
}

fn validate_config(config_path: Option<&std::path::Path>) -> Result<()> {
    let Some(path) = config_path else {
        println!("No config file specified; defaults are always valid.");
        return Ok(());
    };

    let contents = std::fs::read_to_string(path)?;
    let config = Config::from_json(&contents)?;

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Config OK: {}", path.display());
    } else {
        println!("Config parsed with {} warning(s):", warnings.len());
        for w in &warnings {
            println!("  - {w}");
        }
    }
    Ok(())
}
