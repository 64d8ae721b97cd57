use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Result, WrapErr};
use quarry::{Config, Dashboard};
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[clap(name = "quarry", about, version)]
struct Args {
    /// Increase output logging verbosity.
    #[clap(short, long)]
    verbose: bool,

    /// Debug mode: verbose logging and templates reloaded on every request.
    #[clap(long)]
    debug: bool,

    /// Configuration file (JSON or YAML). Defaults are used if it does not
    /// exist.
    #[clap(short, long, default_value = "quarry.yaml")]
    config: PathBuf,

    /// SQLite database to query.
    #[clap(short, long)]
    database: Option<PathBuf>,

    /// Address to bind to.
    #[clap(long)]
    host: Option<String>,

    /// Port to listen on.
    #[clap(short, long)]
    port: Option<u16>,

    /// Directory of template overrides.
    #[clap(short, long)]
    templates: Option<PathBuf>,
}

impl Args {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(templates) = &self.templates {
            config.templates_dir = Some(templates.clone());
        }
        config.debug |= self.debug;
        config
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    // The logger's level depends on the configuration file, so that is read
    // first.
    let config = load_config(&args);
    simple_logger::init_with_level(log_level(args.verbose, config.as_ref().ok())).unwrap();

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(_) => log::info!("Shut down"),
        Err(e) => log::error!("Failed: {:?}", e),
    }
}

fn load_config(args: &Args) -> Result<Config> {
    Ok(args.apply(Config::load_or_default(&args.config)?))
}

fn log_level(verbose: bool, config: Option<&Config>) -> log::Level {
    if verbose || config.map_or(false, |c| c.debug) {
        log::Level::Debug
    } else {
        log::Level::Info
    }
}

async fn run(config: Config) -> Result<()> {
    log::info!("Reporting on database {}", config.database.display());
    let dashboard = Arc::new(Dashboard::new(&config)?);
    let address = config.address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("failed to bind to {}", address))?;
    quarry::http::serve(listener, dashboard).await
}
