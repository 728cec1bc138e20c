use anyhow::Result;
use clap::Parser;
use country_clicks::config::Config;
use country_clicks::server;
use tracing_subscriber::EnvFilter;

/// Serves per-country average clicks over a link metrics API.
#[derive(Parser)]
#[command(name = "country-clicks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on (overrides LISTEN)
    #[arg(long)]
    listen: Option<String>,

    /// Number of concurrent metric fetches per request (overrides WORKERS)
    #[arg(long)]
    workers: Option<usize>,

    /// Request deadline in seconds (overrides REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    timeout: Option<u64>,
}

impl Cli {
    fn apply(self, mut config: Config) -> Result<Config> {
        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env()?)?;

    init_tracing(&config);
    config.print_summary();

    server::run(config).await
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));

    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
