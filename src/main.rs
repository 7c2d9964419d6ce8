use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::Notify;

use devgate::config::{Config, GatewayState};
use devgate::{logger, server};

/// Local development gateway: static files first, everything else proxied
#[derive(Parser, Debug)]
#[command(name = "devgate", version, about)]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "devgate")]
    config: String,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Static root directory
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Upstream origin, e.g. http://localhost:3001
    #[arg(short, long)]
    upstream: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(self, cfg: &mut Config) {
        if let Some(port) = self.port {
            cfg.server.port = port;
        }
        if let Some(root) = self.root {
            cfg.static_files.root = root;
        }
        if let Some(upstream) = self.upstream {
            cfg.proxy.upstream = upstream;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let print_config = cli.print_config;

    let mut cfg = Config::load_from(&cli.config)?;
    cli.apply(&mut cfg);
    cfg.validate()?;

    if print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(());
    }

    logger::init(&cfg.logging);

    // Create Tokio runtime, thread count from `server.workers`
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let local_addr = listener.local_addr()?;

    logger::log_server_start(&local_addr, &cfg);
    let state = Arc::new(GatewayState::new(cfg)?);

    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown));
    server::serve(listener, state, shutdown).await;

    Ok(())
}
