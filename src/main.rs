use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod relay;
mod server;

/// Config path used when none is given on the command line; the `config`
/// crate tries the known extensions (`config.toml`, ...) and skips it if absent
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::Config::load_from(&config_path)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;

    let fetcher = relay::ReqwestFetcher::new()?;
    let state = Arc::new(config::AppState::new(cfg, Arc::new(fetcher)));

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&addr, &state.config);

    server::serve(listener, state, Arc::clone(&signals.shutdown)).await?;

    logger::log_shutdown();
    Ok(())
}
