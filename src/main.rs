use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use webdesk::app::App;
use webdesk::config::Config;
use webdesk::render::Templates;
use webdesk::repository::MemoryRepository;
use webdesk::server::Server;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let templates = Arc::new(Templates::new()?);
    let repository = Arc::new(MemoryRepository::demo());
    let app = App::new(&cfg, templates, repository);

    let server = Server::bind(&cfg.server, Arc::new(app))?;
    let handle = server.spawn()?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(tokio::signal::ctrl_c())?;
    tracing::info!("Shutdown signal received");

    handle.shutdown();
    Ok(())
}
