use std::sync::Arc;

use anyhow::Result;
use getaround::{
    config::{self, Config},
    logger::{set_level, setup_logger},
    pricing::shared_model,
    shutdown::listen_for_shutdown,
    web::{start_http_server, AppState},
};
use log::error;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    setup_logger()?;

    let config: Arc<Config> = Arc::new(config::read_config());
    set_level(&config.log_level);

    let model = shared_model(&config.model_path)?;
    let state = AppState::new(config.clone(), model);

    if let Err(err) = start_http_server(state, listen_for_shutdown()).await {
        error!("Error: {:?}", err);
        return Err(err);
    }

    Ok(())
}
