use anyhow::Result;
use getaround::{
    config,
    dashboard::{start_dashboard_server, DashboardState},
    logger::{set_level, setup_logger},
    shutdown::listen_for_shutdown,
};
use log::error;

#[tokio::main]
async fn main() -> Result<()> {
    setup_logger()?;

    let config = config::read_config();
    set_level(&config.log_level);

    let state = DashboardState::load(&config)?;

    if let Err(err) =
        start_dashboard_server(state, &config.dashboard_bind_address, listen_for_shutdown()).await
    {
        error!("Error: {:?}", err);
        return Err(err);
    }

    Ok(())
}
