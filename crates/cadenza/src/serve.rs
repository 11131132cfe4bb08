// SPDX-FileCopyrightText: 2026 Cadenza Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cadenza serve` command implementation.
//!
//! Builds the controller from config and serves the web UI API until
//! SIGINT or SIGTERM.

use cadenza_config::CadenzaConfig;
use cadenza_core::{CadenzaError, HealthStatus, PluginAdapter};
use cadenza_gateway::{GatewayState, ServerConfig};
use cadenza_sonicpi::SonicPiSink;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `cadenza serve` command.
pub async fn run_serve(config: CadenzaConfig) -> Result<(), CadenzaError> {
    crate::init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting cadenza serve");

    let sink = SonicPiSink::new(&config.sonic_pi);
    match sink.health_check().await? {
        HealthStatus::Healthy => {}
        HealthStatus::Degraded(reason) | HealthStatus::Unhealthy(reason) => {
            warn!(reason = %reason, "sonic pi is not reachable; code execution will fail");
        }
    }

    let controller = crate::build_controller(&config).await?;
    info!(session_id = %controller.session().id, "controller ready");

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    let token = shutdown::install_signal_handler();

    cadenza_gateway::start_server(
        &server_config,
        GatewayState::new(controller),
        token.cancelled_owned(),
    )
    .await?;

    info!("cadenza serve stopped");
    Ok(())
}
