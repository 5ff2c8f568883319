// Copyright (c) 2026 Dexter Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Server mode
//!
//! Handles:
//! - Serving the HTTP API from the embedded services
//! - HTTP health checks against a running server
//! - Graceful shutdown

use anyhow::Result;
use std::time::Duration;

pub mod client;
pub mod server;

pub use client::DexterClient;
pub use server::start_server;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerStatus {
    Running,
    Unhealthy { error: String },
    Stopped,
}

/// Base URL for a host that may or may not carry a scheme
pub fn base_url(host: &str, port: u16) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{}:{}", host.trim_end_matches('/'), port)
    } else {
        format!("http://{}:{}", host, port)
    }
}

/// Check whether a server answers on `host:port`
pub async fn check_server_running(host: &str, port: u16) -> Result<ServerStatus> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(500))
        .build()?;

    let health_url = format!("{}/", base_url(host, port));

    match client.get(&health_url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(ServerStatus::Running),
        Ok(resp) => Ok(ServerStatus::Unhealthy {
            error: format!("HTTP {}", resp.status()),
        }),
        Err(_) => Ok(ServerStatus::Stopped),
    }
}
