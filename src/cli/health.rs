//! Health command implementation

use crate::cli::setup::{load_config_with_overrides, Ticketing};
use crate::cli::HealthArgs;
use crate::config::{EngineConfig, TicketingKind};
use crate::roster::StaticRoster;
use colored::Colorize;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub healthy: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub roster: ComponentHealth,
    pub ticketing: ComponentHealth,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.roster.healthy && self.ticketing.healthy
    }
}

fn check_roster(config: &EngineConfig) -> ComponentHealth {
    match StaticRoster::load(&config.roster.path) {
        Ok(roster) => ComponentHealth {
            healthy: true,
            detail: format!(
                "{} group(s) in {}",
                roster.group_count(),
                config.roster.path.display()
            ),
        },
        Err(e) => ComponentHealth {
            healthy: false,
            detail: e.to_string(),
        },
    }
}

async fn check_ticketing(config: &EngineConfig) -> ComponentHealth {
    let backend = match config.ticketing.kind {
        TicketingKind::Fixture => "fixture",
        TicketingKind::ServiceNow => "servicenow",
    };
    let ticketing = match Ticketing::from_config(config) {
        Ok(ticketing) => ticketing,
        Err(e) => {
            return ComponentHealth {
                healthy: false,
                detail: format!("{}: {}", backend, e),
            }
        }
    };

    let probe = tokio::time::timeout(
        config.timeouts.ticketing(),
        ticketing.as_system().health_check(),
    )
    .await;
    match probe {
        Ok(Ok(())) => ComponentHealth {
            healthy: true,
            detail: format!("{} reachable", backend),
        },
        Ok(Err(e)) => ComponentHealth {
            healthy: false,
            detail: format!("{}: {}", backend, e),
        },
        Err(_) => ComponentHealth {
            healthy: false,
            detail: format!(
                "{}: no response within {}ms",
                backend, config.timeouts.ticketing_ms
            ),
        },
    }
}

pub async fn collect_health(config: &EngineConfig) -> HealthStatus {
    let roster = check_roster(config);
    let ticketing = check_ticketing(config).await;
    let healthy = roster.healthy && ticketing.healthy;

    HealthStatus {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        roster,
        ticketing,
    }
}

fn component_line(output: &mut String, name: &str, component: &ComponentHealth) {
    let icon = if component.healthy {
        "✓".green()
    } else {
        "✗".red()
    };
    let _ = writeln!(output, "  {} {:<10} {}", icon, name, component.detail);
}

/// Format health status as pretty text
pub fn format_health_pretty(status: &HealthStatus) -> String {
    let mut output = String::new();

    let status_display = if status.is_healthy() {
        "Healthy".green()
    } else {
        "Degraded".yellow()
    };

    let _ = writeln!(output, "Status: {}", status_display);
    let _ = writeln!(output, "Version: {}", status.version);
    let _ = writeln!(output);
    component_line(&mut output, "Roster", &status.roster);
    component_line(&mut output, "Ticketing", &status.ticketing);

    output
}

pub fn format_health_json(status: &HealthStatus) -> String {
    serde_json::to_string_pretty(status).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// Handle `assignd health`
///
/// A degraded status is reported as an error after printing, so the exit
/// code reflects it.
pub async fn handle_health(args: &HealthArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.engine)?;
    let status = collect_health(&config).await;

    let rendered = if args.json {
        format_health_json(&status)
    } else {
        format_health_pretty(&status)
    };

    if status.is_healthy() {
        Ok(rendered)
    } else {
        println!("{}", rendered);
        Err("one or more backends are unhealthy".into())
    }
}
