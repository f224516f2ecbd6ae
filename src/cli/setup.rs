//! Config loading and backend wiring shared by the engine commands

use crate::audit::{AuditStore, DecisionRecorder, JsonlAuditStore, MemoryAuditStore};
use crate::cli::EngineArgs;
use crate::config::{AuditKind, EngineConfig, TicketingKind};
use crate::engine::{AssignmentEngine, Clock, FixedClock, SystemClock};
use crate::roster::StaticRoster;
use crate::ticketing::{InMemoryTicketing, ServiceNowTicketing, TicketingSystem};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Load configuration with CLI overrides
///
/// A missing config file falls back to defaults; an invalid one is an error.
pub fn load_config_with_overrides(
    args: &EngineArgs,
) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = if args.config.exists() {
        EngineConfig::load(Some(&args.config))?
    } else {
        tracing::debug!("Config file not found, using defaults");
        EngineConfig::default()
    };

    config = config.with_env_overrides();

    if let Some(ref roster) = args.roster {
        config.roster.path = roster.clone();
    }
    if let Some(ref fixture) = args.fixture {
        config.ticketing.fixture_path = Some(fixture.clone());
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Ticketing client described by the configuration.
///
/// The fixture backend is kept concrete so callers can seed it.
pub enum Ticketing {
    Fixture(Arc<InMemoryTicketing>),
    Remote(Arc<dyn TicketingSystem>),
}

impl Ticketing {
    pub fn from_config(config: &EngineConfig) -> Result<Self, Box<dyn std::error::Error>> {
        match config.ticketing.kind {
            TicketingKind::Fixture => {
                let backend = match &config.ticketing.fixture_path {
                    Some(path) => InMemoryTicketing::from_fixture_file(path)?,
                    None => InMemoryTicketing::new(),
                };
                Ok(Ticketing::Fixture(Arc::new(backend)))
            }
            TicketingKind::ServiceNow => {
                let client = ServiceNowTicketing::from_config(
                    &config.ticketing.servicenow,
                    config.timeouts.ticketing(),
                )?;
                Ok(Ticketing::Remote(Arc::new(client)))
            }
        }
    }

    pub fn as_system(&self) -> Arc<dyn TicketingSystem> {
        match self {
            Ticketing::Fixture(backend) => backend.clone(),
            Ticketing::Remote(backend) => backend.clone(),
        }
    }

    pub fn fixture(&self) -> Option<&InMemoryTicketing> {
        match self {
            Ticketing::Fixture(backend) => Some(backend),
            Ticketing::Remote(_) => None,
        }
    }
}

pub fn audit_store(config: &EngineConfig) -> Arc<dyn AuditStore> {
    match (config.audit.kind, &config.audit.path) {
        (AuditKind::Jsonl, Some(path)) => Arc::new(JsonlAuditStore::new(path)),
        _ => Arc::new(MemoryAuditStore::new()),
    }
}

/// Build an engine from configuration.
///
/// `at` pins the engine clock for reproducible runs.
pub fn build_engine(
    config: &EngineConfig,
    ticketing: &Ticketing,
    at: Option<DateTime<Utc>>,
) -> Result<AssignmentEngine, Box<dyn std::error::Error>> {
    let roster = StaticRoster::load(&config.roster.path)?;
    tracing::debug!(
        path = %config.roster.path.display(),
        groups = roster.group_count(),
        "Roster loaded"
    );

    let recorder = DecisionRecorder::new(audit_store(config), config.timeouts.audit());
    let clock: Arc<dyn Clock> = match at {
        Some(instant) => Arc::new(FixedClock(instant)),
        None => Arc::new(SystemClock),
    };

    Ok(AssignmentEngine::new(
        Arc::new(roster),
        ticketing.as_system(),
        recorder,
        Arc::new(config.scoring_policy()),
    )
    .with_timeouts(config.timeouts)
    .with_clock(clock))
}
