//! Rank command implementation (dry run, never commits)

use crate::cli::output::{format_ranking_json, format_ranking_table};
use crate::cli::setup::{build_engine, load_config_with_overrides, Ticketing};
use crate::cli::RankArgs;
use crate::ticketing::{InMemoryTicketing, OpenItem};
use chrono::Utc;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Read a workload file: `{"<candidate-id>": [{"id": "...", "priority": 1}]}`
pub fn load_workload(path: &Path) -> Result<InMemoryTicketing, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read workload file {}: {}", path.display(), e))?;
    let workload: HashMap<String, Vec<OpenItem>> = serde_json::from_str(&content)
        .map_err(|e| format!("invalid workload file {}: {}", path.display(), e))?;

    let ticketing = InMemoryTicketing::new();
    for (candidate, items) in workload {
        for item in items {
            ticketing.add_open_item(&candidate, item);
        }
    }
    Ok(ticketing)
}

/// Handle `assignd rank`
pub async fn handle_rank(args: &RankArgs) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.engine)?;
    crate::logging::init_tracing(&config.logging)?;

    let ticketing = match &args.workload {
        Some(path) => Ticketing::Fixture(Arc::new(load_workload(path)?)),
        None => Ticketing::from_config(&config)?,
    };

    let at = args.at.unwrap_or_else(Utc::now);
    let engine = build_engine(&config, &ticketing, Some(at))?;
    let ranking = engine.rank_group(&args.group, at).await?;

    if args.json {
        return Ok(format_ranking_json(&args.group, ranking.as_ref()));
    }

    Ok(match ranking {
        Some(ranking) => format_ranking_table(&ranking),
        None => format!("No eligible candidates in group '{}'", args.group),
    })
}
