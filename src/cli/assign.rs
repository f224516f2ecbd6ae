//! Assign command implementation

use crate::cli::output::{format_outcome_json, format_outcome_pretty, OutcomeView};
use crate::cli::setup::{build_engine, load_config_with_overrides, Ticketing};
use crate::cli::AssignArgs;
use crate::engine::{DecisionOutcome, Disposition};
use crate::ticketing::WorkItem;
use chrono::Utc;

/// Build the work item described by the arguments
pub fn work_item_from_args(args: &AssignArgs) -> WorkItem {
    let opened_at = args.opened_at.or(args.at).unwrap_or_else(Utc::now);
    let mut item = WorkItem::new(&args.item, &args.group, args.priority, opened_at);
    if let Some(severity) = args.severity {
        item = item.with_severity(severity);
    }
    item
}

/// Handle `assignd assign`
///
/// Returns the rendered outcome together with the outcome itself, which
/// decides the process exit code.
pub async fn handle_assign(
    args: &AssignArgs,
) -> Result<(String, DecisionOutcome), Box<dyn std::error::Error>> {
    let config = load_config_with_overrides(&args.engine)?;
    crate::logging::init_tracing(&config.logging)?;

    let ticketing = Ticketing::from_config(&config)?;
    let item = work_item_from_args(args);
    if let Some(fixture) = ticketing.fixture() {
        fixture.insert_item(&item);
    }

    let engine = build_engine(&config, &ticketing, args.at)?;
    let outcome = engine.decide(&item).await;

    let view = OutcomeView::new(&item.id, &outcome);
    let rendered = if args.json {
        format_outcome_json(&view)
    } else {
        format_outcome_pretty(&view)
    };
    Ok((rendered, outcome))
}

/// Exit code for an outcome: 0 unless the decision failed
pub fn exit_code(outcome: &DecisionOutcome) -> i32 {
    match outcome.disposition() {
        Disposition::Acknowledge | Disposition::Defer => 0,
        Disposition::Retry => 75,
        Disposition::DeadLetter => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EngineArgs;
    use crate::engine::{EngineError, ExternalCall};
    use chrono::{DateTime, Utc};
    use std::path::PathBuf;

    fn args() -> AssignArgs {
        AssignArgs {
            engine: EngineArgs {
                config: PathBuf::from("assignd.toml"),
                roster: None,
                fixture: None,
                log_level: None,
            },
            item: "INC1".to_string(),
            group: "ops".to_string(),
            priority: 2,
            severity: Some(3),
            opened_at: None,
            at: None,
            json: false,
        }
    }

    #[test]
    fn test_work_item_opened_at_defaults_to_at() {
        let at: DateTime<Utc> = "2026-10-14T10:00:00Z".parse().unwrap();
        let mut args = args();
        args.at = Some(at);

        let item = work_item_from_args(&args);
        assert_eq!(item.opened_at, at);
        assert_eq!(item.severity, Some(3));
        assert_eq!(item.priority, 2);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(&DecisionOutcome::NoCandidate), 0);
        assert_eq!(
            exit_code(&DecisionOutcome::Failed(EngineError::Timeout {
                call: ExternalCall::Commit,
                timeout_ms: 1
            })),
            75
        );
        assert_eq!(
            exit_code(&DecisionOutcome::Failed(EngineError::WorkItemNotFound(
                "INC1".into()
            ))),
            1
        );
    }
}
