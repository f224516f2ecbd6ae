//! Output formatting helpers for CLI commands

use crate::engine::{DecisionOutcome, Disposition};
use crate::scoring::{DutyStatus, Ranking, WeightSummary};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

/// View model for a decision outcome
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeView {
    pub work_item: String,
    pub outcome: &'static str,
    pub disposition: Disposition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OutcomeView {
    pub fn new(work_item: &str, outcome: &DecisionOutcome) -> Self {
        let mut view = Self {
            work_item: work_item.to_string(),
            outcome: outcome.kind(),
            disposition: outcome.disposition(),
            candidate_id: None,
            candidate_name: None,
            final_weight: None,
            rationale: None,
            holder: None,
            error: None,
        };

        match outcome {
            DecisionOutcome::Assigned {
                candidate_id,
                candidate_name,
                final_weight,
                rationale,
            } => {
                view.candidate_id = Some(candidate_id.clone());
                view.candidate_name = Some(candidate_name.clone());
                view.final_weight = Some(*final_weight);
                view.rationale = Some(rationale.clone());
            }
            DecisionOutcome::AlreadyAssigned { holder } => view.holder = Some(holder.clone()),
            DecisionOutcome::RaceLost { holder, .. } => view.holder = holder.clone(),
            DecisionOutcome::Failed(e) => view.error = Some(e.to_string()),
            DecisionOutcome::NoCandidate => {}
        }
        view
    }
}

fn duty_label(status: DutyStatus) -> String {
    let icon = duty_icon(status);
    match status {
        DutyStatus::OnDuty => format!("{} on duty", icon).green().to_string(),
        DutyStatus::OffDuty => format!("{} off duty", icon).yellow().to_string(),
        DutyStatus::Unknown => format!("{} unknown", icon).red().to_string(),
    }
}

/// Format a ranking as a table, best first
pub fn format_ranking_table(ranking: &Ranking) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "#", "Candidate", "Name", "Final", "Workload", "Role", "Avail", "Duty", "Open",
    ]);

    for (i, c) in ranking.entries().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&c.candidate_id),
            Cell::new(&c.candidate_name),
            Cell::new(format!("{:.4}", c.final_weight)),
            Cell::new(format!("{:.3}", c.workload_score)),
            Cell::new(format!("{:.3}", c.role_score)),
            Cell::new(format!("{:.3}", c.availability_score)),
            Cell::new(duty_label(c.inputs.duty_status)),
            Cell::new(c.inputs.open_items),
        ]);
    }

    format!("{}\n{}", table, ranking.rationale())
}

/// Format a ranking as JSON
pub fn format_ranking_json(group: &str, ranking: Option<&Ranking>) -> String {
    let summary: Vec<WeightSummary> = ranking.map(Ranking::summary).unwrap_or_default();
    let value = json!({
        "group": group,
        "winner": ranking.map(|r| r.winner().candidate_id.clone()),
        "rationale": ranking.map(Ranking::rationale),
        "candidates": summary,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// Format an outcome for humans
pub fn format_outcome_pretty(view: &OutcomeView) -> String {
    let headline = match view.outcome {
        "assigned" => "Assigned".green(),
        "no-candidate" => "No candidate".yellow(),
        "already-assigned" => "Already assigned".cyan(),
        "commit-lost-race" => "Race lost".yellow(),
        _ => "Failed".red(),
    };

    let mut lines = vec![format!("{}: {}", view.work_item, headline)];
    if let (Some(name), Some(id)) = (&view.candidate_name, &view.candidate_id) {
        lines.push(format!("  Candidate: {} ({})", name, id));
    }
    if let Some(rationale) = &view.rationale {
        lines.push(format!("  {}", rationale));
    }
    if let Some(holder) = &view.holder {
        lines.push(format!("  Holder: {}", holder));
    }
    if let Some(error) = &view.error {
        lines.push(format!("  Error: {}", error));
    }
    lines.push(format!("  Disposition: {}", view.disposition));
    lines.join("\n")
}

pub fn format_outcome_json(view: &OutcomeView) -> String {
    serde_json::to_string_pretty(view).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}

/// Get status icon for a duty status
pub fn duty_icon(status: DutyStatus) -> &'static str {
    match status {
        DutyStatus::OnDuty => "✓",
        DutyStatus::OffDuty => "✗",
        DutyStatus::Unknown => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, ExternalCall};
    use crate::roster::RoleTier;
    use crate::scoring::{rank, NoJitter, ScoreInputs, ScoredCandidate};

    fn scored(id: &str, weight: f64) -> ScoredCandidate {
        ScoredCandidate {
            candidate_id: id.to_string(),
            candidate_name: format!("{} Name", id),
            workload_score: 1.0,
            role_score: 1.272,
            availability_score: 1.0,
            final_weight: weight,
            tie_break: 0.0,
            inputs: ScoreInputs {
                open_items: 0,
                weighted_load: 0.0,
                role: RoleTier::Tier2,
                experience_years: 3,
                base_multiplier: 1.2,
                experience_bonus: 0.06,
                duty_status: DutyStatus::OnDuty,
            },
        }
    }

    #[test]
    fn test_format_ranking_table_lists_candidates() {
        let ranking = rank(vec![scored("alice", 1.0816), scored("carol", 0.7)], &NoJitter).unwrap();
        let output = format_ranking_table(&ranking);
        assert!(output.contains("alice"));
        assert!(output.contains("carol"));
        assert!(output.contains("1.0816"));
        assert!(output.contains("Selected alice Name"));
    }

    #[test]
    fn test_format_ranking_json_empty_group() {
        let output = format_ranking_json("ops", None);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert!(parsed["winner"].is_null());
        assert_eq!(parsed["candidates"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_outcome_view_assigned() {
        let outcome = DecisionOutcome::Assigned {
            candidate_id: "alice".into(),
            candidate_name: "Alice".into(),
            final_weight: 1.0816,
            rationale: "Selected Alice".into(),
        };
        let view = OutcomeView::new("INC1", &outcome);
        let parsed: serde_json::Value =
            serde_json::from_str(&format_outcome_json(&view)).unwrap();
        assert_eq!(parsed["outcome"], "assigned");
        assert_eq!(parsed["disposition"], "acknowledge");
        assert_eq!(parsed["candidate_id"], "alice");
        assert!(parsed.get("error").is_none());
    }

    #[test]
    fn test_outcome_view_failed() {
        let outcome = DecisionOutcome::Failed(EngineError::Timeout {
            call: ExternalCall::Roster,
            timeout_ms: 5000,
        });
        let view = OutcomeView::new("INC1", &outcome);
        assert_eq!(view.disposition, Disposition::Retry);
        let pretty = format_outcome_pretty(&view);
        assert!(pretty.contains("roster call timed out"));
        assert!(pretty.contains("retry"));
    }

    #[test]
    fn test_duty_icon() {
        assert_eq!(duty_icon(DutyStatus::OnDuty), "✓");
        assert_eq!(duty_icon(DutyStatus::Unknown), "?");
    }
}
