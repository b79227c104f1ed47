use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::models::Stage;
use super::status::PipelineStatus;

/// Errors raised when a stage set cannot describe a real pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Invalid stage data: {0}")]
    InvalidInput(String),
}

/// Derived view of one client's pipeline. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSummary {
    pub status: PipelineStatus,
    pub status_label: &'static str,
    pub status_style: &'static str,
    pub progress: f64,
    pub completed_stages: usize,
    pub total_stages: usize,
    pub current_stage: Option<Stage>,
}

impl PipelineSummary {
    /// Whether `stage` is the one the pipeline is currently waiting on.
    pub fn is_current(&self, stage: &Stage) -> bool {
        self.current_stage
            .as_ref()
            .map(|current| current.order == stage.order)
            .unwrap_or(false)
    }

    /// Progress as a whole percentage, for display.
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}

/// Derive status, progress counters and the current stage for one client.
///
/// Stages may arrive in any order. An empty set is valid and yields `new`
/// with zero progress. Duplicate or non-positive `order` values are rejected.
pub fn derive_status(stages: &[Stage]) -> Result<PipelineSummary, PipelineError> {
    validate(stages)?;

    let total_stages = stages.len();
    let completed_stages = stages.iter().filter(|s| s.completed).count();
    let progress = if total_stages > 0 {
        completed_stages as f64 / total_stages as f64
    } else {
        0.0
    };

    let status = PipelineStatus::from_progress(progress);
    let current_stage = stages
        .iter()
        .filter(|s| !s.completed)
        .min_by_key(|s| s.order)
        .cloned();

    Ok(PipelineSummary {
        status,
        status_label: status.label(),
        status_style: status.style(),
        progress,
        completed_stages,
        total_stages,
        current_stage,
    })
}

fn validate(stages: &[Stage]) -> Result<(), PipelineError> {
    let mut seen = HashSet::with_capacity(stages.len());
    for stage in stages {
        if stage.order < 1 {
            return Err(PipelineError::InvalidInput(format!(
                "stage '{}' has order {}; orders start at 1",
                stage.name, stage.order
            )));
        }
        if !seen.insert(stage.order) {
            return Err(PipelineError::InvalidInput(format!(
                "duplicate stage order {} for client {}",
                stage.order, stage.client_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::default_stages;

    fn with_completed(orders: &[i64]) -> Vec<Stage> {
        let mut stages = default_stages(1);
        for stage in stages.iter_mut() {
            if orders.contains(&stage.order) {
                stage.set_completed(true, 1000);
            }
        }
        stages
    }

    #[test]
    fn test_empty_stage_set_is_new() {
        let summary = derive_status(&[]).unwrap();
        assert_eq!(summary.status, PipelineStatus::New);
        assert_eq!(summary.progress, 0.0);
        assert_eq!(summary.total_stages, 0);
        assert!(summary.current_stage.is_none());
    }

    #[test]
    fn test_all_completed_wins_over_in_progress() {
        let summary = derive_status(&with_completed(&[1, 2, 3, 4, 5, 6, 7, 8, 9])).unwrap();
        assert_eq!(summary.status, PipelineStatus::Completed);
        assert_eq!(summary.progress, 1.0);
        assert!(summary.current_stage.is_none());
        assert_eq!(summary.percent(), 100);
    }

    #[test]
    fn test_unsorted_input_picks_lowest_open_order() {
        let mut stages = with_completed(&[1, 2]);
        stages.reverse();
        let summary = derive_status(&stages).unwrap();
        assert_eq!(summary.current_stage.as_ref().map(|s| s.order), Some(3));
        assert!(summary.is_current(&stages[6]));
        assert!(!summary.is_current(&stages[0]));
    }

    #[test]
    fn test_label_and_style_follow_status() {
        let summary = derive_status(&with_completed(&[1])).unwrap();
        assert_eq!(summary.status, PipelineStatus::CallScheduled);
        assert_eq!(summary.status_label, "Созвон");
        assert_eq!(summary.status_style, "bg-status-call-scheduled text-white");
    }

    #[test]
    fn test_duplicate_order_rejected() {
        let mut stages = default_stages(1);
        stages[1].order = 1;
        let err = derive_status(&stages).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(err.to_string().contains("duplicate stage order 1"));
    }

    #[test]
    fn test_non_positive_order_rejected() {
        let mut stages = default_stages(1);
        stages[0].order = 0;
        assert!(derive_status(&stages).is_err());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let stages = with_completed(&[2, 5]);
        let before = stages.clone();
        let _ = derive_status(&stages).unwrap();
        assert_eq!(stages, before);
    }
}
