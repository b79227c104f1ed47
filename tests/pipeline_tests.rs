use parkcrm::models::{default_stages, Stage};
use parkcrm::pipeline::{derive_status, PipelineError, PipelineStatus};

fn nine_with_completed(orders: &[i64]) -> Vec<Stage> {
    let mut stages = default_stages(1);
    for stage in stages.iter_mut() {
        if orders.contains(&stage.order) {
            stage.set_completed(true, 1_700_000_000);
        }
    }
    stages
}

#[test]
fn test_nothing_completed_is_new() {
    let summary = derive_status(&nine_with_completed(&[])).unwrap();
    assert_eq!(summary.status, PipelineStatus::New);
    assert_eq!(summary.progress, 0.0);
    assert_eq!(summary.total_stages, 9);
    assert_eq!(summary.current_stage.map(|s| s.order), Some(1));
}

#[test]
fn test_three_of_nine_is_proposal_sent() {
    let summary = derive_status(&nine_with_completed(&[1, 2, 3])).unwrap();
    assert!((summary.progress - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.status, PipelineStatus::ProposalSent);
    assert_eq!(summary.status_label, "КП отправлено");
    assert_eq!(summary.completed_stages, 3);
    assert_eq!(summary.current_stage.map(|s| s.order), Some(4));
}

#[test]
fn test_seven_of_nine_is_in_progress() {
    let summary = derive_status(&nine_with_completed(&[1, 2, 3, 4, 5, 6, 7])).unwrap();
    assert!((summary.progress - 7.0 / 9.0).abs() < 1e-9);
    assert_eq!(summary.status, PipelineStatus::InProgress);
    assert_eq!(summary.current_stage.map(|s| s.order), Some(8));
}

#[test]
fn test_all_completed() {
    let summary = derive_status(&nine_with_completed(&[1, 2, 3, 4, 5, 6, 7, 8, 9])).unwrap();
    assert_eq!(summary.status, PipelineStatus::Completed);
    assert_eq!(summary.progress, 1.0);
    assert_eq!(summary.percent(), 100);
    assert!(summary.current_stage.is_none());
}

#[test]
fn test_no_stages() {
    let summary = derive_status(&[]).unwrap();
    assert_eq!(summary.status, PipelineStatus::New);
    assert_eq!(summary.progress, 0.0);
    assert_eq!(summary.total_stages, 0);
    assert!(summary.current_stage.is_none());
}

#[test]
fn test_one_of_nine_is_call_scheduled() {
    let summary = derive_status(&nine_with_completed(&[1])).unwrap();
    assert_eq!(summary.status, PipelineStatus::CallScheduled);
    assert_eq!(summary.status_style, "bg-status-call-scheduled text-white");
}

#[test]
fn test_exact_boundaries_fall_to_lower_bucket() {
    // 3 of 10 is exactly 0.3, 7 of 10 exactly 0.7: thresholds are strict
    let ten = |done: i64| -> Vec<Stage> {
        (1..=10)
            .map(|order| {
                let mut stage = Stage::new(1, format!("Stage {}", order), order);
                if order <= done {
                    stage.set_completed(true, 1);
                }
                stage
            })
            .collect()
    };
    assert_eq!(derive_status(&ten(3)).unwrap().status, PipelineStatus::CallScheduled);
    assert_eq!(derive_status(&ten(4)).unwrap().status, PipelineStatus::ProposalSent);
    assert_eq!(derive_status(&ten(7)).unwrap().status, PipelineStatus::ProposalSent);
    assert_eq!(derive_status(&ten(8)).unwrap().status, PipelineStatus::InProgress);
}

#[test]
fn test_properties_over_every_subset() {
    // All 512 completion patterns of the default 9 stages
    for mask in 0u32..(1 << 9) {
        let done: Vec<i64> = (1..=9).filter(|order| mask & (1 << (order - 1)) != 0).collect();
        let stages = nine_with_completed(&done);
        let summary = derive_status(&stages).unwrap();

        assert!((0.0..=1.0).contains(&summary.progress));
        assert_eq!(summary.completed_stages, done.len());
        assert_eq!(summary.status, PipelineStatus::from_progress(summary.progress));
        if done.len() == 9 {
            assert_eq!(summary.status, PipelineStatus::Completed);
        }

        let lowest_open = (1..=9).find(|order| !done.contains(order));
        assert_eq!(summary.current_stage.as_ref().map(|s| s.order), lowest_open);

        // Same input, same output
        assert_eq!(derive_status(&stages).unwrap(), summary);
    }
}

#[test]
fn test_current_stage_ignores_later_completions() {
    let summary = derive_status(&nine_with_completed(&[2, 3, 4, 5])).unwrap();
    assert_eq!(summary.current_stage.map(|s| s.order), Some(1));
    assert_eq!(summary.status, PipelineStatus::ProposalSent);
}

#[test]
fn test_malformed_input_rejected() {
    let mut stages = default_stages(1);
    stages[4].order = 1;
    assert!(matches!(derive_status(&stages), Err(PipelineError::InvalidInput(_))));

    let stages = vec![Stage::new(1, "x", -1)];
    assert!(matches!(derive_status(&stages), Err(PipelineError::InvalidInput(_))));
}
