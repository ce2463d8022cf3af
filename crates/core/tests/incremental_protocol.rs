//! Driving the incremental session with scripted external validators.

use layout_core::config::GraphConfig;
use layout_core::graph::{IncrementalSession, SessionEvent, SessionSummary, Verdict};
use layout_core::types::Vec3;

fn goal_config() -> GraphConfig {
    GraphConfig {
        goal: Some(Vec3::new(150.0, 0.0, 150.0)),
        max_segments: 40,
        ..GraphConfig::default()
    }
}

/// Drive a session to completion, answering every candidate with the
/// supplied validator. Returns the summary and the path-complete count.
fn drive(
    session: &mut IncrementalSession,
    mut validator: impl FnMut(u32) -> Verdict,
) -> (SessionSummary, u32) {
    let mut proposals = 0_u32;
    let mut paths_completed = 0_u32;
    loop {
        match session.advance() {
            SessionEvent::Candidate(_) => {
                let verdict = validator(proposals);
                proposals += 1;
                session.apply_verdict(verdict).expect("candidate is pending");
            }
            SessionEvent::PathComplete { .. } => paths_completed += 1,
            SessionEvent::Complete(summary) => return (summary, paths_completed),
            SessionEvent::Failed { path_index } => panic!("session failed at path {path_index}"),
        }
    }
}

#[test]
fn synchronous_accept_all_harness_completes_with_consistent_totals() {
    let mut session = IncrementalSession::new(goal_config(), 15.0, 1_001).expect("valid config");
    let (summary, paths_completed) = drive(&mut session, |_| Verdict::Accept);

    assert_eq!(summary.seed, 1_001);
    assert_eq!(summary.total_points, session.graph().points.len() as u32);
    assert_eq!(summary.total_segments, session.graph().segments.len() as u32);
    assert!(paths_completed >= 1, "at least the main path completes");
    assert!(session.is_complete());
}

#[test]
fn occasional_rejections_still_converge_to_a_complete_session() {
    // Reject every third proposal once; acceptance follows the shift.
    let mut rejected_last = false;
    let mut session = IncrementalSession::new(goal_config(), 15.0, 7_777).expect("valid config");
    let (summary, _) = drive(&mut session, move |proposal| {
        if proposal % 3 == 0 && !rejected_last {
            rejected_last = true;
            Verdict::Reject { overlap: 4.0 }
        } else {
            rejected_last = false;
            Verdict::Accept
        }
    });

    assert!(summary.total_segments > 0);
    assert!(session.is_complete());
}

#[test]
fn fixed_overlap_rejections_make_strict_progress_until_a_threshold_accepts() {
    // The validator demands at least 100 studs from the start before it
    // accepts anything, then accepts everything. Progress must be strict:
    // each resend moves the end point further along the segment direction.
    let config = GraphConfig { max_overlap_retries: 64, ..goal_config() };
    let mut session = IncrementalSession::new(config, 15.0, 3).expect("valid config");

    let mut last_distance = 0.0_f32;
    let mut first_acceptance_seen = false;
    loop {
        match session.advance() {
            SessionEvent::Candidate(candidate) => {
                let distance = candidate.to_position.distance_to(Vec3::ZERO);
                let verdict = if !first_acceptance_seen && distance < 100.0 {
                    assert!(
                        distance > last_distance - 1e-3,
                        "resent candidates must not retreat"
                    );
                    last_distance = distance;
                    Verdict::Reject { overlap: 5.0 }
                } else {
                    first_acceptance_seen = true;
                    Verdict::Accept
                };
                session.apply_verdict(verdict).expect("candidate is pending");
            }
            SessionEvent::PathComplete { .. } => {}
            SessionEvent::Complete(_) => break,
            SessionEvent::Failed { path_index } => panic!("failed at path {path_index}"),
        }
    }
    assert!(first_acceptance_seen, "the threshold validator must eventually accept");
}

#[test]
fn identical_seeds_and_verdict_scripts_replay_identical_graphs() {
    let script = |proposal: u32| {
        if proposal % 5 == 2 { Verdict::Reject { overlap: 3.0 } } else { Verdict::Accept }
    };

    let mut left = IncrementalSession::new(goal_config(), 15.0, 55_555).expect("valid config");
    let mut right = IncrementalSession::new(goal_config(), 15.0, 55_555).expect("valid config");
    drive(&mut left, script);
    drive(&mut right, script);

    assert_eq!(left.graph().canonical_bytes(), right.graph().canonical_bytes());
}

#[test]
fn abandoning_a_session_mid_verdict_requires_no_cleanup() {
    let mut session = IncrementalSession::new(goal_config(), 15.0, 12).expect("valid config");
    for _ in 0..4 {
        if let SessionEvent::Candidate(_) = session.advance() {
            session.apply_verdict(Verdict::Accept).expect("candidate is pending");
        }
    }
    // Leave a candidate pending and drop the session.
    let SessionEvent::Candidate(_) = session.advance() else {
        panic!("expected a pending candidate")
    };
    drop(session);
}
