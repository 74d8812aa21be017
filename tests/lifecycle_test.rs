//! Proposal lifecycle integration tests.
//!
//! Covers the expiry scan, the manual advance, and the terminal moves
//! that execution outcomes drive.

mod common;

use agora::domain::models::{ExecutionStatus, ProposalStatus};
use agora::domain::ports::Page;
use agora::DomainError;

use common::{build_service, submit_open_proposal, submit_overdue_proposal, today};

#[tokio::test]
async fn expiry_scan_moves_overdue_proposals_into_execution() {
    let (_pool, service) = build_service().await;
    let proposal = submit_overdue_proposal(&service, "Repaint the hall").await;
    assert_eq!(proposal.status, ProposalStatus::Active);

    let report = service.run_expiry_scan(today()).await.expect("scan");
    assert_eq!(report.scanned, 1);
    assert_eq!(report.moved, 1);
    assert_eq!(report.failed, 0);

    let detail = service
        .proposal_detail(proposal.id, None, Page::default())
        .await
        .expect("detail");
    assert_eq!(detail.status, ProposalStatus::InExecution);

    let record = service
        .execution_for_proposal(proposal.id)
        .await
        .expect("execution");
    assert_eq!(record.status, ExecutionStatus::Pending);
}

#[tokio::test]
async fn open_proposals_survive_the_scan_untouched() {
    let (_pool, service) = build_service().await;
    let open = submit_open_proposal(&service, "Still voting").await;
    submit_overdue_proposal(&service, "Overdue").await;

    let report = service.run_expiry_scan(today()).await.expect("scan");
    assert_eq!(report.scanned, 1);

    let detail = service
        .proposal_detail(open.id, None, Page::default())
        .await
        .expect("detail");
    assert_eq!(detail.status, ProposalStatus::Active);
    assert!(matches!(
        service.execution_for_proposal(open.id).await,
        Err(DomainError::NoExecutionForProposal(_))
    ));
}

#[tokio::test]
async fn a_second_scan_finds_nothing_to_move() {
    let (_pool, service) = build_service().await;
    let proposal = submit_overdue_proposal(&service, "Repaint the hall").await;

    service.run_expiry_scan(today()).await.expect("first scan");
    let first = service
        .execution_for_proposal(proposal.id)
        .await
        .expect("execution");

    let report = service.run_expiry_scan(today()).await.expect("second scan");
    assert_eq!(report.scanned, 0);
    assert_eq!(report.moved, 0);

    // Same record, no duplicate
    let second = service
        .execution_for_proposal(proposal.id)
        .await
        .expect("execution");
    assert_eq!(first.id, second.id);
}

#[tokio::test]
async fn manual_advance_is_idempotent() {
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Move it along").await;

    let first = service
        .move_to_execution(proposal.id)
        .await
        .expect("first advance");
    let second = service
        .move_to_execution(proposal.id)
        .await
        .expect("repeat advance");

    assert_eq!(first.id, second.id);
    assert_eq!(second.status, ExecutionStatus::Pending);

    let detail = service
        .proposal_detail(proposal.id, None, Page::default())
        .await
        .expect("detail");
    assert_eq!(detail.status, ProposalStatus::InExecution);
}

#[tokio::test]
async fn completed_proposals_reject_a_further_advance() {
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Done deal").await;

    let record = service
        .move_to_execution(proposal.id)
        .await
        .expect("advance");
    service
        .update_execution_status(record.id, ExecutionStatus::Success, None)
        .await
        .expect("finalize");

    let err = service
        .move_to_execution(proposal.id)
        .await
        .expect_err("must reject");
    assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
}

#[tokio::test]
async fn successful_outcome_completes_the_proposal() {
    // Window closes, scan picks it up, outcome lands: the full arc.
    let (_pool, service) = build_service().await;
    let proposal = submit_overdue_proposal(&service, "Alumni dinner").await;

    service.run_expiry_scan(today()).await.expect("scan");
    let record = service
        .execution_for_proposal(proposal.id)
        .await
        .expect("execution");

    let finalized = service
        .update_execution_status(record.id, ExecutionStatus::Success, Some("Went well".into()))
        .await
        .expect("finalize");
    assert_eq!(finalized.status, ExecutionStatus::Success);
    assert_eq!(finalized.note.as_deref(), Some("Went well"));

    let detail = service
        .proposal_detail(proposal.id, None, Page::default())
        .await
        .expect("detail");
    assert_eq!(detail.status, ProposalStatus::Completed);
    let brief = detail.execution.expect("execution brief");
    assert_eq!(brief.status, ExecutionStatus::Success);
}

#[tokio::test]
async fn failed_outcome_also_completes_the_proposal() {
    let (_pool, service) = build_service().await;
    let proposal = submit_overdue_proposal(&service, "Rained out").await;

    service.run_expiry_scan(today()).await.expect("scan");
    let record = service
        .execution_for_proposal(proposal.id)
        .await
        .expect("execution");

    service
        .update_execution_status(record.id, ExecutionStatus::Failed, Some("Weather".into()))
        .await
        .expect("finalize");

    let detail = service
        .proposal_detail(proposal.id, None, Page::default())
        .await
        .expect("detail");
    assert_eq!(detail.status, ProposalStatus::Completed);
}
