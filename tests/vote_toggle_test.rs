//! Vote toggle protocol integration tests.
//!
//! The ballot ledger is the source of truth: the denormalized counters on
//! proposals and comments must always equal the live ballot rows, and a
//! voter's repeated action must cancel or flip their own ballot.

mod common;

use std::collections::HashMap;

use proptest::prelude::*;
use sqlx::Row;

use agora::domain::models::{CommentSubject, VoteKind};
use agora::services::engagement::NewComment;

use common::{build_service, submit_open_proposal};

async fn stored_counts(pool: &sqlx::SqlitePool, proposal_id: uuid::Uuid) -> (i64, i64) {
    let row = sqlx::query("SELECT upvotes, downvotes FROM proposals WHERE id = ?")
        .bind(proposal_id.to_string())
        .fetch_one(pool)
        .await
        .expect("proposal row");
    (row.get("upvotes"), row.get("downvotes"))
}

async fn ballot_rows(pool: &sqlx::SqlitePool, proposal_id: uuid::Uuid) -> i64 {
    sqlx::query("SELECT COUNT(*) AS n FROM proposal_ballots WHERE proposal_id = ?")
        .bind(proposal_id.to_string())
        .fetch_one(pool)
        .await
        .expect("count")
        .get("n")
}

#[tokio::test]
async fn first_vote_inserts_a_ballot() {
    let (pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    let receipt = service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Up)
        .await
        .expect("vote");

    assert_eq!(receipt.tally.upvotes, 1);
    assert_eq!(receipt.tally.downvotes, 0);
    assert_eq!(stored_counts(&pool, proposal.id).await, (1, 0));
    assert_eq!(ballot_rows(&pool, proposal.id).await, 1);
}

#[tokio::test]
async fn repeating_a_vote_withdraws_it() {
    let (pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Up)
        .await
        .expect("first vote");
    let receipt = service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Up)
        .await
        .expect("second vote");

    assert_eq!(receipt.tally.upvotes, 0);
    assert_eq!(stored_counts(&pool, proposal.id).await, (0, 0));
    assert_eq!(ballot_rows(&pool, proposal.id).await, 0);
}

#[tokio::test]
async fn opposite_vote_flips_the_ballot_in_place() {
    let (pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Up)
        .await
        .expect("up");
    let receipt = service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Down)
        .await
        .expect("down");

    assert_eq!(receipt.tally.upvotes, 0);
    assert_eq!(receipt.tally.downvotes, 1);
    // One row, not a delete-then-insert pair
    assert_eq!(ballot_rows(&pool, proposal.id).await, 1);
    assert_eq!(stored_counts(&pool, proposal.id).await, (0, 1));
}

#[tokio::test]
async fn voters_tally_independently() {
    let (pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    for voter in ["a@x.com", "b@x.com", "c@x.com"] {
        service
            .vote_on_proposal(proposal.id, voter, VoteKind::Up)
            .await
            .expect("vote");
    }
    service
        .vote_on_proposal(proposal.id, "d@x.com", VoteKind::Down)
        .await
        .expect("vote");

    assert_eq!(stored_counts(&pool, proposal.id).await, (3, 1));
}

#[tokio::test]
async fn one_voter_walking_up_up_down() {
    // up (1/0), up again (0/0), down (0/1)
    let (pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    let r1 = service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Up)
        .await
        .expect("up");
    assert_eq!((r1.tally.upvotes, r1.tally.downvotes), (1, 0));

    let r2 = service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Up)
        .await
        .expect("up again");
    assert_eq!((r2.tally.upvotes, r2.tally.downvotes), (0, 0));

    let r3 = service
        .vote_on_proposal(proposal.id, "a@x.com", VoteKind::Down)
        .await
        .expect("down");
    assert_eq!((r3.tally.upvotes, r3.tally.downvotes), (0, 1));
    assert_eq!(ballot_rows(&pool, proposal.id).await, 1);
}

#[tokio::test]
async fn invalid_voter_email_is_rejected() {
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    let err = service
        .vote_on_proposal(proposal.id, "not-an-email", VoteKind::Up)
        .await
        .expect_err("should reject");
    assert!(err.to_string().contains("Invalid voter email"));
}

#[tokio::test]
async fn comment_ballots_use_the_same_toggle() {
    let (pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Street fair").await;

    let comment = service
        .add_comment(
            CommentSubject::Proposal(proposal.id),
            NewComment {
                body: "Count me in".to_string(),
                author_name: Some("Bo".to_string()),
                member_id: None,
                parent_id: None,
            },
        )
        .await
        .expect("comment");

    let voter = uuid::Uuid::new_v4();
    // like, like (withdraw), dislike
    service
        .vote_on_comment(comment.id, voter, VoteKind::Up)
        .await
        .expect("like");
    service
        .vote_on_comment(comment.id, voter, VoteKind::Up)
        .await
        .expect("unlike");
    let receipt = service
        .vote_on_comment(comment.id, voter, VoteKind::Down)
        .await
        .expect("dislike");

    assert_eq!(receipt.tally.upvotes, 0);
    assert_eq!(receipt.tally.downvotes, 1);

    let row = sqlx::query("SELECT likes, dislikes FROM comments WHERE id = ?")
        .bind(comment.id.to_string())
        .fetch_one(&pool)
        .await
        .expect("comment row");
    let (likes, dislikes): (i64, i64) = (row.get("likes"), row.get("dislikes"));
    assert_eq!((likes, dislikes), (0, 1));
}

/// Apply the toggle rules to an in-memory model of one voter's ballot.
fn apply_to_model(existing: &mut Option<VoteKind>, requested: VoteKind) {
    *existing = match existing {
        None => Some(requested),
        Some(kind) if *kind == requested => None,
        Some(_) => Some(requested),
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// After any sequence of votes the stored counters equal the count of
    /// live ballot rows per kind.
    #[test]
    fn counters_match_ledger_after_any_sequence(
        ops in proptest::collection::vec((0usize..4, prop::bool::ANY), 1..20)
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        rt.block_on(async move {
            let (pool, service) = build_service().await;
            let proposal = submit_open_proposal(&service, "Fuzzed proposal").await;

            let voters = ["a@x.com", "b@x.com", "c@x.com", "d@x.com"];
            let mut model: HashMap<&str, Option<VoteKind>> = HashMap::new();

            for (voter_ix, up) in ops {
                let voter = voters[voter_ix];
                let kind = if up { VoteKind::Up } else { VoteKind::Down };

                let receipt = service
                    .vote_on_proposal(proposal.id, voter, kind)
                    .await
                    .expect("vote");
                apply_to_model(model.entry(voter).or_insert(None), kind);

                let expected_up = model.values().filter(|v| **v == Some(VoteKind::Up)).count() as i64;
                let expected_down = model.values().filter(|v| **v == Some(VoteKind::Down)).count() as i64;

                assert_eq!(receipt.tally.upvotes, expected_up);
                assert_eq!(receipt.tally.downvotes, expected_down);
                assert_eq!(stored_counts(&pool, proposal.id).await, (expected_up, expected_down));
            }
        });
    }
}
