//! Threaded comment integration tests.
//!
//! Comments persist as a flat table with one parent pointer; these tests
//! cover tree reconstruction, cross-thread validation, and pagination.

mod common;

use agora::domain::models::CommentSubject;
use agora::domain::ports::Page;
use agora::services::engagement::{CommentView, NewComment};
use agora::DomainError;

use common::{build_service, submit_open_proposal, submit_overdue_proposal, today};

fn comment(body: &str) -> NewComment {
    NewComment {
        body: body.to_string(),
        author_name: Some("Ana".to_string()),
        member_id: None,
        parent_id: None,
    }
}

fn reply(body: &str, parent: uuid::Uuid) -> NewComment {
    NewComment {
        parent_id: Some(parent),
        ..comment(body)
    }
}

fn tree_size(views: &[CommentView]) -> usize {
    views
        .iter()
        .map(|view| 1 + tree_size(&view.replies))
        .sum()
}

#[tokio::test]
async fn reply_chain_reconstructs_as_nested_tree() {
    // C1 <- C2 <- C3 must come back as C1[C2[C3]]
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Garden day").await;
    let subject = CommentSubject::Proposal(proposal.id);

    let c1 = service.add_comment(subject, comment("top")).await.expect("c1");
    let c2 = service
        .add_comment(subject, reply("first reply", c1.id))
        .await
        .expect("c2");
    let c3 = service
        .add_comment(subject, reply("second level", c2.id))
        .await
        .expect("c3");

    let thread = service
        .comment_thread(subject, Page::default())
        .await
        .expect("thread");

    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].id, c1.id);
    assert_eq!(thread[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].id, c2.id);
    assert_eq!(thread[0].replies[0].replies.len(), 1);
    assert_eq!(thread[0].replies[0].replies[0].id, c3.id);
}

#[tokio::test]
async fn tree_node_count_matches_persisted_comments() {
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Garden day").await;
    let subject = CommentSubject::Proposal(proposal.id);

    let c1 = service.add_comment(subject, comment("a")).await.expect("c1");
    let c2 = service.add_comment(subject, comment("b")).await.expect("c2");
    for parent in [c1.id, c1.id, c2.id] {
        service
            .add_comment(subject, reply("r", parent))
            .await
            .expect("reply");
    }

    let thread = service
        .comment_thread(subject, Page::default())
        .await
        .expect("thread");
    let total = service.comment_count(subject).await.expect("count");

    assert_eq!(total, 5);
    assert_eq!(tree_size(&thread) as i64, total);
}

#[tokio::test]
async fn reply_must_share_the_parents_subject() {
    let (_pool, service) = build_service().await;
    let first = submit_open_proposal(&service, "Garden day").await;
    let second = submit_open_proposal(&service, "Book swap").await;

    let parent = service
        .add_comment(CommentSubject::Proposal(first.id), comment("on the first"))
        .await
        .expect("parent");

    let err = service
        .add_comment(
            CommentSubject::Proposal(second.id),
            reply("wrong thread", parent.id),
        )
        .await
        .expect_err("cross-thread reply must fail");

    assert!(matches!(err, DomainError::ValidationFailed(_)));
}

#[tokio::test]
async fn commenting_on_a_missing_subject_fails() {
    let (_pool, service) = build_service().await;

    let err = service
        .add_comment(
            CommentSubject::Proposal(uuid::Uuid::new_v4()),
            comment("into the void"),
        )
        .await
        .expect_err("missing proposal");
    assert!(matches!(err, DomainError::ProposalNotFound(_)));

    let err = service
        .add_comment(
            CommentSubject::Execution(uuid::Uuid::new_v4()),
            comment("into the void"),
        )
        .await
        .expect_err("missing execution");
    assert!(matches!(err, DomainError::ExecutionNotFound(_)));
}

#[tokio::test]
async fn top_level_pagination_keeps_replies_attached() {
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Garden day").await;
    let subject = CommentSubject::Proposal(proposal.id);

    let mut roots = Vec::new();
    for i in 0..5 {
        let root = service
            .add_comment(subject, comment(&format!("root {i}")))
            .await
            .expect("root");
        service
            .add_comment(subject, reply("nested", root.id))
            .await
            .expect("reply");
        roots.push(root);
    }

    let first_page = service
        .comment_thread(subject, Page::new(1, 2))
        .await
        .expect("page 1");
    let third_page = service
        .comment_thread(subject, Page::new(3, 2))
        .await
        .expect("page 3");

    // Oldest first, two roots per page, each with its reply
    assert_eq!(first_page.len(), 2);
    assert_eq!(first_page[0].id, roots[0].id);
    assert_eq!(first_page[0].replies.len(), 1);
    assert_eq!(third_page.len(), 1);
    assert_eq!(third_page[0].id, roots[4].id);
}

#[tokio::test]
async fn unknown_author_degrades_to_placeholder() {
    // The null directory resolves nobody; a member id with no fallback
    // name must not fail the comment.
    let (_pool, service) = build_service().await;
    let proposal = submit_open_proposal(&service, "Garden day").await;

    let created = service
        .add_comment(
            CommentSubject::Proposal(proposal.id),
            NewComment {
                body: "anonymous-ish".to_string(),
                author_name: None,
                member_id: Some(uuid::Uuid::new_v4()),
                parent_id: None,
            },
        )
        .await
        .expect("comment");

    assert_eq!(created.author_name, "unknown member");
}

#[tokio::test]
async fn execution_threads_mirror_proposal_threads() {
    let (_pool, service) = build_service().await;
    let proposal = submit_overdue_proposal(&service, "Garden day").await;
    service.run_expiry_scan(today()).await.expect("scan");
    let record = service
        .execution_for_proposal(proposal.id)
        .await
        .expect("execution");

    let subject = CommentSubject::Execution(record.id);
    let root = service
        .add_comment(subject, comment("it happened"))
        .await
        .expect("root");
    service
        .add_comment(subject, reply("pictures?", root.id))
        .await
        .expect("reply");

    let thread = service
        .comment_thread(subject, Page::default())
        .await
        .expect("thread");
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].replies.len(), 1);
}
