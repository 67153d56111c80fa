use std::sync::Arc;

use leavebot::LeaveError;
use leavebot::database::models::{LeaveRequest, LeaveStatus};
use leavebot::services::Decision;
use pretty_assertions::assert_eq;
use uuid::Uuid;

mod common;

use common::{ADMIN, FailingNotifier, TestContext, random_user, submission};

async fn pending_request(ctx: &TestContext) -> LeaveRequest {
    let (user_id, user_name) = random_user();
    ctx.service
        .submit_request(submission(&user_id, &user_name, "vacation", "2024-03-01", "2024-03-03"))
        .await
        .unwrap()
}

#[tokio::test]
async fn approve_records_decision_maker() {
    let ctx = TestContext::new();
    let request = pending_request(&ctx).await;

    let approved = ctx
        .service
        .decide(request.id, Decision::Approve, ADMIN)
        .await
        .unwrap();

    assert_eq!(approved.status, LeaveStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some(ADMIN));
    assert_eq!(approved.created_at, request.created_at);
    assert!(approved.updated_at >= request.updated_at);

    let notices = ctx.notifier.sent_to(&request.user_id);
    let last = notices.last().unwrap();
    assert_eq!(
        last.text,
        "✅ Your leave request from 2024-03-01 to 2024-03-03 has been approved."
    );
}

#[tokio::test]
async fn reject_records_decision_maker() {
    let ctx = TestContext::new();
    let request = pending_request(&ctx).await;

    let rejected = ctx
        .service
        .decide(request.id, Decision::Reject, ADMIN)
        .await
        .unwrap();

    assert_eq!(rejected.status, LeaveStatus::Rejected);
    assert_eq!(rejected.approved_by.as_deref(), Some(ADMIN));
    assert!(ctx.notifier.sent_to(&request.user_id).last().unwrap().text.contains("rejected"));
}

#[tokio::test]
async fn second_decision_fails_and_keeps_first() {
    let ctx = TestContext::new();
    let request = pending_request(&ctx).await;

    ctx.service
        .decide(request.id, Decision::Approve, ADMIN)
        .await
        .unwrap();

    for decision in [Decision::Approve, Decision::Reject] {
        let err = ctx
            .service
            .decide(request.id, decision, ADMIN)
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidState(_)));
    }

    let stored = ctx.service.get_request(ADMIN, request.id).await.unwrap();
    assert_eq!(stored.status, LeaveStatus::Approved);
    // one confirmation plus one decision notice
    assert_eq!(ctx.notifier.sent_to(&request.user_id).len(), 2);
}

#[tokio::test]
async fn unknown_request_is_not_found() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .decide(Uuid::new_v4(), Decision::Approve, ADMIN)
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::NotFound(_)));
}

#[tokio::test]
async fn only_admin_can_decide() {
    let ctx = TestContext::new();
    let request = pending_request(&ctx).await;

    let err = ctx
        .service
        .decide(request.id, Decision::Approve, &request.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::Unauthorized(_)));

    let stored = ctx.service.get_request(ADMIN, request.id).await.unwrap();
    assert_eq!(stored.status, LeaveStatus::Pending);
}

#[tokio::test]
async fn concurrent_decisions_have_exactly_one_winner() {
    let ctx = TestContext::new();
    let request_id = pending_request(&ctx).await.id;

    let mut handles = Vec::new();
    for i in 0..8 {
        let service = ctx.service.clone();
        let decision = if i % 2 == 0 { Decision::Approve } else { Decision::Reject };
        handles.push(tokio::spawn(async move {
            service.decide(request_id, decision, ADMIN).await
        }));
    }

    let mut wins = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => wins += 1,
            Err(err) => assert!(matches!(err, LeaveError::InvalidState(_))),
        }
    }
    assert_eq!(wins, 1);
}

#[tokio::test]
async fn approval_does_not_deduct_balance() {
    let ctx = TestContext::new();
    let request = pending_request(&ctx).await;
    let before = ctx.service.query_balance(&request.user_id).await.unwrap();

    ctx.service
        .decide(request.id, Decision::Approve, ADMIN)
        .await
        .unwrap();

    let after = ctx.service.query_balance(&request.user_id).await.unwrap();
    assert_eq!(after.vacation, before.vacation);
}

#[tokio::test]
async fn delivery_failures_do_not_undo_decisions() {
    let service = TestContext::with_notifier(Arc::new(FailingNotifier));
    let (user_id, user_name) = random_user();

    let request = service
        .submit_request(submission(&user_id, &user_name, "sick", "2024-05-01", "2024-05-01"))
        .await
        .unwrap();
    let approved = service
        .decide(request.id, Decision::Approve, ADMIN)
        .await
        .unwrap();

    assert_eq!(approved.status, LeaveStatus::Approved);
}
