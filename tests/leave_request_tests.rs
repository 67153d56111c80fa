use leavebot::LeaveError;
use leavebot::database::models::{LeaveStatus, LeaveType};
use pretty_assertions::assert_eq;
use tokio_test::assert_ok;

mod common;

use common::{ADMIN, TestContext, random_user, submission};

#[tokio::test]
async fn every_leave_type_creates_a_pending_request() {
    let ctx = TestContext::new();
    let (user_id, user_name) = random_user();

    for leave_type in LeaveType::ALL {
        let request = assert_ok!(
            ctx.service
                .submit_request(submission(
                    &user_id,
                    &user_name,
                    leave_type.as_str(),
                    "2024-03-01",
                    "2024-03-03",
                ))
                .await
        );

        assert_eq!(request.status, LeaveStatus::Pending);
        assert_eq!(request.leave_type, *leave_type);
        assert_eq!(request.approved_by, None);
        assert_eq!(request.created_at, request.updated_at);
        assert_eq!(request.days(), 3);
    }
}

#[tokio::test]
async fn unknown_leave_type_is_rejected() {
    let ctx = TestContext::new();
    let (user_id, user_name) = random_user();

    for bad in ["sabbatical", "", "vacation-ish"] {
        let err = ctx
            .service
            .submit_request(submission(&user_id, &user_name, bad, "2024-03-01", "2024-03-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, LeaveError::InvalidArgument(_)), "{bad}: {err}");
    }

    assert!(ctx.service.query_history(&user_id, &user_id).await.unwrap().is_empty());
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let ctx = TestContext::new();
    let (user_id, user_name) = random_user();

    let err = ctx
        .service
        .submit_request(submission(&user_id, &user_name, "sick", "2024-03-05", "2024-03-04"))
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::InvalidArgument(_)));
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let ctx = TestContext::new();
    let (user_id, user_name) = random_user();

    let err = ctx
        .service
        .submit_request(submission(&user_id, &user_name, "sick", "tomorrow", "2024-03-04"))
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::InvalidArgument(_)));
}

#[tokio::test]
async fn overlong_identity_is_rejected_before_storage() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .submit_request(submission(&"U".repeat(200), "alice", "vacation", "2024-03-01", "2024-03-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::InvalidArgument(_)));

    let err = ctx
        .service
        .submit_request(submission("U1", &"n".repeat(300), "vacation", "2024-03-01", "2024-03-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, LeaveError::InvalidArgument(_)));

    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn admin_cannot_request_leave() {
    let ctx = TestContext::new();

    let err = ctx
        .service
        .submit_request(submission(ADMIN, "boss", "vacation", "2024-03-01", "2024-03-02"))
        .await
        .unwrap_err();

    assert!(matches!(err, LeaveError::Unauthorized(_)));
}

#[tokio::test]
async fn submission_prompts_admin_and_confirms_to_user() {
    let ctx = TestContext::new();
    let (user_id, user_name) = random_user();

    let request = ctx
        .service
        .submit_request(submission(&user_id, &user_name, "personal", "2024-04-10", "2024-04-10"))
        .await
        .unwrap();

    let to_admin = ctx.notifier.sent_to(ADMIN);
    assert_eq!(to_admin.len(), 1);
    assert_eq!(to_admin[0].text, format!("New leave request from {}", user_name));
    let action_values: Vec<&str> = to_admin[0].actions.iter().map(|a| a.value.as_str()).collect();
    let id = request.id.to_string();
    assert_eq!(action_values, vec![id.as_str(), id.as_str()]);

    let to_user = ctx.notifier.sent_to(&user_id);
    assert_eq!(to_user.len(), 1);
    assert!(to_user[0].text.contains("pending approval"));
}

#[tokio::test]
async fn history_lists_only_own_requests_newest_first() {
    let ctx = TestContext::new();
    let (alice, alice_name) = random_user();
    let bob = format!("{}-bob", alice);

    let first = ctx
        .service
        .submit_request(submission(&alice, &alice_name, "vacation", "2024-01-01", "2024-01-02"))
        .await
        .unwrap();
    let second = ctx
        .service
        .submit_request(submission(&alice, &alice_name, "sick", "2024-02-01", "2024-02-01"))
        .await
        .unwrap();
    ctx.service
        .submit_request(submission(&bob, "bob", "other", "2024-02-01", "2024-02-01"))
        .await
        .unwrap();

    let history = ctx.service.query_history(&alice, &alice).await.unwrap();
    let ids: Vec<_> = history.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let as_admin = ctx.service.query_history(ADMIN, &alice).await.unwrap();
    assert_eq!(as_admin.len(), 2);
}

#[tokio::test]
async fn users_cannot_read_each_others_requests() {
    let ctx = TestContext::new();
    let (alice, alice_name) = random_user();
    let mallory = format!("{}-mallory", alice);

    let request = ctx
        .service
        .submit_request(submission(&alice, &alice_name, "vacation", "2024-01-01", "2024-01-02"))
        .await
        .unwrap();

    let err = ctx.service.get_request(&mallory, request.id).await.unwrap_err();
    assert!(matches!(err, LeaveError::Unauthorized(_)));

    let err = ctx.service.query_history(&mallory, &alice).await.unwrap_err();
    assert!(matches!(err, LeaveError::Unauthorized(_)));

    let fetched = ctx.service.get_request(&alice, request.id).await.unwrap();
    assert_eq!(fetched, request);
}
