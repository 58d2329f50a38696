use super::*;

fn ana() -> UserSummary {
    UserSummary {
        id: UserId(3),
        first_name: Some("Ana".into()),
        last_name: Some("Paz".into()),
        username: "ana@x.io".into(),
    }
}

#[tokio::test]
async fn starts_empty_and_clones_share_state() {
    let session = SessionContext::new();
    let other = session.clone();
    assert_eq!(session.get_session().await, Session::default());

    other.set_session("tok", Some(ana())).await;

    assert!(session.is_authenticated().await);
    assert_eq!(session.bearer().await.as_deref(), Some("tok"));
    assert_eq!(session.user_id().await, Some(UserId(3)));
}

#[tokio::test]
async fn clear_returns_to_empty_state() {
    let session = SessionContext::new();
    session.set_session("tok", Some(ana())).await;
    session.clear_session().await;

    assert!(!session.is_authenticated().await);
    assert_eq!(session.get_session().await, Session::default());
}
