use std::sync::{Arc, Mutex};

use axum::{extract::State, http::HeaderMap, routing::get, routing::post, Json, Router};
use client_core::{ApiClient, App, EventsBackend, Route, Screen, SessionContext};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Seen {
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

fn event_json(id: i64, start_date: &str) -> Value {
    json!({
        "id": id,
        "name": format!("event {id}"),
        "description": "open air",
        "id_event_category": 1,
        "id_event_location": 2,
        "start_date": start_date,
        "duration_in_minutes": 120,
        "price": "1500.50",
        "enabled_for_enrollment": "1",
        "max_assistance": "50",
        "id_creator_user": 1
    })
}

async fn login(Json(body): Json<Value>) -> Json<Value> {
    assert_eq!(body["username"], "ana@x.io");
    Json(json!({
        "success": true,
        "message": "ok",
        "token": "jwt-e2e",
        "usuario": { "id": 3, "first_name": "Ana", "last_name": "Paz", "username": "ana@x.io" }
    }))
}

async fn events(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    seen.auth.lock().expect("auth").push(auth);
    Json(json!([
        event_json(1, "2001-05-01T18:00:00.000Z"),
        event_json(2, "2091-05-01T18:00:00.000Z"),
        event_json(3, "2092-01-10 09:30:00")
    ]))
}

async fn spawn_server() -> (String, Seen) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/user/login", post(login))
        .route("/api/event", get(events))
        .with_state(seen.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), seen)
}

#[tokio::test]
async fn login_then_home_lists_both_partitions() {
    let (base_url, seen) = spawn_server().await;
    let backend: Arc<dyn EventsBackend> = Arc::new(ApiClient::new(base_url));
    let session = SessionContext::new();
    let mut app = App::new(backend, session.clone());
    assert!(app.start().await.is_empty());

    let Screen::Login(login) = app.screen_mut() else {
        panic!("expected login screen");
    };
    login.username = "ana@x.io".into();
    login.password = "secret".into();
    let outcome = login.submit().await;
    let alerts = app.handle(outcome).await;

    assert!(alerts.is_empty(), "unexpected alerts: {alerts:?}");
    assert_eq!(session.bearer().await.as_deref(), Some("jwt-e2e"));
    assert_eq!(session.get_session().await.user.map(|u| u.username), Some("ana@x.io".into()));
    assert_eq!(app.route(), Route::Home);

    let Screen::Home(home) = app.screen() else {
        panic!("expected home screen");
    };
    let upcoming: Vec<i64> = home.events().upcoming.iter().map(|e| e.id.0).collect();
    let past: Vec<i64> = home.events().past.iter().map(|e| e.id.0).collect();
    assert_eq!(upcoming, vec![2, 3]);
    assert_eq!(past, vec![1]);
    assert_eq!(home.events().upcoming[0].max_assistance, 50);
    assert_eq!(
        seen.auth.lock().expect("auth").clone(),
        vec![Some("Bearer jwt-e2e".to_string())]
    );
}
