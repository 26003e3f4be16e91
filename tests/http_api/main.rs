//! reqwest adapter against an axum mock of the card-database API.
//!
//! The mock hands out a `session` cookie on login; every later request is
//! recognised only if the client's cookie store sends it back.

#![cfg(feature = "http")]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use cardbase_session::api::{
    AccountPreferences, ApiError, Credentials, HttpAccountApi, ValidationRequest,
};
use cardbase_session::{
    AccountApi, Action, CardList, ClientConfig, DeckValidator, PreferencesStore, ReconcilerState,
    SessionReconciler,
};

const SESSION_COOKIE: &str = "session=ria-7";

#[derive(Default)]
struct Mock {
    saved_preferences: Option<serde_json::Value>,
    logouts: usize,
}

type Shared = Arc<Mutex<Mock>>;

fn signed_in(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(|cookies| cookies.split(';').any(|c| c.trim() == SESSION_COOKIE))
        .unwrap_or(false)
}

async fn me(headers: HeaderMap) -> impl IntoResponse {
    if signed_in(&headers) {
        (
            StatusCode::OK,
            Json(json!({ "id": 7, "username": "ria", "displayName": "Ria" })),
        )
            .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn login(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    if body["username"] == "ria" && body["password"] == "hunter2" {
        (
            [(header::SET_COOKIE, format!("{}; Path=/", SESSION_COOKIE))],
            Json(json!({ "id": 7, "username": "ria", "displayName": "Ria" })),
        )
            .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "bad credentials").into_response()
    }
}

async fn logout(State(mock): State<Shared>) -> impl IntoResponse {
    mock.lock().unwrap().logouts += 1;
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, "session=; Path=/; Max-Age=0")],
    )
}

async fn get_preferences(
    State(mock): State<Shared>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !signed_in(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match mock.lock().unwrap().saved_preferences.clone() {
        Some(saved) => Json(saved).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_preferences(
    State(mock): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    if !signed_in(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    mock.lock().unwrap().saved_preferences = Some(body);
    StatusCode::NO_CONTENT
}

async fn hand(headers: HeaderMap) -> impl IntoResponse {
    if !signed_in(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([{ "cardId": 9, "quantity": 5 }])).into_response()
}

async fn decks(headers: HeaderMap) -> impl IntoResponse {
    if !signed_in(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "id": 31, "name": "Red Aggro", "game": "ua", "visibility": "public", "cardCount": 50 },
        { "id": 32, "name": "Blue Control" }
    ]))
    .into_response()
}

async fn deck(Path(id): Path<i64>) -> impl IntoResponse {
    if id == 31 {
        Json(json!({
            "id": 31,
            "name": "Red Aggro",
            "game": "ua",
            "cards": [{ "cardId": 1, "quantity": 4 }],
            "visibility": "public"
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn save_deck(Path(_id): Path<i64>) -> impl IntoResponse {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance window")
}

async fn validate(Json(request): Json<ValidationRequest>) -> impl IntoResponse {
    let total = request.cards.total_quantity();
    if total >= 50 {
        Json(json!({ "valid": true, "errors": [] }))
    } else {
        Json(json!({ "valid": false, "errors": [format!("Deck has {} cards, needs 50", total)] }))
    }
}

/// Bind to port 0 and return the base url.
async fn start_server() -> (String, Shared) {
    let mock: Shared = Arc::default();
    let app = Router::new()
        .route("/api/auth/me", get(me))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route(
            "/api/users/me/preferences",
            get(get_preferences).put(put_preferences),
        )
        .route("/api/users/me/hand", get(hand))
        .route("/api/user/decks", get(decks))
        .route("/api/user/decks/:id", get(deck).put(save_deck))
        .route("/api/decks/validate", post(validate))
        .with_state(Arc::clone(&mock));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), mock)
}

fn client(base: &str) -> HttpAccountApi {
    HttpAccountApi::new(ClientConfig::default().with_api_url(base)).unwrap()
}

#[tokio::test]
async fn unauthenticated_identity_check_is_none() {
    let (base, _) = start_server().await;
    let api = client(&base);

    assert_eq!(api.me().await.unwrap(), None);
}

#[tokio::test]
async fn login_cookie_credentials_later_requests() {
    let (base, _) = start_server().await;
    let api = client(&base);

    let identity = api
        .login(&Credentials::new("ria", "hunter2"))
        .await
        .unwrap();
    assert_eq!(identity.id, Some(7));
    assert_eq!(identity.display_name, "Ria");

    let me = api.me().await.unwrap().unwrap();
    assert_eq!(me.username, "ria");
    assert_eq!(api.deck_ids().await.unwrap(), vec![31, 32]);
    assert_eq!(api.hand().await.unwrap().quantity_of(9), 5);
}

#[tokio::test]
async fn bad_login_is_unauthorized() {
    let (base, _) = start_server().await;
    let api = client(&base);

    let err = api
        .login(&Credentials::new("ria", "nope"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn missing_preferences_are_none_until_saved() {
    let (base, mock) = start_server().await;
    let api = client(&base);
    api.login(&Credentials::new("ria", "hunter2")).await.unwrap();

    assert_eq!(api.preferences().await.unwrap(), None);

    let prefs = AccountPreferences {
        sort: Some("release_desc".into()),
        page_size: Some(120),
    };
    api.save_preferences(&prefs).await.unwrap();
    assert_eq!(
        mock.lock().unwrap().saved_preferences,
        Some(json!({ "sort": "release_desc", "pageSize": 120 }))
    );
    assert_eq!(api.preferences().await.unwrap(), Some(prefs));
}

#[tokio::test]
async fn deck_errors_map_to_statuses() {
    let (base, _) = start_server().await;
    let api = client(&base);

    let deck = api.get_deck(31).await.unwrap();
    assert_eq!(deck.cards.quantity_of(1), 4);

    let err = api.get_deck(99).await.unwrap_err();
    assert_eq!(err, ApiError::NotFound("/api/user/decks/99".into()));

    let err = api.save_deck(31, &deck).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 503,
            message: "maintenance window".into()
        }
    );
}

#[tokio::test]
async fn validation_round_trip() {
    let (base, _) = start_server().await;
    let api = client(&base);

    let verdict = api
        .validate(&ValidationRequest {
            game: "ua".into(),
            cards: CardList::from(vec![cardbase_session::CardRef::new(1, 4)]),
        })
        .await
        .unwrap();
    assert!(!verdict.valid);
    assert_eq!(verdict.errors, vec!["Deck has 4 cards, needs 50".to_string()]);
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let api = client("http://127.0.0.1:9");
    let err = api.me().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert_eq!(err.status_code(), None);
}

#[tokio::test]
async fn reconciler_over_http() {
    let (base, mock) = start_server().await;
    let api = Arc::new(client(&base));
    let mut store = PreferencesStore::in_memory();
    store
        .dispatch(Action::AddToHand {
            card_id: 1,
            quantity: 2,
        })
        .unwrap();
    store.dispatch(Action::SetSort("name_desc".into())).unwrap();
    let mut reconciler = SessionReconciler::new(Arc::clone(&api));

    let restored = reconciler.restore_session(&mut store).await.unwrap();
    assert_eq!(restored.state, ReconcilerState::Anonymous);

    let outcome = reconciler
        .login(&mut store, &Credentials::new("ria", "hunter2"))
        .await
        .unwrap();
    assert_eq!(outcome.state, ReconcilerState::Authenticated { user_id: 7 });
    assert_eq!(store.hand().quantity_of(1), 2);
    assert_eq!(store.hand().quantity_of(9), 0);
    assert_eq!(store.filters().sort(), "name_desc");
    assert_eq!(store.deck_ids(), &[31, 32]);

    reconciler.logout(&mut store).await.unwrap();
    assert_eq!(mock.lock().unwrap().logouts, 1);
    assert_eq!(api.me().await.unwrap(), None);
    assert_eq!(store.hand().quantity_of(1), 2);
}
