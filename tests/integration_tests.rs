use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::NaiveDate;
use tower::ServiceExt;

use frontdesk::config::AppConfig;
use frontdesk::db::{AppointmentStore, SqliteAppointmentStore};
use frontdesk::errors::AppError;
use frontdesk::handlers;
use frontdesk::models::{Appointment, ContactField, ContactForm, Intent, Role, Session, Stage};
use frontdesk::services::ai::LlmProvider;
use frontdesk::services::booking;
use frontdesk::services::conversation::process_message;
use frontdesk::services::documents::DocumentQuery;
use frontdesk::state::AppState;

// ── Mock Providers ──

/// Answers each kind of prompt the way a cooperative model would.
struct MockLlm {
    date_reply: &'static str,
    date_calls: Arc<AtomicUsize>,
}

impl MockLlm {
    fn new(date_reply: &'static str) -> (Self, Arc<AtomicUsize>) {
        let date_calls = Arc::new(AtomicUsize::new(0));
        let llm = Self {
            date_reply,
            date_calls: Arc::clone(&date_calls),
        };
        (llm, date_calls)
    }
}

#[async_trait]
impl LlmProvider for MockLlm {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        if prompt.starts_with("Classify the following query") {
            let query = prompt
                .split("Query: ")
                .nth(1)
                .unwrap_or("")
                .to_lowercase();
            return if query.contains("book") || query.contains("appointment") {
                Ok("Appointment_Booking".to_string())
            } else if query.contains("revenue") {
                Ok("document_query".to_string())
            } else {
                Ok("general_chat".to_string())
            };
        }

        if prompt.starts_with("Today's date is") {
            self.date_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.date_reply.to_string());
        }

        Ok("Hello! How can I help you today?".to_string())
    }
}

struct DownLlm;

#[async_trait]
impl LlmProvider for DownLlm {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
        anyhow::bail!("connection refused")
    }
}

struct MockDocuments;

#[async_trait]
impl DocumentQuery for MockDocuments {
    async fn query_document(&self, _text: &str) -> anyhow::Result<String> {
        Ok("Revenue for 2024 was $10M.".to_string())
    }
}

struct BrokenDocuments;

#[async_trait]
impl DocumentQuery for BrokenDocuments {
    async fn query_document(&self, _text: &str) -> anyhow::Result<String> {
        anyhow::bail!("index unavailable")
    }
}

struct BrokenStore;

impl AppointmentStore for BrokenStore {
    fn append(&self, _appointment: &Appointment) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }

    fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        Ok(vec![])
    }
}

// ── Helpers ──

// 2025-06-18 is a Wednesday.
fn wednesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 18).unwrap()
}

fn build_state(
    llm: Arc<dyn LlmProvider>,
    documents: Box<dyn DocumentQuery>,
    store: Box<dyn AppointmentStore>,
) -> Arc<AppState> {
    Arc::new(
        AppState::new(AppConfig::default(), llm, documents, store).with_reference_date(wednesday()),
    )
}

fn test_state() -> (Arc<AppState>, Arc<AtomicUsize>) {
    let (llm, date_calls) = MockLlm::new("None");
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let state = build_state(Arc::new(llm), Box::new(MockDocuments), Box::new(store));
    (state, date_calls)
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn contact(phone: &str) -> ContactForm {
    ContactForm {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        phone: phone.to_string(),
    }
}

// ── Health Check ──

#[tokio::test]
async fn test_health() {
    let (state, _) = test_state();
    let res = test_app(state).oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Chat Endpoint ──

#[tokio::test]
async fn test_chat_booking_intent_prompts_for_date() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get("/chat?query=book%20an%20appointment"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["intent"], "appointment_booking");
    assert_eq!(json["response"], booking::DATE_PROMPT);
}

#[tokio::test]
async fn test_chat_document_answer_relayed_verbatim() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get("/chat?query=what%20was%20revenue%20last%20year"))
        .await
        .unwrap();

    let json = body_json(res).await;
    assert_eq!(json["intent"], "document_query");
    assert_eq!(json["response"], "Revenue for 2024 was $10M.");
}

#[tokio::test]
async fn test_chat_general() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(get("/chat?query=hi%20there"))
        .await
        .unwrap();

    let json = body_json(res).await;
    assert_eq!(json["intent"], "general_chat");
    assert_eq!(json["response"], "Hello! How can I help you today?");
}

#[tokio::test]
async fn test_chat_oracle_down_still_replies() {
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let state = build_state(Arc::new(DownLlm), Box::new(MockDocuments), Box::new(store));
    let res = test_app(state)
        .oneshot(get("/chat?query=book%20an%20appointment"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["intent"], "general_chat");
    assert!(!json["response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_empty_query_rejected() {
    let (state, _) = test_state();
    let res = test_app(state).oneshot(get("/chat?query=%20")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

// ── Date Parsing Endpoint ──

#[tokio::test]
async fn test_parse_next_monday_without_oracle() {
    let (state, date_calls) = test_state();
    let res = test_app(state)
        .oneshot(get("/parse_date?query=next%20monday"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["parsed_date"], "2025-06-23");
    assert_eq!(date_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_parse_falls_back_to_oracle() {
    let (llm, date_calls) = MockLlm::new("2025-06-30");
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let state = build_state(Arc::new(llm), Box::new(MockDocuments), Box::new(store));

    let res = test_app(state)
        .oneshot(get("/parse_date?query=end%20of%20the%20month"))
        .await
        .unwrap();

    let json = body_json(res).await;
    assert_eq!(json["parsed_date"], "2025-06-30");
    assert_eq!(date_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_ordinary_word_not_read_as_date_word() {
    let (state, date_calls) = test_state();
    let res = test_app(state)
        .oneshot(get("/parse_date?query=in%203%20ways"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(date_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_unresolvable_is_bad_request() {
    let (state, date_calls) = test_state();
    let res = test_app(state)
        .oneshot(get("/parse_date?query=asap%20please"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert!(json["error"].as_str().unwrap().contains("asap please"));
    assert_eq!(date_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_parse_oracle_down_is_bad_gateway() {
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let state = build_state(Arc::new(DownLlm), Box::new(MockDocuments), Box::new(store));
    let res = test_app(state)
        .oneshot(get("/parse_date?query=asap%20please"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

// ── Booking Endpoints ──

#[tokio::test]
async fn test_book_then_list_round_trip() {
    let (state, _) = test_state();

    let res = test_app(state.clone())
        .oneshot(post_empty(
            "/book_appointment?name=Alice&email=alice%40example.com&phone=%2B15551234567&date=2025-06-23",
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["appointment"]["date"], "2025-06-23");

    let res = test_app(state).oneshot(get("/appointments")).await.unwrap();
    let json = body_json(res).await;
    let appointments = json["appointments"].as_array().unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0]["name"], "Alice");
    assert_eq!(appointments[0]["email"], "alice@example.com");
    assert_eq!(appointments[0]["phone"], "+15551234567");
    assert_eq!(appointments[0]["date"], "2025-06-23");
}

#[tokio::test]
async fn test_book_bad_phone_names_field() {
    let (state, _) = test_state();

    let res = test_app(state.clone())
        .oneshot(post_empty(
            "/book_appointment?name=Alice&email=alice%40example.com&phone=12345&date=2025-06-23",
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["field"], "phone");
    assert!(state.store.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_book_persistence_failure_is_server_error() {
    let (llm, _) = MockLlm::new("None");
    let state = build_state(Arc::new(llm), Box::new(MockDocuments), Box::new(BrokenStore));

    let res = test_app(state)
        .oneshot(post_empty(
            "/book_appointment?name=Alice&email=alice%40example.com&phone=%2B15551234567&date=2025-06-23",
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// ── Conversation Flow ──

#[tokio::test]
async fn test_full_booking_conversation() {
    let (state, date_calls) = test_state();
    let mut session = Session::new("s1");

    let outcome = process_message(&state, &mut session, "book an appointment").await;
    assert_eq!(outcome.intent, Some(Intent::AppointmentBooking));
    assert_eq!(session.state.stage(), Stage::AwaitingDate);

    // Unresolvable date: oracle says None, state stays put.
    let outcome = process_message(&state, &mut session, "asap please").await;
    assert_eq!(outcome.intent, None);
    assert!(outcome.reply.contains("couldn't parse"), "got: {}", outcome.reply);
    assert_eq!(session.state.stage(), Stage::AwaitingDate);
    assert_eq!(date_calls.load(Ordering::SeqCst), 1);

    let outcome = process_message(&state, &mut session, "next monday").await;
    assert!(outcome.reply.contains("2025-06-23"));
    assert_eq!(session.state.stage(), Stage::AwaitingContact);
    assert_eq!(session.state.pending_date(), NaiveDate::from_ymd_opt(2025, 6, 23));
    assert_eq!(date_calls.load(Ordering::SeqCst), 1);

    let err = booking::submit_contact(&state, &mut session, &contact("12345")).unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation {
            field: ContactField::Phone,
            ..
        }
    ));
    assert_eq!(session.state.stage(), Stage::AwaitingContact);
    assert!(state.store.list().unwrap().is_empty());

    let appointment =
        booking::submit_contact(&state, &mut session, &contact("+15551234567")).unwrap();
    assert_eq!(session.state.stage(), Stage::Idle);
    assert_eq!(session.state.pending_date(), None);
    assert_eq!(state.store.list().unwrap(), vec![appointment]);

    // 3 user turns, 3 replies, the validation error and the confirmation.
    assert_eq!(session.transcript.len(), 8);
    assert!(session
        .transcript
        .last()
        .unwrap()
        .text
        .starts_with("Appointment successfully booked!"));
}

#[tokio::test]
async fn test_every_user_turn_gets_one_reply() {
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let (llm, _) = MockLlm::new("None");
    let state = build_state(Arc::new(llm), Box::new(BrokenDocuments), Box::new(store));
    let mut session = Session::new("s2");

    for message in ["what was revenue?", "hello", "book an appointment", "whenever"] {
        let before = session.transcript.len();
        process_message(&state, &mut session, message).await;
        assert_eq!(session.transcript.len(), before + 2);
        assert_eq!(session.transcript[before].role, Role::User);
        assert_eq!(session.transcript[before + 1].role, Role::Bot);
    }
    assert_eq!(session.state.last_input(), Some("whenever"));
}

#[tokio::test]
async fn test_oracle_down_while_awaiting_date_reprompts() {
    let store = SqliteAppointmentStore::open(":memory:").unwrap();
    let state = build_state(Arc::new(DownLlm), Box::new(MockDocuments), Box::new(store));
    let mut session = Session::new("s3");
    session.state.begin_booking();

    let outcome = process_message(&state, &mut session, "asap please").await;
    assert_eq!(outcome.reply, booking::ORACLE_DOWN_REPLY);
    assert_eq!(session.state.stage(), Stage::AwaitingDate);

    // Rule stages still work without the oracle.
    process_message(&state, &mut session, "tomorrow").await;
    assert_eq!(session.state.stage(), Stage::AwaitingContact);
    assert_eq!(session.state.pending_date(), NaiveDate::from_ymd_opt(2025, 6, 19));
}

#[tokio::test]
async fn test_contact_without_booking_rejected() {
    let (state, _) = test_state();
    let mut session = Session::new("s4");

    let err = booking::submit_contact(&state, &mut session, &contact("+15551234567")).unwrap_err();
    assert!(matches!(err, AppError::NoBookingInProgress));
    assert!(session.transcript.is_empty());
}

#[tokio::test]
async fn test_persistence_failure_keeps_session() {
    let (llm, _) = MockLlm::new("None");
    let state = build_state(Arc::new(llm), Box::new(MockDocuments), Box::new(BrokenStore));
    let mut session = Session::new("s5");
    session.state.begin_booking();
    session.state.confirm_date(wednesday());

    let err = booking::submit_contact(&state, &mut session, &contact("+15551234567")).unwrap_err();
    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(session.state.stage(), Stage::AwaitingContact);
    assert_eq!(session.state.pending_date(), Some(wednesday()));
}

// ── Session API ──

#[tokio::test]
async fn test_session_api_booking_flow() {
    let (state, _) = test_state();

    let res = test_app(state.clone())
        .oneshot(post_empty("/api/sessions"))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = body_json(res).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/sessions/{id}/messages"),
            serde_json::json!({ "message": "I'd like to book an appointment" }),
        ))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["intent"], "appointment_booking");
    assert_eq!(json["state"]["stage"], "awaiting_date");

    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/sessions/{id}/messages"),
            serde_json::json!({ "message": "next friday" }),
        ))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert!(json["intent"].is_null());
    assert_eq!(json["state"]["stage"], "awaiting_contact");
    assert_eq!(json["state"]["pending_date"], "2025-06-20");

    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/sessions/{id}/contact"),
            serde_json::json!({ "name": "Alice", "email": "alice@example.com", "phone": "12345" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(res).await["field"], "phone");

    let res = test_app(state.clone())
        .oneshot(post_json(
            &format!("/api/sessions/{id}/contact"),
            serde_json::json!({ "name": "Alice", "email": "alice@example.com", "phone": "+15551234567" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["appointment"]["date"], "2025-06-20");

    let res = test_app(state.clone())
        .oneshot(get(&format!("/api/sessions/{id}")))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["state"]["stage"], "idle");
    assert_eq!(json["transcript"].as_array().unwrap().len(), 6);

    let res = test_app(state.clone())
        .oneshot(post_empty(&format!("/api/sessions/{id}/reset")))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert!(json["transcript"].as_array().unwrap().is_empty());
    assert_eq!(state.store.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_session_not_found() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(post_json(
            "/api/sessions/missing/messages",
            serde_json::json!({ "message": "hello" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_on_idle_session_rejected() {
    let (state, _) = test_state();
    let id = state.sessions.create();

    let res = test_app(state)
        .oneshot(post_json(
            &format!("/api/sessions/{id}/contact"),
            serde_json::json!({ "name": "Alice", "email": "alice@example.com", "phone": "+15551234567" }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_session_frees_it() {
    let (state, _) = test_state();
    let id = state.sessions.create();
    let app = test_app(state.clone());

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(state.sessions.is_empty());

    let res = app.oneshot(get(&format!("/api/sessions/{id}"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unknown_session_not_found() {
    let (state, _) = test_state();
    let res = test_app(state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/sessions/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
