use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode as HttpStatus},
    routing::post,
    Router,
};
use shared::domain::{Age, Gender};
use tokio::{net::TcpListener, sync::Mutex};

type SeenForms = Arc<Mutex<Vec<HashMap<String, String>>>>;

#[derive(Clone)]
struct EchoState {
    seen: SeenForms,
    status: HttpStatus,
    body: &'static str,
}

async fn handle_analyze(
    State(state): State<EchoState>,
    mut multipart: Multipart,
) -> (HttpStatus, [(header::HeaderName, &'static str); 1], &'static str) {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }
    state.seen.lock().await.push(fields);
    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body,
    )
}

async fn spawn_analysis_server(
    status: HttpStatus,
    body: &'static str,
) -> std::io::Result<(String, SeenForms)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let seen: SeenForms = Arc::new(Mutex::new(Vec::new()));
    let state = EchoState {
        seen: seen.clone(),
        status,
        body,
    };
    let app = Router::new()
        .route("/analyze", post(handle_analyze))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}"), seen))
}

#[test]
fn endpoint_appends_fixed_path() {
    let endpoint = analyze_endpoint("http://127.0.0.1:5000/").expect("endpoint");
    assert_eq!(endpoint.as_str(), "http://127.0.0.1:5000/analyze");
}

#[test]
fn endpoint_keeps_path_prefix() {
    let endpoint = analyze_endpoint(" https://lab.example.org/screening ").expect("endpoint");
    assert_eq!(endpoint.as_str(), "https://lab.example.org/screening/analyze");
}

#[test]
fn endpoint_rejects_unparseable_url() {
    let err = analyze_endpoint("not a url").expect_err("must fail");
    assert!(matches!(err, TransportError::InvalidEndpoint { .. }));
}

#[tokio::test]
async fn posts_multipart_fields_with_empty_optionals() {
    let (server_url, seen) =
        spawn_analysis_server(HttpStatus::OK, r#"{"message": "ok", "results": {}}"#)
            .await
            .expect("spawn server");
    let transport = HttpAnalysisTransport::new(&server_url).expect("transport");

    let reply = transport
        .post_analysis(&SubmissionPayload::new("ATCGATCGATCG"))
        .await
        .expect("reply");

    assert_eq!(reply.status, StatusCode::OK);
    let forms = seen.lock().await;
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["dna_sequence"], "ATCGATCGATCG");
    assert_eq!(forms[0]["age"], "");
    assert_eq!(forms[0]["gender"], "");
}

#[tokio::test]
async fn posts_demographics_as_text_fields() {
    let (server_url, seen) =
        spawn_analysis_server(HttpStatus::OK, r#"{"message": "ok", "results": {}}"#)
            .await
            .expect("spawn server");
    let transport = HttpAnalysisTransport::new(&server_url).expect("transport");
    let payload = SubmissionPayload::new("GATTACAGATTACA")
        .with_age(Age::new(57).expect("age"))
        .with_gender(Gender::Male);

    transport.post_analysis(&payload).await.expect("reply");

    let forms = seen.lock().await;
    assert_eq!(forms[0]["age"], "57");
    assert_eq!(forms[0]["gender"], "M");
}

#[tokio::test]
async fn error_status_is_a_reply_not_an_error() {
    let (server_url, _seen) = spawn_analysis_server(
        HttpStatus::BAD_REQUEST,
        r#"{"error": "DNA sequence seems too short for meaningful analysis"}"#,
    )
    .await
    .expect("spawn server");
    let transport = HttpAnalysisTransport::new(&server_url).expect("transport");

    let reply = transport
        .post_analysis(&SubmissionPayload::new("ATCG"))
        .await
        .expect("reply");

    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&reply.body).contains("too short"));
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let transport = HttpAnalysisTransport::new(&format!("http://{addr}")).expect("transport");
    let err = transport
        .post_analysis(&SubmissionPayload::new("ATCG"))
        .await
        .expect_err("must fail");

    assert!(matches!(err, TransportError::Request(_)));
}
