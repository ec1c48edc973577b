//! End-to-end dispatch against a local stand-in for the docking service.
//!
//! Run with: cargo test --package dockrelay-molecules --test test_http_dispatch

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dockrelay_common::SandboxClient;
use dockrelay_molecules::{
    ChemblResolver, DispatchSettings, Dispatcher, DockError, DockingEndpoint, DockingRequest,
    HttpDockingClient, HttpPreviewProbe, PreviewProbe, ReplyBlock,
};
use secrecy::SecretString;
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct FakeService {
    base: String,
    dock_hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

async fn dock(State(svc): State<FakeService>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    svc.dock_hits.fetch_add(1, Ordering::SeqCst);
    svc.bodies.lock().unwrap().push(body.clone());
    *svc.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let smiles = body["smiles"].as_str().unwrap_or_default();
    let target = body["target"].as_str().unwrap_or_default();
    match smiles {
        "FAIL" => (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "detail": "Docking failed for FAIL" }))).into_response(),
        "BOOM" => (StatusCode::INTERNAL_SERVER_ERROR, "Traceback (most recent call last): ...").into_response(),
        "GARBAGE" => (StatusCode::OK, "not json").into_response(),
        _ => {
            let id = if smiles == "GONE" { "missing" } else { "KEY123" };
            Json(json!({
                "score": -7.123,
                "preview_urls": [
                    format!("{}/view?structure_type=ligand&target={target}&molecule_id={id}", svc.base),
                    format!("{}/view?structure_type=complex&target={target}&molecule_id={id}", svc.base),
                ],
                "ligand_html_content": "<html><script>viewer.render()</script></html>",
                "combined_html_content": "<html><div id=\"complex\"></div></html>"
            }))
            .into_response()
        }
    }
}

async fn view(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("molecule_id").map(String::as_str) {
        Some("missing") | None => (StatusCode::NOT_FOUND, Html("<h2>Visualization not found</h2>")).into_response(),
        Some(_) => Html("<html>3Dmol viewer</html>").into_response(),
    }
}

async fn chembl_search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("q").map(String::as_str) {
        Some("ethanol") => Json(json!({
            "molecules": [ { "molecule_structures": { "canonical_smiles": "CCO" } } ]
        })),
        _ => Json(json!({ "molecules": [] })),
    }
}

async fn spawn_service() -> FakeService {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let svc = FakeService { base: format!("http://{addr}"), ..FakeService::default() };

    let app = Router::new()
        .route("/dock", post(dock))
        .route("/view", get(view))
        .route("/chembl/molecule/search.json", get(chembl_search))
        .with_state(svc.clone());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    svc
}

fn sandbox(svc: &FakeService) -> SandboxClient {
    let mut client = SandboxClient::new(Duration::from_secs(10)).unwrap();
    client.allow_url(&svc.base).unwrap();
    client
}

fn dispatcher(svc: &FakeService, settings: DispatchSettings) -> Dispatcher {
    let client = sandbox(svc);
    Dispatcher::new(
        Box::new(HttpDockingClient::new(client.clone(), format!("{}/dock", svc.base))),
        settings,
    )
    .with_resolver(Box::new(ChemblResolver::new(client.clone(), format!("{}/chembl", svc.base))))
    .with_preview_probe(Box::new(HttpPreviewProbe::new(client)))
}

#[tokio::test]
async fn test_wire_request_and_reply() {
    let svc = spawn_service().await;
    let reply = dispatcher(&svc, DispatchSettings::default()).handle_message("CCO").await;

    assert_eq!(svc.bodies.lock().unwrap().as_slice(), &[json!({ "smiles": "CCO", "target": "DRD2" })]);
    let text = reply.to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "Docked CCO vs DRD2 — score: -7.12");
    assert!(lines[1].starts_with("- [Ligand view](http://"));
    assert!(lines[1].contains("structure_type=ligand"));
    assert!(lines[2].starts_with("- [Complex view](http://"));
    assert!(lines[2].contains("structure_type=complex"));
    assert!(!text.contains("<html>"));
    assert!(!text.contains("script"));
}

#[tokio::test]
async fn test_status_mapping_per_molecule() {
    let svc = spawn_service().await;
    let reply = dispatcher(&svc, DispatchSettings::default())
        .handle_message("smiles:FAIL, smiles:BOOM, CCN against EGFR")
        .await;

    assert_eq!(svc.dock_hits.load(Ordering::SeqCst), 3);
    let rendered: Vec<String> = reply.blocks().iter().map(ReplyBlock::render).collect();
    assert_eq!(rendered[0], "Docking failed for this input; try another molecule or target.");
    assert!(!rendered[1].contains("Traceback"));
    assert!(!rendered[1].contains("500"));
    assert_eq!(rendered[2].lines().next(), Some("Docked CCN vs EGFR — score: -7.12"));
}

#[tokio::test]
async fn test_undecodable_body_is_unclassified() {
    let svc = spawn_service().await;
    let client = HttpDockingClient::new(sandbox(&svc), format!("{}/dock", svc.base));
    let err = client.dock(&DockingRequest::new("GARBAGE", None)).await.unwrap_err();
    assert!(matches!(err, DockError::Unclassified(_)));
}

#[tokio::test]
async fn test_oversized_batch_makes_no_http_call() {
    let svc = spawn_service().await;
    let reply = dispatcher(&svc, DispatchSettings::default())
        .handle_message("C, CC, CCC, CCCC, CCCCC, CCCCCC")
        .await;

    assert_eq!(svc.dock_hits.load(Ordering::SeqCst), 0);
    assert!(reply.is_clarification());
}

#[tokio::test]
async fn test_empty_request_makes_no_http_call() {
    let svc = spawn_service().await;
    let reply = dispatcher(&svc, DispatchSettings::default()).handle_message("dock against DRD2").await;

    assert_eq!(svc.dock_hits.load(Ordering::SeqCst), 0);
    assert_eq!(reply.len(), 1);
    assert!(matches!(reply.blocks()[0], ReplyBlock::Failed(DockError::MissingInput)));
}

#[tokio::test]
async fn test_name_resolved_through_chembl() {
    let svc = spawn_service().await;
    let reply = dispatcher(&svc, DispatchSettings::default()).handle_message("ethanol and kryptonite").await;

    assert_eq!(svc.dock_hits.load(Ordering::SeqCst), 1);
    assert_eq!(svc.bodies.lock().unwrap()[0]["smiles"], "CCO");
    assert!(reply.blocks()[0].render().starts_with("Docked CCO vs DRD2"));
    assert!(matches!(&reply.blocks()[1], ReplyBlock::Failed(DockError::NameNotResolved(_))));
}

#[tokio::test]
async fn test_preview_404_when_verifying() {
    let svc = spawn_service().await;
    let settings = DispatchSettings { verify_previews: true, ..DispatchSettings::default() };
    let reply = dispatcher(&svc, settings).handle_message("CCO, smiles:GONE").await;

    assert!(reply.blocks()[0].render().starts_with("Docked CCO"));
    assert_eq!(reply.blocks()[1].render(), "Preview not found; please re-run docking.");
}

#[tokio::test]
async fn test_preview_probe_direct() {
    let svc = spawn_service().await;
    let probe = HttpPreviewProbe::new(sandbox(&svc));

    assert!(probe.check(&format!("{}/view?molecule_id=KEY123", svc.base)).await.is_ok());
    let err = probe.check(&format!("{}/view?molecule_id=missing", svc.base)).await.unwrap_err();
    assert!(matches!(err, DockError::PreviewNotFound(_)));
}

#[tokio::test]
async fn test_bearer_token_sent() {
    let svc = spawn_service().await;
    let client = HttpDockingClient::new(sandbox(&svc), format!("{}/dock", svc.base))
        .with_api_key(SecretString::from("s3cret".to_string()));
    client.dock(&DockingRequest::new("CCO", None)).await.unwrap();

    assert_eq!(svc.auth.lock().unwrap().as_deref(), Some("Bearer s3cret"));
}

#[tokio::test]
async fn test_host_outside_allowlist_is_refused() {
    let svc = spawn_service().await;
    let client = HttpDockingClient::new(
        SandboxClient::new(Duration::from_secs(5)).unwrap(),
        format!("{}/dock", svc.base),
    );
    let err = client.dock(&DockingRequest::new("CCO", None)).await.unwrap_err();

    assert!(matches!(err, DockError::Unclassified(_)));
    assert_eq!(svc.dock_hits.load(Ordering::SeqCst), 0);
}
