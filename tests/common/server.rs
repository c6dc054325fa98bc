//! Local axum server standing in for Esplora, mempool fees and the ORC
//! backend

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{txid, OTHER_ADDRESS};

/// Request counters and failure injection shared with handlers
#[derive(Default)]
pub struct ServerState {
    pub utxo_requests: AtomicUsize,
    pub utxo_failures: AtomicUsize,
    pub broadcasts: AtomicUsize,
}

pub struct MockServer {
    pub url: String,
    pub state: Arc<ServerState>,
}

async fn address_utxos(
    State(state): State<Arc<ServerState>>,
    Path(address): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    state.utxo_requests.fetch_add(1, Ordering::SeqCst);
    let failures = state.utxo_failures.load(Ordering::SeqCst);
    if failures > 0 {
        state.utxo_failures.store(failures - 1, Ordering::SeqCst);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    if address == OTHER_ADDRESS {
        return Ok(Json(json!([
            { "txid": txid('7'), "vout": 0, "value": 9_000,
              "status": { "confirmed": true, "block_height": 102 } }
        ])));
    }

    Ok(Json(json!([
        { "txid": txid('a'), "vout": 0, "value": 600,
          "status": { "confirmed": true, "block_height": 100 } },
        { "txid": "not-a-txid", "vout": 0, "value": 50_000 },
        { "txid": txid('b'), "vout": 1, "value": 0 },
        { "txid": txid('c'), "vout": 2, "value": 25_000,
          "status": { "confirmed": false } },
        { "txid": txid('d'), "vout": 0, "value": 40_000,
          "status": { "confirmed": true, "block_height": 101 } }
    ])))
}

async fn address_info(Path(address): Path<String>) -> Json<Value> {
    // Whole confirmed balance spent by a transaction still in the mempool
    if address == OTHER_ADDRESS {
        return Json(json!({
            "address": address,
            "chain_stats": { "funded_txo_sum": 10_000, "spent_txo_sum": 0, "tx_count": 1 },
            "mempool_stats": { "funded_txo_sum": 0, "spent_txo_sum": 10_000, "tx_count": 1 }
        }));
    }

    Json(json!({
        "address": address,
        "chain_stats": { "funded_txo_sum": 90_000, "spent_txo_sum": 25_000, "tx_count": 3 },
        "mempool_stats": { "funded_txo_sum": 1_000, "spent_txo_sum": 0, "tx_count": 1 }
    }))
}

async fn outspend(Path((_txid, index)): Path<(String, u32)>) -> Result<Json<Value>, StatusCode> {
    match index {
        0 => Ok(Json(json!({ "spent": true, "txid": txid('e'), "vin": 0 }))),
        1 => Ok(Json(json!({ "spent": false }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn recommended_fees() -> Json<Value> {
    Json(json!({
        "fastestFee": 25,
        "halfHourFee": 18,
        "hourFee": 7.3,
        "economyFee": 4,
        "minimumFee": 1
    }))
}

async fn broadcast_raw(body: String) -> Result<String, (StatusCode, String)> {
    if body.trim() == "00" {
        return Err((
            StatusCode::BAD_REQUEST,
            "sendrawtransaction RPC error: TX decode failed".to_string(),
        ));
    }
    Ok(txid('f'))
}

async fn backend_broadcast(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.broadcasts.fetch_add(1, Ordering::SeqCst);
    match body["signed_psbt"].as_str() {
        Some(psbt) if !psbt.contains("bad") => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": { "txid": txid('9') } })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Invalid PSBT" })),
        ),
    }
}

/// Start the server on an ephemeral local port
pub async fn spawn() -> MockServer {
    let state = Arc::new(ServerState::default());

    let app = Router::new()
        .route("/address/:address/utxo", get(address_utxos))
        .route("/address/:address", get(address_info))
        .route("/tx/:txid/outspend/:index", get(outspend))
        .route("/v1/fees/recommended", get(recommended_fees))
        .route("/tx", post(broadcast_raw))
        .route("/transactions/broadcast", post(backend_broadcast))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Failed to read local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Mock server failed");
    });

    MockServer {
        url: format!("http://{}", addr),
        state,
    }
}
