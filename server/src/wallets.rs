//! In-memory wallet registry served under `/api/wallets`.
//!
//! Blank fields and duplicate addresses are business failures: HTTP 200
//! with a non-zero envelope code. Unknown or malformed ids are HTTP errors.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use envelope_core::Envelope;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::payload::Payload;

/// Envelope code for an address that is already registered.
pub const DUPLICATE_ADDRESS: i64 = 1001;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub id: Uuid,
    pub nickname: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateWallet {
    pub nickname: String,
    pub address: String,
}

/// Partial update; omitted fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateWallet {
    pub nickname: Option<String>,
    pub address: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Wallet>>>;

pub async fn list_wallets(State(db): State<Db>) -> Json<Envelope<Vec<Wallet>>> {
    let wallets = db.read().await;
    let mut all: Vec<Wallet> = wallets.values().cloned().collect();
    all.sort_by(|a, b| a.nickname.cmp(&b.nickname).then(a.id.cmp(&b.id)));
    Json(Envelope::success(all))
}

pub async fn create_wallet(
    State(db): State<Db>,
    Payload(input): Payload<CreateWallet>,
) -> Response {
    let nickname = input.nickname.trim().to_string();
    let address = input.address.trim().to_string();
    if let Err(message) = validate(&nickname, &address) {
        return Json(Envelope::<Value>::error(message)).into_response();
    }

    let mut wallets = db.write().await;
    if address_taken(&wallets, &address, None) {
        return Json(duplicate()).into_response();
    }
    let wallet = Wallet {
        id: Uuid::new_v4(),
        nickname,
        address,
    };
    wallets.insert(wallet.id, wallet.clone());
    tracing::info!(id = %wallet.id, "wallet created");
    Json(Envelope::success_with_message(wallet, "wallet created")).into_response()
}

pub async fn get_wallet(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Wallet>>, AppError> {
    let id = parse_id(&id)?;
    let wallets = db.read().await;
    wallets
        .get(&id)
        .cloned()
        .map(|w| Json(Envelope::success(w)))
        .ok_or_else(|| not_found(id))
}

pub async fn update_wallet(
    State(db): State<Db>,
    Path(id): Path<String>,
    Payload(input): Payload<UpdateWallet>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let mut wallets = db.write().await;
    let current = wallets.get(&id).ok_or_else(|| not_found(id))?;

    let nickname = input
        .nickname
        .map(|n| n.trim().to_string())
        .unwrap_or_else(|| current.nickname.clone());
    let address = input
        .address
        .map(|a| a.trim().to_string())
        .unwrap_or_else(|| current.address.clone());
    if let Err(message) = validate(&nickname, &address) {
        return Ok(Json(Envelope::<Value>::error(message)).into_response());
    }
    if address_taken(&wallets, &address, Some(id)) {
        return Ok(Json(duplicate()).into_response());
    }

    let wallet = Wallet {
        id,
        nickname,
        address,
    };
    wallets.insert(id, wallet.clone());
    tracing::info!(%id, "wallet updated");
    Ok(Json(Envelope::success_with_message(wallet, "wallet updated")).into_response())
}

pub async fn delete_wallet(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Value>>, AppError> {
    let id = parse_id(&id)?;
    let mut wallets = db.write().await;
    wallets.remove(&id).ok_or_else(|| not_found(id))?;
    tracing::info!(%id, "wallet deleted");
    Ok(Json(Envelope::success_with_message(json!({}), "wallet deleted")))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("invalid wallet id: {raw}")))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("wallet {id} not found"))
}

fn validate(nickname: &str, address: &str) -> Result<(), &'static str> {
    if nickname.is_empty() {
        return Err("nickname is required");
    }
    if address.is_empty() {
        return Err("address is required");
    }
    Ok(())
}

fn address_taken(wallets: &HashMap<Uuid, Wallet>, address: &str, except: Option<Uuid>) -> bool {
    wallets
        .values()
        .any(|w| Some(w.id) != except && w.address.eq_ignore_ascii_case(address))
}

fn duplicate() -> Envelope<Value> {
    Envelope::with_code(DUPLICATE_ADDRESS, "address already registered")
}
