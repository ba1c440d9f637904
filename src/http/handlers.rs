//! Route handlers.
//!
//! Registration endpoints only touch the store. Chain endpoints answer 503
//! when the deployment has no chain client.

use alloy::primitives::Address;
use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::blockchain::classify::ClassifiedError;
use crate::blockchain::contract::{contract_info, ContractInfo, DepositContract};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::registrations::redemption::prepare_redemption;
use crate::registrations::types::{address_key, RegistrationRecord};

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid wallet address: {}", raw)))
}

fn contract(state: &AppState) -> Result<&Arc<dyn DepositContract>, ApiError> {
    state.contract.as_ref().ok_or_else(ApiError::chain_unavailable)
}

pub async fn list_registrations(
    State(state): State<AppState>,
) -> Result<Json<Vec<RegistrationRecord>>, ApiError> {
    Ok(Json(state.store.get_all().await?))
}

pub async fn get_registration(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<RegistrationRecord>, ApiError> {
    state
        .store
        .get_by_key(&wallet_address)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Registration not found"))
}

pub async fn upsert_registration(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let record: RegistrationRecord = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(format!("Invalid registration: {}", e)))?;
    state.store.upsert(record).await?;
    Ok(success())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    #[serde(default)]
    wallet_address: Option<String>,
}

pub async fn delete_registration(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: DeleteRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Wallet address is required"))?;
    let wallet_address = request
        .wallet_address
        .filter(|a| !a.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Wallet address is required"))?;

    state.store.delete_by_key(&wallet_address).await?;
    Ok(success())
}

pub async fn get_contract(State(state): State<AppState>) -> Result<Json<ContractInfo>, ApiError> {
    let contract = contract(&state)?;
    Ok(Json(contract_info(contract.as_ref(), &state.chain).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositStatus {
    pub wallet_address: String,
    pub has_deposited: bool,
}

pub async fn get_deposit_status(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<DepositStatus>, ApiError> {
    let contract = contract(&state)?;
    let address = parse_address(&wallet_address)?;
    let has_deposited = contract
        .has_deposited(address)
        .await
        .map_err(ClassifiedError::from)?;
    Ok(Json(DepositStatus {
        wallet_address: address_key(&address),
        has_deposited,
    }))
}

pub async fn get_redemption(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> Result<Json<Option<RegistrationRecord>>, ApiError> {
    let contract = contract(&state)?;
    let address = parse_address(&wallet_address)?;
    let prepared = prepare_redemption(contract.as_ref(), state.store.as_ref(), address).await?;
    Ok(Json(prepared))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let (chain, block_number) = match &state.client {
        None => ("unconfigured", None),
        Some(client) => match tokio::join!(client.is_healthy(), client.get_block_number()) {
            (true, Ok(block)) => ("connected", Some(block)),
            (true, Err(e)) => {
                tracing::warn!(error = %e, "Chain id answered but block number did not");
                ("connected", None)
            }
            (false, _) => ("unreachable", None),
        },
    };
    let storage = match state.store.get_all().await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the store");
            "error"
        }
    };
    let status = if storage == "ok" && chain != "unreachable" {
        "ok"
    } else {
        "degraded"
    };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "chainId": state.chain.chain_id,
        "chain": chain,
        "blockNumber": block_number,
        "storage": storage,
    }))
}
