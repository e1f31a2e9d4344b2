//! HTTP routes over the loaded store
//!
//! Every route takes a beneficiary id as its last path segment:
//! - `GET /api/beneficiaries/{id}`
//! - `GET /api/beneficiaries/accounts/{id}`
//! - `GET /api/beneficiaries/transactions/{id}`
//! - `GET /api/beneficiaries/balance/{id}`
//! - `GET /api/beneficiaries/maxWithdrawal/{id}`

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::features::{
    Account, Beneficiary, BeneficiaryId, Clock, Store, Transaction, TransactionError,
};

/// Shared by every handler. The store is never mutated once published.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Transaction(TransactionError::NoWithdrawalsLastMonth) => StatusCode::NOT_FOUND,
        };

        debug!("Responding {status}: {self}");
        (status, self.to_string()).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let beneficiary_routes = Router::new()
        .route("/:beneficiary_id", get(get_beneficiary))
        .route("/accounts/:beneficiary_id", get(get_accounts))
        .route("/transactions/:beneficiary_id", get(get_transactions))
        .route("/balance/:beneficiary_id", get(get_balance))
        .route("/maxWithdrawal/:beneficiary_id", get(get_largest_withdrawal));

    Router::new()
        .nest("/api/beneficiaries", beneficiary_routes)
        .with_state(state)
}

/// Responds `null` for an unknown id.
async fn get_beneficiary(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Option<Beneficiary>> {
    debug!("Beneficiary lookup for {id}");
    Json(Beneficiary::find_by_id(BeneficiaryId(id), &state.store).cloned())
}

async fn get_accounts(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Vec<Account>> {
    debug!("Account listing for beneficiary {id}");
    let accounts = Account::find_by_beneficiary(BeneficiaryId(id), &state.store);
    Json(accounts.into_iter().copied().collect())
}

async fn get_transactions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Json<Vec<Transaction>> {
    debug!("Transaction listing for beneficiary {id}");
    let transactions = Transaction::find_by_beneficiary(BeneficiaryId(id), &state.store);
    Json(transactions.into_iter().cloned().collect())
}

#[derive(Serialize)]
#[serde(transparent)]
struct Balance(#[serde(serialize_with = "rust_decimal::serde::float::serialize")] Decimal);

async fn get_balance(State(state): State<AppState>, Path(id): Path<i64>) -> Json<Balance> {
    debug!("Balance for beneficiary {id}");
    Json(Balance(Transaction::balance_of(BeneficiaryId(id), &state.store)))
}

async fn get_largest_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, ApiError> {
    debug!("Largest withdrawal last month for beneficiary {id}");
    let transaction = Transaction::largest_withdrawal_last_month(
        BeneficiaryId(id),
        &state.store,
        state.clock.as_ref(),
    )?;
    Ok(Json(transaction.clone()))
}
