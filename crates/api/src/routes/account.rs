//! Account routes: balances, history and the operations that move money.
//!
//! Every route acts on the authenticated account only.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use somon_core::currency::ConversionQuote;
use somon_core::ledger::{
    Account, ConversionReceipt, Recipient, TransactionRecord, TransferReceipt, validate_amount,
};
use somon_shared::types::{AccountId, Currency, PageRequest, PageResponse};

use crate::{ApiError, AppState, Backend, middleware::AuthUser};

/// Creates the account routes (requires auth middleware to be applied externally).
pub fn routes<B: Backend>() -> Router<AppState<B>> {
    Router::new()
        .route("/account", get(get_account::<B>))
        .route("/account/transactions", get(list_transactions::<B>))
        .route("/account/recipients", get(list_recipients::<B>))
        .route("/account/deposit", post(deposit::<B>))
        .route("/account/transfer", post(transfer::<B>))
        .route("/account/convert/quote", post(quote_conversion::<B>))
        .route("/account/convert", post(convert::<B>))
}

/// Request body for a deposit.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    /// Home-currency amount to credit.
    pub amount: Decimal,
}

/// Request body for a transfer.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Receiving account.
    pub recipient_id: AccountId,
    /// Home-currency amount to move.
    pub amount: Decimal,
}

/// Request body for a conversion quote.
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    /// Currency to debit.
    pub from: Currency,
    /// Currency to credit.
    pub to: Currency,
    /// Amount of `from` to convert.
    pub amount: Decimal,
}

/// Request body for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Currency to debit.
    pub from: Currency,
    /// Currency to credit.
    pub to: Currency,
    /// Amount of `from` to convert.
    pub amount: Decimal,
    /// Rate from a previous quote. Resolved now when absent.
    pub rate: Option<Decimal>,
}

/// GET /account - Current account and balances.
async fn get_account<B: Backend>(
    State(state): State<AppState<B>>,
    user: AuthUser,
) -> Result<Json<Account>, ApiError> {
    Ok(Json(state.ledger.get_balance(user.account_id()).await?))
}

/// GET /account/transactions - History, newest first.
async fn list_transactions<B: Backend>(
    State(state): State<AppState<B>>,
    user: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<TransactionRecord>>, ApiError> {
    let page = state
        .ledger
        .get_transactions(user.account_id(), page)
        .await?;
    Ok(Json(page))
}

/// GET /account/recipients - Every other account, for the transfer form.
async fn list_recipients<B: Backend>(
    State(state): State<AppState<B>>,
    user: AuthUser,
) -> Result<Json<Vec<Recipient>>, ApiError> {
    Ok(Json(state.ledger.list_recipients(user.account_id()).await?))
}

/// POST /account/deposit - Credit the home-currency balance.
async fn deposit<B: Backend>(
    State(state): State<AppState<B>>,
    user: AuthUser,
    Json(payload): Json<DepositRequest>,
) -> Result<Json<TransactionRecord>, ApiError> {
    let record = state
        .ledger
        .deposit(user.account_id(), payload.amount)
        .await?;
    Ok(Json(record))
}

/// POST /account/transfer - Send home currency to another account.
async fn transfer<B: Backend>(
    State(state): State<AppState<B>>,
    user: AuthUser,
    Json(payload): Json<TransferRequest>,
) -> Result<Json<TransferReceipt>, ApiError> {
    let receipt = state
        .ledger
        .transfer(user.account_id(), payload.recipient_id, payload.amount)
        .await?;
    Ok(Json(receipt))
}

/// POST /account/convert/quote - Preview a conversion at the current rate.
async fn quote_conversion<B: Backend>(
    State(state): State<AppState<B>>,
    _user: AuthUser,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<ConversionQuote>, ApiError> {
    let amount = validate_amount(payload.amount)?;
    let quote = state
        .rates
        .quote_conversion(payload.from, payload.to, amount)
        .await?;
    Ok(Json(quote))
}

/// POST /account/convert - Convert between two of the account's balances.
async fn convert<B: Backend>(
    State(state): State<AppState<B>>,
    user: AuthUser,
    Json(payload): Json<ConvertRequest>,
) -> Result<Json<ConversionReceipt>, ApiError> {
    let rate = match payload.rate {
        Some(rate) => rate,
        None => {
            validate_amount(payload.amount)?;
            state.rates.resolve(payload.from, payload.to).await?.rate
        }
    };

    let receipt = state
        .ledger
        .convert_currency(
            user.account_id(),
            payload.from,
            payload.to,
            payload.amount,
            rate,
        )
        .await?;
    Ok(Json(receipt))
}
