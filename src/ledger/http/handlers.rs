use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use semval::Validate;
use tracing::error;

use crate::{
    database::SqliteConnection,
    http_err::{ApiError, ApiResponse, ErrorRep},
    ledger::{
        commands::{
            sqlite::SqliteCommands, CatalogCommands, CatalogError, TransactionCommands,
            TransactionError,
        },
        domain::{
            accounts::Account,
            categories::{Category, CategoryDraft},
            credit_cards::{CreditCard, CreditCardDraft},
            interchange,
            reports::ReportQuery,
            settings::NotificationSettings,
            tags::{Tag, TagDraft},
            transactions::{Transaction, TransactionDraft, TransactionPatch},
        },
        queries::{sqlite::SqliteQueries, CatalogQueries, TransactionQueries},
        services::LedgerService,
    },
    server::AppState,
};

use super::reps;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(get_accounts))
        .route("/accounts/:account_id", put(update_account_balance))
        .route("/categories", get(get_categories).post(create_category))
        .route(
            "/categories/:category_id",
            put(update_category).delete(delete_category),
        )
        .route(
            "/credit-cards",
            get(get_credit_cards).post(create_credit_card),
        )
        .route(
            "/credit-cards/:card_id",
            put(update_credit_card).delete(delete_credit_card),
        )
        .route("/reports/cash-flow", get(get_cash_flow))
        .route("/reports/categories", get(get_category_breakdown))
        .route("/reports/credit-cards", get(get_credit_card_breakdown))
        .route("/reports/summary", get(get_summary))
        .route("/reports/tags", get(get_tag_breakdown))
        .route("/reports/transactions", get(get_report))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/tags", get(get_tags).post(create_tag))
        .route("/tags/:tag_id", put(update_tag).delete(delete_tag))
        .route(
            "/transactions",
            get(get_transactions).post(create_transaction),
        )
        .route("/transactions/export", get(export_transactions))
        .route("/transactions/import", post(import_transactions))
        .route(
            "/transactions/:transaction_id",
            put(update_transaction).delete(delete_transaction),
        )
}

async fn get_transactions(
    State(db): State<SqliteConnection>,
) -> ApiResponse<Json<Vec<Transaction>>> {
    let queries = SqliteQueries(db);

    match queries.list_transactions().await {
        Ok(transactions) => Ok(Json(transactions)),
        Err(error) => {
            error!(?error, "Failed to list transactions.");

            Err(ApiError::InternalServerError)
        }
    }
}

pub enum CreateTransactionResponse {
    Created(reps::Success),
    BadRequest(reps::TransactionValidationError),
}

impl IntoResponse for CreateTransactionResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Created(body) => (StatusCode::CREATED, Json(body)).into_response(),
            Self::BadRequest(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        }
    }
}

async fn create_transaction(
    State(db): State<SqliteConnection>,
    Json(draft): Json<TransactionDraft>,
) -> ApiResponse<CreateTransactionResponse> {
    if let Err(validation) = draft.validate() {
        return Ok(CreateTransactionResponse::BadRequest(validation.into()));
    }

    let commands = SqliteCommands(&db);

    match commands.add_transaction(draft).await {
        Ok(_) => Ok(CreateTransactionResponse::Created(reps::Success::default())),
        Err(TransactionError::UnknownAccount(account_id)) => Err(ApiError::BadRequestReason(
            format!("No account found with id {account_id}."),
        )),
        Err(error) => {
            error!(?error, "Failed to persist transaction.");

            Err(ApiError::InternalServerError)
        }
    }
}

pub enum UpdateTransactionResponse {
    Updated(reps::Success),
    BadRequest(reps::TransactionValidationError),
    NotFound(ErrorRep),
}

impl IntoResponse for UpdateTransactionResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Updated(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::BadRequest(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::NotFound(error) => (StatusCode::NOT_FOUND, Json(error)).into_response(),
        }
    }
}

async fn update_transaction(
    State(db): State<SqliteConnection>,
    Path(transaction_id): Path<String>,
    Json(patch): Json<TransactionPatch>,
) -> ApiResponse<UpdateTransactionResponse> {
    if let Err(validation) = patch.validate() {
        return Ok(UpdateTransactionResponse::BadRequest(validation.into()));
    }

    let commands = SqliteCommands(&db);

    match commands.update_transaction(&transaction_id, patch).await {
        Ok(_) => Ok(UpdateTransactionResponse::Updated(reps::Success::default())),
        Err(TransactionError::TransactionNotFound) => {
            Ok(UpdateTransactionResponse::NotFound(ErrorRep {
                message: "No transaction found with the provided id.".to_owned(),
            }))
        }
        Err(TransactionError::UnknownAccount(account_id)) => Err(ApiError::BadRequestReason(
            format!("No account found with id {account_id}."),
        )),
        Err(error) => {
            error!(?error, %transaction_id, "Failed to update transaction.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_transaction(
    State(db): State<SqliteConnection>,
    Path(transaction_id): Path<String>,
) -> ApiResponse<Json<reps::Success>> {
    let commands = SqliteCommands(&db);

    match commands.delete_transaction(&transaction_id).await {
        Ok(()) => Ok(Json(reps::Success::default())),
        Err(TransactionError::TransactionNotFound) => Err(ApiError::NotFound(
            "No transaction found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %transaction_id, "Failed to delete transaction.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn export_transactions(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<([(header::HeaderName, &'static str); 1], String)> {
    match ledger_service.export_csv().await {
        Ok(csv) => Ok(([(header::CONTENT_TYPE, "text/csv")], csv)),
        Err(error) => {
            error!(?error, "Failed to export transactions.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn import_transactions(
    State(db): State<SqliteConnection>,
    body: String,
) -> ApiResponse<Json<reps::Success>> {
    let drafts = match interchange::from_csv(&body) {
        Ok(drafts) => drafts,
        Err(error) => return Err(ApiError::BadRequestReason(error.to_string())),
    };

    for draft in &drafts {
        if draft.validate().is_err() {
            return Err(ApiError::BadRequestReason(
                "The file contains an invalid transaction.".to_owned(),
            ));
        }
    }

    let commands = SqliteCommands(&db);

    match commands.import_transactions(drafts).await {
        Ok(_) => Ok(Json(reps::Success::default())),
        Err(TransactionError::UnknownAccount(account_id)) => Err(ApiError::BadRequestReason(
            format!("No account found with id {account_id}."),
        )),
        Err(error) => {
            error!(?error, "Failed to import transactions.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_accounts(State(db): State<SqliteConnection>) -> ApiResponse<Json<Vec<Account>>> {
    let queries = SqliteQueries(db);

    match queries.list_accounts().await {
        Ok(accounts) => Ok(Json(accounts)),
        Err(error) => {
            error!(?error, "Failed to list accounts.");

            Err(ApiError::InternalServerError)
        }
    }
}

#[derive(serde::Deserialize)]
struct AccountBalanceUpdate {
    balance: f64,
}

async fn update_account_balance(
    State(db): State<SqliteConnection>,
    Path(account_id): Path<String>,
    Json(update): Json<AccountBalanceUpdate>,
) -> ApiResponse<Json<reps::Success>> {
    if !update.balance.is_finite() {
        return Err(ApiError::BadRequestReason(
            "The balance must be a finite number.".to_owned(),
        ));
    }

    let commands = SqliteCommands(&db);

    match commands
        .set_account_balance(&account_id, update.balance)
        .await
    {
        Ok(()) => Ok(Json(reps::Success::default())),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(
            "No account found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %account_id, "Failed to update account balance.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_categories(State(db): State<SqliteConnection>) -> ApiResponse<Json<Vec<Category>>> {
    let queries = SqliteQueries(db);

    match queries.list_categories().await {
        Ok(categories) => Ok(Json(categories)),
        Err(error) => {
            error!(?error, "Failed to list categories.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_category(
    State(db): State<SqliteConnection>,
    Json(draft): Json<CategoryDraft>,
) -> ApiResponse<(StatusCode, Json<Category>)> {
    let commands = SqliteCommands(&db);

    match commands.add_category(draft).await {
        Ok(category) => Ok((StatusCode::CREATED, Json(category))),
        Err(error) => {
            error!(?error, "Failed to persist category.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn update_category(
    State(db): State<SqliteConnection>,
    Path(category_id): Path<String>,
    Json(draft): Json<CategoryDraft>,
) -> ApiResponse<Json<Category>> {
    let commands = SqliteCommands(&db);

    match commands.update_category(&category_id, draft).await {
        Ok(category) => Ok(Json(category)),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(
            "No category found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %category_id, "Failed to update category.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_category(
    State(db): State<SqliteConnection>,
    Path(category_id): Path<String>,
) -> ApiResponse<Json<reps::Success>> {
    let commands = SqliteCommands(&db);

    match commands.delete_category(&category_id).await {
        Ok(()) => Ok(Json(reps::Success::default())),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(
            "No category found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %category_id, "Failed to delete category.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_credit_cards(
    State(db): State<SqliteConnection>,
) -> ApiResponse<Json<Vec<CreditCard>>> {
    let queries = SqliteQueries(db);

    match queries.list_credit_cards().await {
        Ok(cards) => Ok(Json(cards)),
        Err(error) => {
            error!(?error, "Failed to list credit cards.");

            Err(ApiError::InternalServerError)
        }
    }
}

pub enum CreateCreditCardResponse {
    Created(CreditCard),
    BadRequest(reps::CreditCardValidationError),
}

impl IntoResponse for CreateCreditCardResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Created(card) => (StatusCode::CREATED, Json(card)).into_response(),
            Self::BadRequest(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        }
    }
}

async fn create_credit_card(
    State(db): State<SqliteConnection>,
    Json(draft): Json<CreditCardDraft>,
) -> ApiResponse<CreateCreditCardResponse> {
    if let Err(validation) = draft.validate() {
        return Ok(CreateCreditCardResponse::BadRequest(validation.into()));
    }

    let commands = SqliteCommands(&db);

    match commands.add_credit_card(draft).await {
        Ok(card) => Ok(CreateCreditCardResponse::Created(card)),
        Err(error) => {
            error!(?error, "Failed to persist credit card.");

            Err(ApiError::InternalServerError)
        }
    }
}

pub enum UpdateCreditCardResponse {
    Updated(CreditCard),
    BadRequest(reps::CreditCardValidationError),
    NotFound(ErrorRep),
}

impl IntoResponse for UpdateCreditCardResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Updated(card) => (StatusCode::OK, Json(card)).into_response(),
            Self::BadRequest(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Self::NotFound(error) => (StatusCode::NOT_FOUND, Json(error)).into_response(),
        }
    }
}

async fn update_credit_card(
    State(db): State<SqliteConnection>,
    Path(card_id): Path<String>,
    Json(draft): Json<CreditCardDraft>,
) -> ApiResponse<UpdateCreditCardResponse> {
    if let Err(validation) = draft.validate() {
        return Ok(UpdateCreditCardResponse::BadRequest(validation.into()));
    }

    let commands = SqliteCommands(&db);

    match commands.update_credit_card(&card_id, draft).await {
        Ok(card) => Ok(UpdateCreditCardResponse::Updated(card)),
        Err(CatalogError::NotFound) => Ok(UpdateCreditCardResponse::NotFound(ErrorRep {
            message: "No credit card found with the provided id.".to_owned(),
        })),
        Err(error) => {
            error!(?error, %card_id, "Failed to update credit card.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_credit_card(
    State(db): State<SqliteConnection>,
    Path(card_id): Path<String>,
) -> ApiResponse<Json<reps::Success>> {
    let commands = SqliteCommands(&db);

    match commands.delete_credit_card(&card_id).await {
        Ok(()) => Ok(Json(reps::Success::default())),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(
            "No credit card found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %card_id, "Failed to delete credit card.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_tags(State(db): State<SqliteConnection>) -> ApiResponse<Json<Vec<Tag>>> {
    let queries = SqliteQueries(db);

    match queries.list_tags().await {
        Ok(tags) => Ok(Json(tags)),
        Err(error) => {
            error!(?error, "Failed to list tags.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn create_tag(
    State(db): State<SqliteConnection>,
    Json(draft): Json<TagDraft>,
) -> ApiResponse<(StatusCode, Json<Tag>)> {
    let commands = SqliteCommands(&db);

    match commands.add_tag(draft).await {
        Ok(tag) => Ok((StatusCode::CREATED, Json(tag))),
        Err(error) => {
            error!(?error, "Failed to persist tag.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn update_tag(
    State(db): State<SqliteConnection>,
    Path(tag_id): Path<String>,
    Json(draft): Json<TagDraft>,
) -> ApiResponse<Json<Tag>> {
    let commands = SqliteCommands(&db);

    match commands.update_tag(&tag_id, draft).await {
        Ok(tag) => Ok(Json(tag)),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(
            "No tag found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %tag_id, "Failed to update tag.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn delete_tag(
    State(db): State<SqliteConnection>,
    Path(tag_id): Path<String>,
) -> ApiResponse<Json<reps::Success>> {
    let commands = SqliteCommands(&db);

    match commands.delete_tag(&tag_id).await {
        Ok(()) => Ok(Json(reps::Success::default())),
        Err(CatalogError::NotFound) => Err(ApiError::NotFound(
            "No tag found with the provided id.".to_owned(),
        )),
        Err(error) => {
            error!(?error, %tag_id, "Failed to delete tag.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_settings(
    State(db): State<SqliteConnection>,
) -> ApiResponse<Json<NotificationSettings>> {
    let queries = SqliteQueries(db);

    match queries.load_settings().await {
        Ok(settings) => Ok(Json(settings)),
        Err(error) => {
            error!(?error, "Failed to load notification settings.");

            Err(ApiError::InternalServerError)
        }
    }
}

pub enum UpdateSettingsResponse {
    Updated(reps::Success),
    BadRequest(reps::SettingsValidationError),
}

impl IntoResponse for UpdateSettingsResponse {
    fn into_response(self) -> axum::response::Response {
        match self {
            Self::Updated(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::BadRequest(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        }
    }
}

async fn update_settings(
    State(db): State<SqliteConnection>,
    Json(settings): Json<NotificationSettings>,
) -> ApiResponse<UpdateSettingsResponse> {
    if let Err(validation) = settings.validate() {
        return Ok(UpdateSettingsResponse::BadRequest(validation.into()));
    }

    let commands = SqliteCommands(&db);

    match commands.save_settings(settings).await {
        Ok(()) => Ok(UpdateSettingsResponse::Updated(reps::Success::default())),
        Err(error) => {
            error!(?error, "Failed to save notification settings.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_summary(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Json<reps::Summary>> {
    match ledger_service.summary().await {
        Ok(summary) => Ok(Json(summary.into())),
        Err(error) => {
            error!(?error, "Failed to build ledger summary.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_category_breakdown(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Json<Vec<reps::BreakdownSlice>>> {
    match ledger_service.category_breakdown().await {
        Ok(breakdown) => Ok(Json(breakdown.into_iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to build category breakdown.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_tag_breakdown(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Json<Vec<reps::BreakdownSlice>>> {
    match ledger_service.tag_breakdown().await {
        Ok(breakdown) => Ok(Json(breakdown.into_iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to build tag breakdown.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_credit_card_breakdown(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Json<Vec<reps::BreakdownSlice>>> {
    match ledger_service.credit_card_breakdown().await {
        Ok(breakdown) => Ok(Json(breakdown.into_iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to build credit card breakdown.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_cash_flow(
    State(ledger_service): State<LedgerService>,
) -> ApiResponse<Json<Vec<reps::CashFlowPoint>>> {
    match ledger_service.cash_flow().await {
        Ok(series) => Ok(Json(series.into_iter().map(Into::into).collect())),
        Err(error) => {
            error!(?error, "Failed to build cash flow series.");

            Err(ApiError::InternalServerError)
        }
    }
}

async fn get_report(
    State(ledger_service): State<LedgerService>,
    Query(query): Query<ReportQuery>,
) -> ApiResponse<Json<reps::FilteredReport>> {
    if query.end_date < query.start_date {
        return Err(ApiError::BadRequestReason(
            "The end date may not precede the start date.".to_owned(),
        ));
    }

    match ledger_service.report(query).await {
        Ok(report) => Ok(Json(report.into())),
        Err(error) => {
            error!(?error, "Failed to build transaction report.");

            Err(ApiError::InternalServerError)
        }
    }
}
