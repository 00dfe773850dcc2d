use utoipa::OpenApi;

use super::handlers;
use super::types::{
    AccountResponseData, DepositRequest, EmailTransferRequest, ResolveRequest, TransactionData,
    TransferRequest, TransferResponseData,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "corebank API",
        description = "Account ledger and transfer engine",
    ),
    paths(
        handlers::create_transfer,
        handlers::create_deposit,
        handlers::send_money,
        handlers::resolve_transfer,
        handlers::get_account,
        handlers::get_account_by_number,
        handlers::get_account_transactions,
        handlers::health,
    ),
    components(schemas(
        TransferRequest,
        DepositRequest,
        EmailTransferRequest,
        ResolveRequest,
        TransferResponseData,
        AccountResponseData,
        TransactionData,
    )),
    tags(
        (name = "transfers", description = "Money movement operations"),
        (name = "accounts", description = "Account details and history"),
        (name = "ops", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;
