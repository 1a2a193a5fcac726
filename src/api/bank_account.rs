use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::PayrollError;
use crate::model::bank_account::BankAccount;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBankAccount {
    #[schema(example = "State Bank")]
    pub bank_name: String,

    #[schema(example = "000123456789")]
    pub account_number: String,

    #[schema(example = "SBIN0001234")]
    pub ifsc_code: String,

    #[schema(example = "Main Branch")]
    pub branch_name: String,

    #[serde(default)]
    pub is_primary: bool,
}

/// Inserts the account and, when it is marked primary, clears any prior
/// primary for the employee in the same transaction. Duplicate account
/// numbers per employee surface as a store uniqueness conflict.
pub async fn save_bank_account(
    pool: &SqlitePool,
    employee_pk: i64,
    input: &CreateBankAccount,
) -> Result<BankAccount, PayrollError> {
    let mut tx = pool.begin().await?;

    if input.is_primary {
        sqlx::query("UPDATE bank_accounts SET is_primary = 0 WHERE employee_id = ? AND is_primary = 1")
            .bind(employee_pk)
            .execute(&mut *tx)
            .await?;
    }

    let result = sqlx::query(
        "INSERT INTO bank_accounts \
         (employee_id, bank_name, account_number, ifsc_code, branch_name, is_primary) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(employee_pk)
    .bind(&input.bank_name)
    .bind(&input.account_number)
    .bind(&input.ifsc_code)
    .bind(&input.branch_name)
    .bind(input.is_primary)
    .execute(&mut *tx)
    .await?;
    let account_id = result.last_insert_rowid();

    tx.commit().await?;
    debug!(employee_pk, account_id, "Saved bank account");

    let account =
        sqlx::query_as::<_, BankAccount>("SELECT * FROM bank_accounts WHERE id = ?")
            .bind(account_id)
            .fetch_one(pool)
            .await?;
    Ok(account)
}

async fn employee_pk(pool: &SqlitePool, employee_id: &str) -> Result<i64, PayrollError> {
    sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))
}

/// Add Bank Account
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/bank-accounts",
    params(
        ("employee_id", description = "Employee business code")
    ),
    request_body = CreateBankAccount,
    responses(
        (status = 201, description = "Bank account created", body = BankAccount),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Duplicate account number for this employee")
    ),
    tag = "BankAccount"
)]
pub async fn create_bank_account(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<CreateBankAccount>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let pk = employee_pk(pool.get_ref(), &employee_id).await?;
    let account = save_bank_account(pool.get_ref(), pk, &payload).await?;
    Ok(HttpResponse::Created().json(account))
}

/// List Bank Accounts
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/bank-accounts",
    params(
        ("employee_id", description = "Employee business code")
    ),
    responses(
        (status = 200, description = "Bank accounts for the employee", body = [BankAccount]),
        (status = 404, description = "Employee not found")
    ),
    tag = "BankAccount"
)]
pub async fn list_bank_accounts(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let pk = employee_pk(pool.get_ref(), &employee_id).await?;

    let accounts = sqlx::query_as::<_, BankAccount>(
        "SELECT * FROM bank_accounts WHERE employee_id = ? ORDER BY is_primary DESC, id",
    )
    .bind(pk)
    .fetch_all(pool.get_ref())
    .await
    .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(accounts))
}
