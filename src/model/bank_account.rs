use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "bank_name": "State Bank",
        "account_number": "000123456789",
        "ifsc_code": "SBIN0001234",
        "branch_name": "Main Branch",
        "is_primary": true
    })
)]
pub struct BankAccount {
    pub id: i64,

    /// Owning employee primary key
    pub employee_id: i64,

    #[schema(example = "State Bank")]
    pub bank_name: String,

    #[schema(example = "000123456789")]
    pub account_number: String,

    #[schema(example = "SBIN0001234")]
    pub ifsc_code: String,

    #[schema(example = "Main Branch")]
    pub branch_name: String,

    pub is_primary: bool,
}
