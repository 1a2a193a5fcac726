use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::prelude::FromRow;
use sqlx::sqlite::SqliteRow;
use utoipa::ToSchema;

use super::decimal_column;

/// Immutable snapshot of one generated pay period. Generated once per
/// (employee, month, year); never updated afterwards.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "salary_structure_id": 1,
        "month": 3,
        "year": 2024,
        "gross_amount": "42000.00",
        "net_amount": "38500.00",
        "created_at": "2024-03-31T00:00:00Z",
        "updated_at": "2024-03-31T00:00:00Z"
    })
)]
pub struct MonthlySalary {
    pub id: i64,

    /// Owning employee primary key
    pub employee_id: i64,

    /// Nulled by the store if the source structure is later deleted
    pub salary_structure_id: Option<i64>,

    #[schema(example = 3, minimum = 1, maximum = 12)]
    pub month: u32,

    #[schema(example = 2024)]
    pub year: u32,

    #[schema(example = "42000.00", value_type = String)]
    pub gross_amount: Decimal,

    #[schema(example = "38500.00", value_type = String)]
    pub net_amount: Decimal,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for MonthlySalary {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            salary_structure_id: row.try_get("salary_structure_id")?,
            month: row.try_get("month")?,
            year: row.try_get("year")?,
            gross_amount: decimal_column(row, "gross_amount")?,
            net_amount: decimal_column(row, "net_amount")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Resolved amount for one component within a generated monthly salary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MonthlySalaryLine {
    pub id: i64,
    pub monthly_salary_id: i64,
    pub salary_component_id: i64,

    /// Amount after applying the percentage-of-basic rule, not the raw
    /// structure-line amount
    #[schema(example = "3000.00", value_type = String)]
    pub amount: Decimal,
}

impl FromRow<'_, SqliteRow> for MonthlySalaryLine {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            monthly_salary_id: row.try_get("monthly_salary_id")?,
            salary_component_id: row.try_get("salary_component_id")?,
            amount: decimal_column(row, "amount")?,
        })
    }
}
