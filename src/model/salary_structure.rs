use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::prelude::FromRow;
use sqlx::sqlite::SqliteRow;
use utoipa::ToSchema;

use super::decimal_column;
use super::salary_component::ComponentType;

/// Versioned per-employee salary definition. At most one is active per
/// employee at any time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "effective_date": "2024-01-01",
        "end_date": null,
        "basic_pay": "30000.00",
        "is_active": true,
        "description": null,
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    })
)]
pub struct SalaryStructure {
    pub id: i64,

    /// Owning employee primary key
    pub employee_id: i64,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub effective_date: NaiveDate,

    #[schema(example = "2024-12-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,

    #[schema(example = "30000.00", value_type = String)]
    pub basic_pay: Decimal,

    pub is_active: bool,

    pub description: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

impl FromRow<'_, SqliteRow> for SalaryStructure {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            effective_date: row.try_get("effective_date")?,
            end_date: row.try_get("end_date")?,
            basic_pay: decimal_column(row, "basic_pay")?,
            is_active: row.try_get("is_active")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// A structure line joined with its component, as the calculator consumes it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StructureLineDetail {
    pub line_id: i64,
    pub salary_component_id: i64,

    #[schema(example = "HRA")]
    pub code: String,

    #[schema(example = "House Rent Allowance")]
    pub name: String,

    pub component_type: ComponentType,

    pub is_percentage: bool,

    #[schema(example = "5000.00", value_type = String)]
    pub amount: Decimal,
}

impl FromRow<'_, SqliteRow> for StructureLineDetail {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let component_type: String = row.try_get("component_type")?;
        let component_type = component_type.parse::<ComponentType>().map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "component_type".to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(Self {
            line_id: row.try_get("line_id")?,
            salary_component_id: row.try_get("salary_component_id")?,
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            component_type,
            is_percentage: row.try_get("is_percentage")?,
            amount: decimal_column(row, "amount")?,
        })
    }
}
