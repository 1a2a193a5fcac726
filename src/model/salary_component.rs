use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::prelude::FromRow;
use sqlx::sqlite::SqliteRow;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use super::opt_decimal_column;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ComponentType {
    Earning,
    Deduction,
}

/// Reusable earning/deduction definition shared across salary structures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "House Rent Allowance",
        "code": "HRA",
        "component_type": "earning",
        "is_percentage": true,
        "value": "40",
        "description": "40% of basic"
    })
)]
pub struct SalaryComponent {
    pub id: i64,

    #[schema(example = "House Rent Allowance")]
    pub name: String,

    #[schema(example = "HRA")]
    pub code: String,

    #[schema(example = "earning")]
    pub component_type: ComponentType,

    /// When set, line amounts are percentages of basic rather than absolute
    pub is_percentage: bool,

    #[schema(example = "40", value_type = Option<String>)]
    pub value: Option<Decimal>,

    pub description: Option<String>,
}

impl FromRow<'_, SqliteRow> for SalaryComponent {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let component_type: String = row.try_get("component_type")?;
        let component_type = component_type.parse::<ComponentType>().map_err(|e| {
            sqlx::Error::ColumnDecode {
                index: "component_type".to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            code: row.try_get("code")?,
            component_type,
            is_percentage: row.try_get("is_percentage")?,
            value: opt_decimal_column(row, "value")?,
            description: row.try_get("description")?,
        })
    }
}
