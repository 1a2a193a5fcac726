pub mod bank_account;
pub mod employee;
pub mod monthly_salary;
pub mod salary_component;
pub mod salary_structure;

use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

/// Money columns are stored as TEXT; decode them into fixed-point decimals.
pub(crate) fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    raw.parse::<Decimal>()
        .map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

pub(crate) fn opt_decimal_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let raw: Option<String> = row.try_get(column)?;
    raw.map(|s| {
        s.parse::<Decimal>().map_err(|e| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use rust_decimal_macros::dec;

    #[actix_web::test]
    async fn decodes_text_amounts_into_decimals() {
        let pool = init_test_db().await;

        let row = sqlx::query("SELECT '12.34' AS amount, NULL AS value")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(decimal_column(&row, "amount").unwrap(), dec!(12.34));
        assert_eq!(opt_decimal_column(&row, "value").unwrap(), None);
        assert_eq!(
            opt_decimal_column(&row, "amount").unwrap(),
            Some(dec!(12.34))
        );
    }

    #[actix_web::test]
    async fn malformed_amount_text_is_a_column_decode_error() {
        let pool = init_test_db().await;

        let row = sqlx::query("SELECT 'oops' AS amount")
            .fetch_one(&pool)
            .await
            .unwrap();

        match decimal_column(&row, "amount") {
            Err(sqlx::Error::ColumnDecode { index, .. }) => assert_eq!(index, "amount"),
            other => panic!("expected column decode error, got {other:?}"),
        }
    }
}
