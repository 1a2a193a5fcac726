//! Salary structure creation and supersession. The one-active-per-employee
//! invariant is enforced inside a single transaction by
//! [`activate_and_supersede`], never as a hidden side effect of unrelated
//! writes.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::PayrollError;
use crate::model::salary_structure::{SalaryStructure, StructureLineDetail};

/// Submitted amount for one component, keyed by component id rather than by
/// per-request form field names.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ComponentAmount {
    #[schema(example = 1)]
    pub salary_component_id: i64,

    /// Raw submitted value; unparseable amounts fall back to zero
    #[schema(example = "5000")]
    pub amount: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewSalaryStructure {
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub effective_date: String,

    #[schema(example = "2024-12-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<String>,

    #[schema(example = "30000")]
    pub basic_pay: String,

    pub description: Option<String>,

    #[serde(default)]
    pub components: Vec<ComponentAmount>,
}

struct ValidatedStructure {
    effective_date: NaiveDate,
    end_date: Option<NaiveDate>,
    basic_pay: Decimal,
    description: Option<String>,
    lines: Vec<(i64, Decimal)>,
}

fn validate(
    input: &NewSalaryStructure,
    known_component_ids: &[i64],
) -> Result<ValidatedStructure, PayrollError> {
    let mut errors = BTreeMap::new();

    let effective_date = match NaiveDate::parse_from_str(&input.effective_date, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(_) => {
            errors.insert("effective_date".to_string(), "Invalid date.".to_string());
            None
        }
    };

    let mut end_date = None;
    if let Some(raw) = input.end_date.as_deref().filter(|s| !s.trim().is_empty()) {
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(d) => {
                if let Some(effective) = effective_date {
                    if d < effective {
                        errors.insert(
                            "end_date".to_string(),
                            "End date must be after effective date.".to_string(),
                        );
                    }
                }
                end_date = Some(d);
            }
            Err(_) => {
                errors.insert("end_date".to_string(), "Invalid date.".to_string());
            }
        }
    }

    let basic_pay = match input.basic_pay.trim().parse::<Decimal>() {
        Ok(v) if v < Decimal::ZERO => {
            errors.insert("basic_pay".to_string(), "Must be positive.".to_string());
            None
        }
        Ok(v) => Some(v),
        Err(_) => {
            errors.insert("basic_pay".to_string(), "Invalid number.".to_string());
            None
        }
    };

    let mut lines = Vec::with_capacity(input.components.len());
    for submitted in &input.components {
        if !known_component_ids.contains(&submitted.salary_component_id) {
            errors.insert(
                "components".to_string(),
                format!(
                    "Unknown salary component id {}",
                    submitted.salary_component_id
                ),
            );
            continue;
        }
        let amount = submitted
            .amount
            .trim()
            .parse::<Decimal>()
            .unwrap_or(Decimal::ZERO);
        lines.push((submitted.salary_component_id, amount));
    }

    match (effective_date, basic_pay) {
        (Some(effective_date), Some(basic_pay)) if errors.is_empty() => Ok(ValidatedStructure {
            effective_date,
            end_date,
            basic_pay,
            description: input.description.clone(),
            lines,
        }),
        _ => Err(PayrollError::Validation(errors)),
    }
}

/// Deactivates every other structure of the employee, excluding
/// `structure_id` itself. Returns the number of superseded rows.
pub async fn activate_and_supersede(
    tx: &mut Transaction<'_, Sqlite>,
    employee_pk: i64,
    structure_id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE salary_structures SET is_active = 0, updated_at = ? \
         WHERE employee_id = ? AND is_active = 1 AND id <> ?",
    )
    .bind(Utc::now())
    .bind(employee_pk)
    .bind(structure_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Validates the submitted structure, then in one transaction: end-dates the
/// superseded actives (end = new effective - 1 day, kept if the prior end
/// date is already earlier), inserts the new structure active, and inserts
/// its lines. Nothing is written on validation failure.
pub async fn create_salary_structure(
    pool: &SqlitePool,
    employee_id: &str,
    input: &NewSalaryStructure,
) -> Result<SalaryStructure, PayrollError> {
    let employee_pk: i64 = sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))?;

    let known_component_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM salary_components")
        .fetch_all(pool)
        .await?;

    let validated = validate(input, &known_component_ids)?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let superseded_end = validated.effective_date - Duration::days(1);
    sqlx::query(
        "UPDATE salary_structures SET end_date = ?, is_active = 0, updated_at = ? \
         WHERE employee_id = ? AND is_active = 1 AND (end_date IS NULL OR end_date > ?)",
    )
    .bind(superseded_end)
    .bind(now)
    .bind(employee_pk)
    .bind(validated.effective_date)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query(
        "INSERT INTO salary_structures \
         (employee_id, effective_date, end_date, basic_pay, is_active, description, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 1, ?, ?, ?)",
    )
    .bind(employee_pk)
    .bind(validated.effective_date)
    .bind(validated.end_date)
    .bind(validated.basic_pay.round_dp(2).to_string())
    .bind(&validated.description)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    let structure_id = result.last_insert_rowid();

    activate_and_supersede(&mut tx, employee_pk, structure_id).await?;

    for (component_id, amount) in &validated.lines {
        sqlx::query(
            "INSERT INTO salary_structure_lines \
             (salary_structure_id, salary_component_id, amount, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(structure_id)
        .bind(component_id)
        .bind(amount.round_dp(2).to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!(employee_id, structure_id, "Created salary structure");

    let structure =
        sqlx::query_as::<_, SalaryStructure>("SELECT * FROM salary_structures WHERE id = ?")
            .bind(structure_id)
            .fetch_one(pool)
            .await?;
    Ok(structure)
}

/// Re-activates an existing structure and supersedes its siblings in the
/// same transaction. Re-activating the already-active structure is a no-op.
pub async fn activate_salary_structure(
    pool: &SqlitePool,
    structure_id: i64,
) -> Result<(), PayrollError> {
    let mut tx = pool.begin().await?;

    let employee_pk: i64 =
        sqlx::query_scalar("SELECT employee_id FROM salary_structures WHERE id = ?")
            .bind(structure_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(PayrollError::NotFound("Salary structure"))?;

    sqlx::query("UPDATE salary_structures SET is_active = 1, updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(structure_id)
        .execute(&mut *tx)
        .await?;

    let superseded = activate_and_supersede(&mut tx, employee_pk, structure_id).await?;
    tx.commit().await?;
    debug!(structure_id, superseded, "Activated salary structure");

    Ok(())
}

/// The employee's current active structure, if any.
pub async fn active_structure(
    pool: &SqlitePool,
    employee_pk: i64,
) -> Result<Option<SalaryStructure>, sqlx::Error> {
    sqlx::query_as::<_, SalaryStructure>(
        "SELECT * FROM salary_structures \
         WHERE employee_id = ? AND is_active = 1 \
         ORDER BY effective_date DESC LIMIT 1",
    )
    .bind(employee_pk)
    .fetch_optional(pool)
    .await
}

/// Lines joined with their components, in insertion order.
pub async fn structure_lines(
    pool: &SqlitePool,
    structure_id: i64,
) -> Result<Vec<StructureLineDetail>, sqlx::Error> {
    sqlx::query_as::<_, StructureLineDetail>(
        "SELECT l.id AS line_id, l.salary_component_id, c.code, c.name, \
                c.component_type, c.is_percentage, l.amount \
         FROM salary_structure_lines l \
         JOIN salary_components c ON c.id = l.salary_component_id \
         WHERE l.salary_structure_id = ? \
         ORDER BY l.id",
    )
    .bind(structure_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::payroll::testutil::{seed_component, seed_employee};
    use rust_decimal_macros::dec;

    fn new_structure(effective: &str, basic: &str) -> NewSalaryStructure {
        NewSalaryStructure {
            effective_date: effective.to_string(),
            end_date: None,
            basic_pay: basic.to_string(),
            description: None,
            components: Vec::new(),
        }
    }

    #[actix_web::test]
    async fn exactly_one_active_structure_after_successive_creates() {
        let pool = init_test_db().await;
        let employee_pk = seed_employee(&pool, "EMP-001", "John Doe").await;

        let first = create_salary_structure(&pool, "EMP-001", &new_structure("2023-01-01", "25000"))
            .await
            .expect("first structure");
        let second =
            create_salary_structure(&pool, "EMP-001", &new_structure("2024-01-01", "30000"))
                .await
                .expect("second structure");

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM salary_structures WHERE employee_id = ? AND is_active = 1",
        )
        .bind(employee_pk)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(active_count, 1);

        let active = active_structure(&pool, employee_pk).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        assert_eq!(active.basic_pay, dec!(30000.00));

        // superseded structure is end-dated to the day before the new one
        let old = sqlx::query_as::<_, SalaryStructure>(
            "SELECT * FROM salary_structures WHERE id = ?",
        )
        .bind(first.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(!old.is_active);
        assert_eq!(
            old.end_date,
            Some(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap())
        );
    }

    #[actix_web::test]
    async fn earlier_end_date_is_not_overwritten_on_supersession() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;

        let mut first = new_structure("2023-01-01", "25000");
        first.end_date = Some("2023-06-30".to_string());
        let first = create_salary_structure(&pool, "EMP-001", &first)
            .await
            .expect("first structure");

        create_salary_structure(&pool, "EMP-001", &new_structure("2024-01-01", "30000"))
            .await
            .expect("second structure");

        let old = sqlx::query_as::<_, SalaryStructure>(
            "SELECT * FROM salary_structures WHERE id = ?",
        )
        .bind(first.id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(!old.is_active);
        assert_eq!(
            old.end_date,
            Some(NaiveDate::from_ymd_opt(2023, 6, 30).unwrap())
        );
    }

    #[actix_web::test]
    async fn end_date_before_effective_date_persists_nothing() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;
        let hra = seed_component(&pool, "HRA", "HRA", "earning", false).await;

        let mut input = new_structure("2024-01-01", "30000");
        input.end_date = Some("2023-12-01".to_string());
        input.components = vec![ComponentAmount {
            salary_component_id: hra,
            amount: "5000".to_string(),
        }];

        let err = create_salary_structure(&pool, "EMP-001", &input)
            .await
            .expect_err("validation should fail");
        match err {
            PayrollError::Validation(errors) => {
                assert_eq!(
                    errors.get("end_date").map(String::as_str),
                    Some("End date must be after effective date.")
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let structures: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salary_structures")
            .fetch_one(&pool)
            .await
            .unwrap();
        let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM salary_structure_lines")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((structures, lines), (0, 0));
    }

    #[actix_web::test]
    async fn bad_basic_pay_and_dates_report_per_field() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;

        let mut input = new_structure("not-a-date", "abc");
        input.end_date = Some("also-bad".to_string());

        let err = create_salary_structure(&pool, "EMP-001", &input)
            .await
            .expect_err("validation should fail");
        match err {
            PayrollError::Validation(errors) => {
                assert_eq!(errors.get("effective_date").map(String::as_str), Some("Invalid date."));
                assert_eq!(errors.get("end_date").map(String::as_str), Some("Invalid date."));
                assert_eq!(errors.get("basic_pay").map(String::as_str), Some("Invalid number."));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn negative_basic_pay_is_rejected() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;

        let err = create_salary_structure(&pool, "EMP-001", &new_structure("2024-01-01", "-1"))
            .await
            .expect_err("validation should fail");
        match err {
            PayrollError::Validation(errors) => {
                assert_eq!(errors.get("basic_pay").map(String::as_str), Some("Must be positive."));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn unknown_component_id_is_rejected() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;

        let mut input = new_structure("2024-01-01", "30000");
        input.components = vec![ComponentAmount {
            salary_component_id: 999,
            amount: "5000".to_string(),
        }];

        let err = create_salary_structure(&pool, "EMP-001", &input)
            .await
            .expect_err("validation should fail");
        match err {
            PayrollError::Validation(errors) => assert!(errors.contains_key("components")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[actix_web::test]
    async fn unparseable_component_amount_defaults_to_zero() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;
        let hra = seed_component(&pool, "HRA", "HRA", "earning", false).await;

        let mut input = new_structure("2024-01-01", "30000");
        input.components = vec![ComponentAmount {
            salary_component_id: hra,
            amount: "oops".to_string(),
        }];

        let structure = create_salary_structure(&pool, "EMP-001", &input)
            .await
            .expect("structure");

        let lines = structure_lines(&pool, structure.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount, dec!(0.00));
    }

    #[actix_web::test]
    async fn reactivation_is_idempotent_and_exclusive() {
        let pool = init_test_db().await;
        let employee_pk = seed_employee(&pool, "EMP-001", "John Doe").await;

        let first = create_salary_structure(&pool, "EMP-001", &new_structure("2023-01-01", "25000"))
            .await
            .unwrap();
        let second =
            create_salary_structure(&pool, "EMP-001", &new_structure("2024-01-01", "30000"))
                .await
                .unwrap();

        // flip back to the old structure, twice
        activate_salary_structure(&pool, first.id).await.unwrap();
        activate_salary_structure(&pool, first.id).await.unwrap();

        let active = active_structure(&pool, employee_pk).await.unwrap().unwrap();
        assert_eq!(active.id, first.id);

        let active_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM salary_structures WHERE employee_id = ? AND is_active = 1",
        )
        .bind(employee_pk)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(active_count, 1);

        let _ = second;
    }

    #[actix_web::test]
    async fn unknown_employee_is_a_not_found() {
        let pool = init_test_db().await;

        let err = create_salary_structure(&pool, "GHOST", &new_structure("2024-01-01", "30000"))
            .await
            .expect_err("missing employee");
        assert!(matches!(err, PayrollError::EmployeeNotFound(_)));
    }
}
