//! Monthly salary generation: reads the employee's active structure,
//! resolves every line, and persists the MonthlySalary plus its line
//! breakdown in one transaction.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::PayrollError;
use crate::model::monthly_salary::{MonthlySalary, MonthlySalaryLine};
use crate::model::salary_component::ComponentType;
use crate::payroll::calculator::resolve_amount;
use crate::payroll::structure::{active_structure, structure_lines};

/// A generated monthly salary together with its resolved line breakdown.
#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlySalaryBreakdown {
    pub salary: MonthlySalary,
    pub lines: Vec<MonthlySalaryLine>,
}

/// Month and year arrive as raw strings; both must parse before any
/// structure lookup happens.
fn parse_period(month_raw: &str, year_raw: &str) -> Result<(u32, u32), PayrollError> {
    let month: u32 = month_raw.trim().parse().map_err(|_| {
        PayrollError::InvalidInput(format!("Month must be an integer, got {month_raw:?}"))
    })?;
    let year: u32 = year_raw.trim().parse().map_err(|_| {
        PayrollError::InvalidInput(format!("Year must be an integer, got {year_raw:?}"))
    })?;
    if !(1..=12).contains(&month) {
        return Err(PayrollError::InvalidInput(format!(
            "Month must be between 1 and 12, got {month}"
        )));
    }
    Ok((month, year))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub async fn generate_monthly_salary(
    pool: &SqlitePool,
    employee_id: &str,
    month_raw: &str,
    year_raw: &str,
) -> Result<MonthlySalaryBreakdown, PayrollError> {
    let (month, year) = parse_period(month_raw, year_raw)?;

    let employee_pk: i64 = sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.to_string()))?;

    let structure = active_structure(pool, employee_pk)
        .await?
        .ok_or_else(|| PayrollError::NoActiveStructure(employee_id.to_string()))?;

    let lines = structure_lines(pool, structure.id).await?;

    // The "basic" line anchors the percentage components; a structure
    // without one resolves percentages against zero.
    let basic_salary = lines
        .iter()
        .find(|line| line.name.trim().eq_ignore_ascii_case("basic"))
        .map(|line| line.amount)
        .unwrap_or(Decimal::ZERO);

    let mut gross = Decimal::ZERO;
    let mut deductions = Decimal::ZERO;
    let mut resolved = Vec::with_capacity(lines.len());
    for line in &lines {
        let amount = resolve_amount(basic_salary, line);
        match line.component_type {
            ComponentType::Earning => gross += amount,
            ComponentType::Deduction => deductions += amount,
        }
        resolved.push((line.salary_component_id, amount));
    }
    let net = gross - deductions;

    let now = Utc::now();
    let mut tx = pool.begin().await?;

    let insert = sqlx::query(
        "INSERT INTO monthly_salaries \
         (employee_id, salary_structure_id, month, year, gross_amount, net_amount, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(employee_pk)
    .bind(structure.id)
    .bind(month)
    .bind(year)
    .bind(gross.round_dp(2).to_string())
    .bind(net.round_dp(2).to_string())
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await;

    let salary_id = match insert {
        Ok(result) => result.last_insert_rowid(),
        Err(e) if is_unique_violation(&e) => {
            return Err(PayrollError::DuplicatePeriod { month, year });
        }
        Err(e) => return Err(e.into()),
    };

    for (component_id, amount) in &resolved {
        sqlx::query(
            "INSERT INTO monthly_salary_lines (monthly_salary_id, salary_component_id, amount) \
             VALUES (?, ?, ?)",
        )
        .bind(salary_id)
        .bind(component_id)
        .bind(amount.round_dp(2).to_string())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!(employee_id, month, year, salary_id, "Generated monthly salary");

    let salary = sqlx::query_as::<_, MonthlySalary>("SELECT * FROM monthly_salaries WHERE id = ?")
        .bind(salary_id)
        .fetch_one(pool)
        .await?;
    let lines = salary_lines(pool, salary_id).await?;
    Ok(MonthlySalaryBreakdown { salary, lines })
}

/// Line breakdown of a generated monthly salary, in insertion order.
pub async fn salary_lines(
    pool: &SqlitePool,
    monthly_salary_id: i64,
) -> Result<Vec<MonthlySalaryLine>, sqlx::Error> {
    sqlx::query_as::<_, MonthlySalaryLine>(
        "SELECT * FROM monthly_salary_lines WHERE monthly_salary_id = ? ORDER BY id",
    )
    .bind(monthly_salary_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::payroll::structure::{
        ComponentAmount, NewSalaryStructure, create_salary_structure,
    };
    use crate::payroll::testutil::{seed_component, seed_employee};
    use rust_decimal_macros::dec;

    async fn seed_structure(
        pool: &SqlitePool,
        employee_id: &str,
        basic_pay: &str,
        components: Vec<ComponentAmount>,
    ) {
        let input = NewSalaryStructure {
            effective_date: "2024-01-01".to_string(),
            end_date: None,
            basic_pay: basic_pay.to_string(),
            description: None,
            components,
        };
        create_salary_structure(pool, employee_id, &input)
            .await
            .expect("seed structure");
    }

    #[actix_web::test]
    async fn generates_resolved_breakdown_with_basic_line() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;
        let basic = seed_component(&pool, "Basic", "BASIC", "earning", false).await;
        let hra = seed_component(&pool, "HRA", "HRA", "earning", true).await;
        let tax = seed_component(&pool, "Tax", "TAX", "deduction", true).await;

        seed_structure(
            &pool,
            "EMP-001",
            "30000",
            vec![
                ComponentAmount { salary_component_id: basic, amount: "30000".to_string() },
                ComponentAmount { salary_component_id: hra, amount: "40".to_string() },
                ComponentAmount { salary_component_id: tax, amount: "10".to_string() },
            ],
        )
        .await;

        let breakdown = generate_monthly_salary(&pool, "EMP-001", "3", "2024")
            .await
            .expect("generation");

        // basic 30000 + HRA 40% of basic; tax 10% of basic deducted
        assert_eq!(breakdown.salary.gross_amount, dec!(42000.00));
        assert_eq!(breakdown.salary.net_amount, dec!(39000.00));
        assert_eq!(breakdown.salary.month, 3);
        assert_eq!(breakdown.salary.year, 2024);
        assert_eq!(breakdown.lines.len(), 3);

        let resolved_hra = breakdown
            .lines
            .iter()
            .find(|l| l.salary_component_id == hra)
            .unwrap();
        assert_eq!(resolved_hra.amount, dec!(12000.00));
        let resolved_tax = breakdown
            .lines
            .iter()
            .find(|l| l.salary_component_id == tax)
            .unwrap();
        assert_eq!(resolved_tax.amount, dec!(3000.00));
    }

    #[actix_web::test]
    async fn missing_basic_line_falls_back_to_zero() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;
        let hra = seed_component(&pool, "HRA", "HRA", "earning", false).await;
        let tax = seed_component(&pool, "Tax", "TAX", "deduction", true).await;

        seed_structure(
            &pool,
            "EMP-001",
            "30000",
            vec![
                ComponentAmount { salary_component_id: hra, amount: "5000".to_string() },
                ComponentAmount { salary_component_id: tax, amount: "10".to_string() },
            ],
        )
        .await;

        let breakdown = generate_monthly_salary(&pool, "EMP-001", "3", "2024")
            .await
            .expect("generation");

        // no "basic" line: percentages resolve against zero
        assert_eq!(breakdown.salary.gross_amount, dec!(5000.00));
        assert_eq!(breakdown.salary.net_amount, dec!(5000.00));
    }

    #[actix_web::test]
    async fn second_generation_for_same_period_is_a_duplicate() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;
        let basic = seed_component(&pool, "Basic", "BASIC", "earning", false).await;

        seed_structure(
            &pool,
            "EMP-001",
            "30000",
            vec![ComponentAmount { salary_component_id: basic, amount: "30000".to_string() }],
        )
        .await;

        generate_monthly_salary(&pool, "EMP-001", "3", "2024")
            .await
            .expect("first generation");

        let err = generate_monthly_salary(&pool, "EMP-001", "3", "2024")
            .await
            .expect_err("second generation");
        assert!(matches!(err, PayrollError::DuplicatePeriod { month: 3, year: 2024 }));

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM monthly_salaries WHERE month = 3 AND year = 2024",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }

    #[actix_web::test]
    async fn every_structure_line_appears_exactly_once_in_breakdown() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;
        let basic = seed_component(&pool, "Basic", "BASIC", "earning", false).await;
        let hra = seed_component(&pool, "HRA", "HRA", "earning", true).await;
        let conv = seed_component(&pool, "Conveyance", "CONV", "earning", false).await;
        let pf = seed_component(&pool, "Provident Fund", "PF", "deduction", true).await;

        seed_structure(
            &pool,
            "EMP-001",
            "50000",
            vec![
                ComponentAmount { salary_component_id: basic, amount: "50000".to_string() },
                ComponentAmount { salary_component_id: hra, amount: "10".to_string() },
                ComponentAmount { salary_component_id: conv, amount: "2000".to_string() },
                ComponentAmount { salary_component_id: pf, amount: "12".to_string() },
            ],
        )
        .await;

        let breakdown = generate_monthly_salary(&pool, "EMP-001", "6", "2024")
            .await
            .expect("generation");

        for component_id in [basic, hra, conv, pf] {
            let matching: Vec<_> = breakdown
                .lines
                .iter()
                .filter(|l| l.salary_component_id == component_id)
                .collect();
            assert_eq!(matching.len(), 1, "component {component_id} must appear once");
        }

        // resolved, not raw, amounts are persisted
        let resolved_hra = breakdown
            .lines
            .iter()
            .find(|l| l.salary_component_id == hra)
            .unwrap();
        assert_eq!(resolved_hra.amount, dec!(5000.00));
        let fixed_conv = breakdown
            .lines
            .iter()
            .find(|l| l.salary_component_id == conv)
            .unwrap();
        assert_eq!(fixed_conv.amount, dec!(2000.00));
    }

    #[actix_web::test]
    async fn no_active_structure_blocks_generation() {
        let pool = init_test_db().await;
        seed_employee(&pool, "EMP-001", "John Doe").await;

        let err = generate_monthly_salary(&pool, "EMP-001", "3", "2024")
            .await
            .expect_err("no structure");
        assert!(matches!(err, PayrollError::NoActiveStructure(_)));
    }

    #[actix_web::test]
    async fn invalid_month_or_year_fails_before_any_lookup() {
        let pool = init_test_db().await;

        // unknown employee on purpose: parsing must fail first
        let err = generate_monthly_salary(&pool, "GHOST", "march", "2024")
            .await
            .expect_err("bad month");
        assert!(matches!(err, PayrollError::InvalidInput(_)));

        let err = generate_monthly_salary(&pool, "GHOST", "13", "2024")
            .await
            .expect_err("out of range month");
        assert!(matches!(err, PayrollError::InvalidInput(_)));

        let err = generate_monthly_salary(&pool, "GHOST", "3", "two-thousand")
            .await
            .expect_err("bad year");
        assert!(matches!(err, PayrollError::InvalidInput(_)));
    }

    #[actix_web::test]
    async fn unknown_employee_is_a_not_found() {
        let pool = init_test_db().await;

        let err = generate_monthly_salary(&pool, "GHOST", "3", "2024")
            .await
            .expect_err("missing employee");
        assert!(matches!(err, PayrollError::EmployeeNotFound(_)));
    }
}
