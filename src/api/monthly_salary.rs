use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::PayrollError;
use crate::model::monthly_salary::MonthlySalary;
use crate::payroll::generator::{self, MonthlySalaryBreakdown, salary_lines};

/// Month and year arrive as raw strings and are validated by the generator
/// before any lookup.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateMonthlySalary {
    #[schema(example = "3")]
    pub month: String,

    #[schema(example = "2024")]
    pub year: String,
}

/// Generate Monthly Salary
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/monthly-salaries",
    params(
        ("employee_id", description = "Employee business code")
    ),
    request_body = GenerateMonthlySalary,
    responses(
        (status = 201, description = "Monthly salary generated", body = MonthlySalaryBreakdown),
        (status = 400, description = "Month or year is not a valid integer"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Salary already generated for this period"),
        (status = 422, description = "No active salary structure")
    ),
    tag = "MonthlySalary"
)]
pub async fn generate_monthly_salary(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<GenerateMonthlySalary>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let breakdown = generator::generate_monthly_salary(
        pool.get_ref(),
        &employee_id,
        &payload.month,
        &payload.year,
    )
    .await?;
    Ok(HttpResponse::Created().json(breakdown))
}

/// List Monthly Salaries, newest period first
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/monthly-salaries",
    params(
        ("employee_id", description = "Employee business code")
    ),
    responses(
        (status = 200, description = "Monthly salaries for the employee", body = [MonthlySalary]),
        (status = 404, description = "Employee not found")
    ),
    tag = "MonthlySalary"
)]
pub async fn list_monthly_salaries(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee_pk: i64 = sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = ?")
        .bind(&employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(PayrollError::from)?
        .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.clone()))?;

    let salaries = sqlx::query_as::<_, MonthlySalary>(
        "SELECT * FROM monthly_salaries \
         WHERE employee_id = ? \
         ORDER BY year DESC, month DESC",
    )
    .bind(employee_pk)
    .fetch_all(pool.get_ref())
    .await
    .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(salaries))
}

/// Get Monthly Salary with its line breakdown
#[utoipa::path(
    get,
    path = "/api/monthly-salaries/{id}",
    params(
        ("id", description = "Monthly salary ID")
    ),
    responses(
        (status = 200, description = "Monthly salary found", body = MonthlySalaryBreakdown),
        (status = 404, description = "Monthly salary not found")
    ),
    tag = "MonthlySalary"
)]
pub async fn get_monthly_salary(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let salary_id = path.into_inner();

    let salary =
        sqlx::query_as::<_, MonthlySalary>("SELECT * FROM monthly_salaries WHERE id = ?")
            .bind(salary_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    let salary = match salary {
        Some(s) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Monthly salary not found"
            })));
        }
    };

    let lines = salary_lines(pool.get_ref(), salary.id)
        .await
        .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(MonthlySalaryBreakdown { salary, lines }))
}
