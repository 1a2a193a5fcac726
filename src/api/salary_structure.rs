use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::error::PayrollError;
use crate::model::salary_structure::{SalaryStructure, StructureLineDetail};
use crate::payroll::calculator::{gross_salary, net_salary};
use crate::payroll::structure::{
    self, NewSalaryStructure, activate_salary_structure, structure_lines,
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct StructureQuery {
    /// Filter on the active flag; omit for all structures
    pub is_active: Option<bool>,
}

/// A structure with its lines and the structure-level computed figures.
#[derive(Serialize, ToSchema)]
pub struct StructureDetailResponse {
    pub structure: SalaryStructure,
    pub lines: Vec<StructureLineDetail>,

    #[schema(example = "42000.00", value_type = String)]
    pub gross_salary: Decimal,

    #[schema(example = "38500.00", value_type = String)]
    pub net_salary: Decimal,
}

/// Create Salary Structure
#[utoipa::path(
    post,
    path = "/api/employees/{employee_id}/salary-structures",
    params(
        ("employee_id", description = "Employee business code")
    ),
    request_body = NewSalaryStructure,
    responses(
        (status = 201, description = "Structure created and activated", body = SalaryStructure),
        (status = 404, description = "Employee not found"),
        (status = 422, description = "Validation failed, field-keyed errors returned")
    ),
    tag = "SalaryStructure"
)]
pub async fn create_salary_structure(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    payload: web::Json<NewSalaryStructure>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let structure =
        structure::create_salary_structure(pool.get_ref(), &employee_id, &payload).await?;
    Ok(HttpResponse::Created().json(structure))
}

/// List Salary Structures, newest effective date first
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}/salary-structures",
    params(
        ("employee_id", description = "Employee business code"),
        StructureQuery
    ),
    responses(
        (status = 200, description = "Structures for the employee", body = [SalaryStructure]),
        (status = 404, description = "Employee not found")
    ),
    tag = "SalaryStructure"
)]
pub async fn list_salary_structures(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    query: web::Query<StructureQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee_pk: i64 = sqlx::query_scalar("SELECT id FROM employees WHERE employee_id = ?")
        .bind(&employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(PayrollError::from)?
        .ok_or_else(|| PayrollError::EmployeeNotFound(employee_id.clone()))?;

    let structures = match query.is_active {
        Some(is_active) => {
            sqlx::query_as::<_, SalaryStructure>(
                "SELECT * FROM salary_structures \
                 WHERE employee_id = ? AND is_active = ? \
                 ORDER BY effective_date DESC",
            )
            .bind(employee_pk)
            .bind(is_active)
            .fetch_all(pool.get_ref())
            .await
        }
        None => {
            sqlx::query_as::<_, SalaryStructure>(
                "SELECT * FROM salary_structures \
                 WHERE employee_id = ? \
                 ORDER BY effective_date DESC",
            )
            .bind(employee_pk)
            .fetch_all(pool.get_ref())
            .await
        }
    }
    .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(structures))
}

/// Get Salary Structure with its lines and computed gross/net
#[utoipa::path(
    get,
    path = "/api/salary-structures/{id}",
    params(
        ("id", description = "Salary structure ID")
    ),
    responses(
        (status = 200, description = "Structure found", body = StructureDetailResponse),
        (status = 404, description = "Structure not found")
    ),
    tag = "SalaryStructure"
)]
pub async fn get_salary_structure(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let structure_id = path.into_inner();

    let structure =
        sqlx::query_as::<_, SalaryStructure>("SELECT * FROM salary_structures WHERE id = ?")
            .bind(structure_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    let structure = match structure {
        Some(s) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Salary structure not found"
            })));
        }
    };

    let lines = structure_lines(pool.get_ref(), structure.id)
        .await
        .map_err(PayrollError::from)?;
    let gross = gross_salary(structure.basic_pay, &lines);
    let net = net_salary(structure.basic_pay, &lines);

    Ok(HttpResponse::Ok().json(StructureDetailResponse {
        structure,
        lines,
        gross_salary: gross,
        net_salary: net,
    }))
}

/// Activate Salary Structure, superseding the employee's other structures
#[utoipa::path(
    post,
    path = "/api/salary-structures/{id}/activate",
    params(
        ("id", description = "Salary structure ID")
    ),
    responses(
        (status = 200, description = "Structure activated"),
        (status = 404, description = "Structure not found")
    ),
    tag = "SalaryStructure"
)]
pub async fn activate(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let structure_id = path.into_inner();
    activate_salary_structure(pool.get_ref(), structure_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary structure activated"
    })))
}
