use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::error::PayrollError;
use crate::model::employee::Employee;
use crate::model::salary_structure::{SalaryStructure, StructureLineDetail};
use crate::payroll::calculator::{gross_salary, net_salary};
use crate::payroll::structure::{active_structure, structure_lines};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "John Doe")]
    pub name: String,

    #[serde(default = "default_active")]
    #[schema(example = true)]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 20)]
    pub per_page: Option<u32>,

    pub is_active: Option<bool>,

    /// Search by employee code or name
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,

    #[schema(example = 1)]
    pub page: u32,

    #[schema(example = 20)]
    pub per_page: u32,

    #[schema(example = 10)]
    pub total: i64,
}

/// Employee with their current active structure and its computed
/// structure-level gross/net figures.
#[derive(Serialize, ToSchema)]
pub struct EmployeeDetailResponse {
    pub employee: Employee,
    pub active_structure: Option<SalaryStructure>,
    pub lines: Vec<StructureLineDetail>,

    #[schema(example = "42000.00", value_type = Option<String>)]
    pub gross_salary: Option<Decimal>,

    #[schema(example = "38500.00", value_type = Option<String>)]
    pub net_salary: Option<Decimal>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    #[schema(example = "John Doe")]
    pub name: Option<String>,

    #[schema(example = false)]
    pub is_active: Option<bool>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Bool(bool),
    Str(&'a str),
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Duplicate employee code")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query("INSERT INTO employees (employee_id, name, is_active) VALUES (?, ?, ?)")
        .bind(&payload.employee_id)
        .bind(&payload.name)
        .bind(payload.is_active)
        .execute(pool.get_ref())
        .await
        .map_err(PayrollError::from)?;

    let employee =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    debug!(employee_id = %payload.employee_id, "Created employee");
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let like = query.search.as_ref().map(|s| format!("%{}%", s));

    let mut conditions = Vec::new();
    let mut bindings = Vec::new();

    if let Some(is_active) = query.is_active {
        conditions.push("is_active = ?");
        bindings.push(FilterValue::Bool(is_active));
    }

    if let Some(like) = &like {
        conditions.push("(employee_id LIKE ? OR name LIKE ?)");
        bindings.push(FilterValue::Str(like));
        bindings.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::Bool(v) => count_query.bind(*v),
            FilterValue::Str(v) => count_query.bind(*v),
        };
    }
    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        ErrorInternalServerError("Database error")
    })?;

    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::Bool(v) => data_query.bind(*v),
            FilterValue::Str(v) => data_query.bind(*v),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Employee detail with the active structure's computed gross/net
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", description = "Employee business code")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDetailResponse),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE employee_id = ?")
            .bind(&employee_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    let employee = match employee {
        Some(e) => e,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let active = active_structure(pool.get_ref(), employee.id)
        .await
        .map_err(PayrollError::from)?;

    let (lines, gross, net) = match &active {
        Some(structure) => {
            let lines = structure_lines(pool.get_ref(), structure.id)
                .await
                .map_err(PayrollError::from)?;
            let gross = gross_salary(structure.basic_pay, &lines);
            let net = net_salary(structure.basic_pay, &lines);
            (lines, Some(gross), Some(net))
        }
        None => (Vec::new(), None, None),
    };

    Ok(HttpResponse::Ok().json(EmployeeDetailResponse {
        employee,
        active_structure: active,
        lines,
        gross_salary: gross,
        net_salary: net,
    }))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", description = "Employee business code")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
    body: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let current =
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE employee_id = ?")
            .bind(&employee_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let name = body.name.clone().unwrap_or(current.name);
    let is_active = body.is_active.unwrap_or(current.is_active);

    sqlx::query("UPDATE employees SET name = ?, is_active = ? WHERE id = ?")
        .bind(&name)
        .bind(is_active)
        .bind(current.id)
        .execute(pool.get_ref())
        .await
        .map_err(PayrollError::from)?;

    let updated = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(current.id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id", description = "Employee business code")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE employee_id = ?")
        .bind(&employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(PayrollError::from)?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
