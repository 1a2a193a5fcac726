use actix_web::{HttpResponse, Responder, web};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::ToSchema;

use crate::error::PayrollError;
use crate::model::salary_component::{ComponentType, SalaryComponent};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateComponent {
    #[schema(example = "House Rent Allowance")]
    pub name: String,

    #[schema(example = "HRA")]
    pub code: String,

    #[schema(example = "earning")]
    pub component_type: ComponentType,

    #[serde(default)]
    pub is_percentage: bool,

    /// Optional default value, submitted as a decimal string
    #[schema(example = "40", value_type = Option<String>)]
    pub value: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComponent {
    pub name: Option<String>,
    pub component_type: Option<ComponentType>,
    pub is_percentage: Option<bool>,
    #[schema(value_type = Option<String>)]
    pub value: Option<String>,
    pub description: Option<String>,
}

fn parse_value(raw: Option<&str>) -> Result<Option<Decimal>, PayrollError> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| PayrollError::validation("value", "Invalid number.")),
    }
}

/// Create Salary Component
#[utoipa::path(
    post,
    path = "/api/components",
    request_body = CreateComponent,
    responses(
        (status = 201, description = "Component created", body = SalaryComponent),
        (status = 409, description = "Duplicate component code"),
        (status = 422, description = "Validation failed")
    ),
    tag = "SalaryComponent"
)]
pub async fn create_component(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateComponent>,
) -> actix_web::Result<impl Responder> {
    let value = parse_value(payload.value.as_deref())?;

    let result = sqlx::query(
        "INSERT INTO salary_components (name, code, component_type, is_percentage, value, description) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&payload.name)
    .bind(&payload.code)
    .bind(payload.component_type.to_string())
    .bind(payload.is_percentage)
    .bind(value.map(|v| v.round_dp(2).to_string()))
    .bind(&payload.description)
    .execute(pool.get_ref())
    .await
    .map_err(PayrollError::from)?;

    let component =
        sqlx::query_as::<_, SalaryComponent>("SELECT * FROM salary_components WHERE id = ?")
            .bind(result.last_insert_rowid())
            .fetch_one(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    debug!(code = %payload.code, "Created salary component");
    Ok(HttpResponse::Created().json(component))
}

/// List Salary Components
#[utoipa::path(
    get,
    path = "/api/components",
    responses(
        (status = 200, description = "All components", body = [SalaryComponent])
    ),
    tag = "SalaryComponent"
)]
pub async fn list_components(pool: web::Data<SqlitePool>) -> actix_web::Result<impl Responder> {
    let components =
        sqlx::query_as::<_, SalaryComponent>("SELECT * FROM salary_components ORDER BY code")
            .fetch_all(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(components))
}

/// Get Salary Component by ID
#[utoipa::path(
    get,
    path = "/api/components/{id}",
    params(
        ("id", description = "Component ID")
    ),
    responses(
        (status = 200, description = "Component found", body = SalaryComponent),
        (status = 404, description = "Component not found")
    ),
    tag = "SalaryComponent"
)]
pub async fn get_component(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let component_id = path.into_inner();

    let component =
        sqlx::query_as::<_, SalaryComponent>("SELECT * FROM salary_components WHERE id = ?")
            .bind(component_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    match component {
        Some(c) => Ok(HttpResponse::Ok().json(c)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Component not found"
        }))),
    }
}

/// Update Salary Component
#[utoipa::path(
    put,
    path = "/api/components/{id}",
    params(
        ("id", description = "Component ID")
    ),
    request_body = UpdateComponent,
    responses(
        (status = 200, description = "Component updated", body = SalaryComponent),
        (status = 404, description = "Component not found")
    ),
    tag = "SalaryComponent"
)]
pub async fn update_component(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    body: web::Json<UpdateComponent>,
) -> actix_web::Result<impl Responder> {
    let component_id = path.into_inner();

    let current =
        sqlx::query_as::<_, SalaryComponent>("SELECT * FROM salary_components WHERE id = ?")
            .bind(component_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Component not found"
            })));
        }
    };

    let name = body.name.clone().unwrap_or(current.name);
    let component_type = body.component_type.unwrap_or(current.component_type);
    let is_percentage = body.is_percentage.unwrap_or(current.is_percentage);
    let value = match body.value.as_deref() {
        Some(raw) => parse_value(Some(raw))?,
        None => current.value,
    };
    let description = body.description.clone().or(current.description);

    sqlx::query(
        "UPDATE salary_components \
         SET name = ?, component_type = ?, is_percentage = ?, value = ?, description = ? \
         WHERE id = ?",
    )
    .bind(&name)
    .bind(component_type.to_string())
    .bind(is_percentage)
    .bind(value.map(|v| v.round_dp(2).to_string()))
    .bind(&description)
    .bind(component_id)
    .execute(pool.get_ref())
    .await
    .map_err(PayrollError::from)?;

    let updated =
        sqlx::query_as::<_, SalaryComponent>("SELECT * FROM salary_components WHERE id = ?")
            .bind(component_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(PayrollError::from)?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Salary Component
#[utoipa::path(
    delete,
    path = "/api/components/{id}",
    params(
        ("id", description = "Component ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Component not found")
    ),
    tag = "SalaryComponent"
)]
pub async fn delete_component(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let component_id = path.into_inner();

    let result = sqlx::query("DELETE FROM salary_components WHERE id = ?")
        .bind(component_id)
        .execute(pool.get_ref())
        .await
        .map_err(PayrollError::from)?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Component not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
