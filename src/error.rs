use std::collections::BTreeMap;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Domain errors for the payroll workflows. Every failure is terminal for
/// the current request; nothing is retried.
#[derive(Debug, Error)]
pub enum PayrollError {
    /// Field-keyed messages, re-shown to the caller without any writes
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Employee {0} not found")]
    EmployeeNotFound(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("No active salary structure for employee {0}")]
    NoActiveStructure(String),

    #[error("Monthly salary already generated for {month}/{year}")]
    DuplicatePeriod { month: u32, year: u32 },

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl PayrollError {
    pub fn validation(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.to_string());
        Self::Validation(errors)
    }

    fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Database(sqlx::Error::Database(db)) if db.is_unique_violation())
    }
}

impl actix_web::ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::NoActiveStructure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::EmployeeNotFound(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicatePeriod { .. } => StatusCode::CONFLICT,
            Self::Database(_) if self.is_unique_violation() => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::Validation(errors) => json!({
                "message": "Validation failed",
                "errors": errors,
            }),
            Self::Database(_) if self.is_unique_violation() => json!({
                "message": "Duplicate record"
            }),
            Self::Database(e) => {
                error!(error = %e, "Database error");
                json!({ "message": "Internal Server Error" })
            }
            other => json!({ "message": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
