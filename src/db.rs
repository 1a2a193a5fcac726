use anyhow::Result;
use sqlx::{Sqlite, SqlitePool, migrate::MigrateDatabase};

pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        Sqlite::create_database(database_url).await?;
    }

    let pool = SqlitePool::connect(database_url).await?;
    setup_schema(&pool).await?;

    Ok(pool)
}

/// One statement per table; `CREATE TABLE IF NOT EXISTS` keeps restarts
/// idempotent. The composite UNIQUE constraints are the store-level side of
/// the duplicate-period and duplicate-account rules.
async fn setup_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            is_active BOOLEAN NOT NULL DEFAULT 1
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bank_accounts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
            bank_name TEXT NOT NULL,
            account_number TEXT NOT NULL,
            ifsc_code TEXT NOT NULL,
            branch_name TEXT NOT NULL,
            is_primary BOOLEAN NOT NULL DEFAULT 0,
            UNIQUE (employee_id, account_number)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_components (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT NOT NULL UNIQUE,
            component_type TEXT NOT NULL,
            is_percentage BOOLEAN NOT NULL DEFAULT 0,
            value TEXT,
            description TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_structures (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
            effective_date TEXT NOT NULL,
            end_date TEXT,
            basic_pay TEXT NOT NULL DEFAULT '0',
            is_active BOOLEAN NOT NULL DEFAULT 1,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS salary_structure_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            salary_structure_id INTEGER NOT NULL REFERENCES salary_structures(id) ON DELETE CASCADE,
            salary_component_id INTEGER NOT NULL REFERENCES salary_components(id) ON DELETE CASCADE,
            amount TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (salary_structure_id, salary_component_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_salaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
            salary_structure_id INTEGER REFERENCES salary_structures(id) ON DELETE SET NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            gross_amount TEXT NOT NULL,
            net_amount TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE (employee_id, month, year)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_salary_lines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            monthly_salary_id INTEGER NOT NULL REFERENCES monthly_salaries(id) ON DELETE CASCADE,
            salary_component_id INTEGER NOT NULL REFERENCES salary_components(id) ON DELETE CASCADE,
            amount TEXT NOT NULL,
            UNIQUE (monthly_salary_id, salary_component_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Fresh uniquely-named in-memory database per test.
#[cfg(test)]
pub async fn init_test_db() -> SqlitePool {
    let test_id = uuid::Uuid::new_v4();
    let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

    init_db(&db_url).await.expect("Failed to create test database")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn schema_creates_all_tables() {
        let pool = init_test_db().await;

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&pool)
        .await
        .expect("Failed to list tables");

        for expected in [
            "employees",
            "bank_accounts",
            "salary_components",
            "salary_structures",
            "salary_structure_lines",
            "monthly_salaries",
            "monthly_salary_lines",
        ] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
    }

    #[actix_web::test]
    async fn employee_code_is_unique() {
        let pool = init_test_db().await;

        sqlx::query("INSERT INTO employees (employee_id, name) VALUES ('EMP-001', 'John')")
            .execute(&pool)
            .await
            .expect("first insert");

        let dup = sqlx::query("INSERT INTO employees (employee_id, name) VALUES ('EMP-001', 'Jane')")
            .execute(&pool)
            .await;

        match dup {
            Err(sqlx::Error::Database(db)) => assert!(db.is_unique_violation()),
            other => panic!("expected unique violation, got {other:?}"),
        }
    }
}
