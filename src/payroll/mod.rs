pub mod calculator;
pub mod generator;
pub mod structure;

#[cfg(test)]
pub(crate) mod testutil {
    use sqlx::SqlitePool;

    pub async fn seed_employee(pool: &SqlitePool, code: &str, name: &str) -> i64 {
        sqlx::query("INSERT INTO employees (employee_id, name) VALUES (?, ?)")
            .bind(code)
            .bind(name)
            .execute(pool)
            .await
            .expect("seed employee")
            .last_insert_rowid()
    }

    pub async fn seed_component(
        pool: &SqlitePool,
        name: &str,
        code: &str,
        component_type: &str,
        is_percentage: bool,
    ) -> i64 {
        sqlx::query(
            "INSERT INTO salary_components (name, code, component_type, is_percentage) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(code)
        .bind(component_type)
        .bind(is_percentage)
        .execute(pool)
        .await
        .expect("seed component")
        .last_insert_rowid()
    }
}
