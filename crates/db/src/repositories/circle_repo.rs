//! Repository for the `circles` table.

use sqlx::PgPool;

use crate::models::circle::{Circle, CreateCircle};

const COLUMNS: &str = "id, name, client_id, created_at";

pub struct CircleRepo;

impl CircleRepo {
    pub async fn create(pool: &PgPool, input: &CreateCircle) -> Result<Circle, sqlx::Error> {
        let query = format!(
            "INSERT INTO circles (name, client_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Circle>(&query)
            .bind(input.name.trim())
            .bind(input.client_id)
            .fetch_one(pool)
            .await
    }
}
