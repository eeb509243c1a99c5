//! Repository for the `clusters` table.

use sqlx::PgPool;

use crate::models::cluster::{Cluster, CreateCluster};

const COLUMNS: &str = "id, name, circle_id, created_at";

pub struct ClusterRepo;

impl ClusterRepo {
    pub async fn create(pool: &PgPool, input: &CreateCluster) -> Result<Cluster, sqlx::Error> {
        let query = format!(
            "INSERT INTO clusters (name, circle_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cluster>(&query)
            .bind(input.name.trim())
            .bind(input.circle_id)
            .fetch_one(pool)
            .await
    }
}
