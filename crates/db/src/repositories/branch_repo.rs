//! Repository for the `branches` table.

use sqlx::PgPool;

use crate::models::branch::{Branch, BranchDetail, CreateBranch};

const COLUMNS: &str = "id, sol_id, branch_name, cluster_id, created_at";

pub struct BranchRepo;

impl BranchRepo {
    pub async fn create(pool: &PgPool, input: &CreateBranch) -> Result<Branch, sqlx::Error> {
        let query = format!(
            "INSERT INTO branches (sol_id, branch_name, cluster_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branch>(&query)
            .bind(input.sol_id.trim())
            .bind(input.branch_name.trim())
            .bind(input.cluster_id)
            .fetch_one(pool)
            .await
    }

    /// Every branch with its cluster, circle and client names resolved.
    pub async fn list_details(pool: &PgPool) -> Result<Vec<BranchDetail>, sqlx::Error> {
        sqlx::query_as::<_, BranchDetail>(
            "SELECT b.id, b.sol_id, b.branch_name,
                    cl.name AS cluster, ci.name AS circle, c.name AS client
             FROM branches b
             JOIN clusters cl ON cl.id = b.cluster_id
             JOIN circles ci ON ci.id = cl.circle_id
             JOIN clients c ON c.id = ci.client_id
             ORDER BY b.branch_name, b.sol_id",
        )
        .fetch_all(pool)
        .await
    }
}
