//! Repository for the `trip_legs` table.

use chrono::NaiveDate;
use fleetlog_core::trip::{PlannedLeg, PreparedTrip};
use sqlx::{PgExecutor, PgPool};

use crate::models::trip_leg::{SavedTrip, TripLeg};

const COLUMNS: &str = "id, data_entry_date, vehicle_id, activity_date, trip_id, \
                       custodian_name, driver_name, branch_name, sol_id, cluster, circle, client, \
                       trip_retrieval_count, trip_fresh_pickup_count, trip_return_retrieval_count, \
                       trip_empty_boxes_delivered_count, trip_opening_kms, trip_closing_kms, \
                       trip_kms, remarks, trip_branch_count, branch_kms, transaction_id, created_at";

pub struct TripLegRepo;

impl TripLegRepo {
    /// Number of legs already stored under `trip_id`.
    pub async fn count_by_trip<'e, E>(executor: E, trip_id: &str) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM trip_legs WHERE trip_id = $1")
            .bind(trip_id)
            .fetch_one(executor)
            .await
    }

    /// Insert fully planned legs in a single statement.
    pub async fn insert_batch<'e, E>(
        executor: E,
        legs: &[PlannedLeg],
    ) -> Result<Vec<TripLeg>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        if legs.is_empty() {
            return Ok(vec![]);
        }

        let data_entry_dates: Vec<NaiveDate> = legs.iter().map(|l| l.data_entry_date).collect();
        let vehicle_ids: Vec<&str> = legs.iter().map(|l| l.vehicle_id.as_str()).collect();
        let activity_dates: Vec<NaiveDate> = legs.iter().map(|l| l.activity_date).collect();
        let trip_ids: Vec<&str> = legs.iter().map(|l| l.trip_id.as_str()).collect();
        let custodians: Vec<&str> = legs.iter().map(|l| l.custodian_name.as_str()).collect();
        let drivers: Vec<&str> = legs.iter().map(|l| l.driver_name.as_str()).collect();
        let branch_names: Vec<&str> = legs.iter().map(|l| l.branch_name.as_str()).collect();
        let sol_ids: Vec<&str> = legs.iter().map(|l| l.sol_id.as_str()).collect();
        let clusters: Vec<&str> = legs.iter().map(|l| l.cluster.as_str()).collect();
        let circles: Vec<&str> = legs.iter().map(|l| l.circle.as_str()).collect();
        let clients: Vec<&str> = legs.iter().map(|l| l.client.as_str()).collect();
        let retrievals: Vec<i32> = legs.iter().map(|l| l.trip_retrieval_count).collect();
        let fresh_pickups: Vec<i32> = legs.iter().map(|l| l.trip_fresh_pickup_count).collect();
        let return_retrievals: Vec<i32> =
            legs.iter().map(|l| l.trip_return_retrieval_count).collect();
        let empty_boxes: Vec<i32> = legs
            .iter()
            .map(|l| l.trip_empty_boxes_delivered_count)
            .collect();
        let opening: Vec<i64> = legs.iter().map(|l| l.trip_opening_kms).collect();
        let closing: Vec<i64> = legs.iter().map(|l| l.trip_closing_kms).collect();
        let trip_kms: Vec<i64> = legs.iter().map(|l| l.trip_kms).collect();
        let remarks: Vec<&str> = legs.iter().map(|l| l.remarks.as_str()).collect();
        let branch_counts: Vec<i64> = legs.iter().map(|l| l.trip_branch_count).collect();
        let branch_kms: Vec<f64> = legs.iter().map(|l| l.branch_kms).collect();
        let transaction_ids: Vec<&str> = legs.iter().map(|l| l.transaction_id.as_str()).collect();

        let query = format!(
            "INSERT INTO trip_legs \
                (data_entry_date, vehicle_id, activity_date, trip_id, custodian_name, \
                 driver_name, branch_name, sol_id, cluster, circle, client, \
                 trip_retrieval_count, trip_fresh_pickup_count, trip_return_retrieval_count, \
                 trip_empty_boxes_delivered_count, trip_opening_kms, trip_closing_kms, \
                 trip_kms, remarks, trip_branch_count, branch_kms, transaction_id) \
             SELECT * FROM UNNEST($1::date[], $2::text[], $3::date[], $4::text[], $5::text[], \
                 $6::text[], $7::text[], $8::text[], $9::text[], $10::text[], $11::text[], \
                 $12::int[], $13::int[], $14::int[], $15::int[], $16::bigint[], $17::bigint[], \
                 $18::bigint[], $19::text[], $20::bigint[], $21::float8[], $22::text[]) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripLeg>(&query)
            .bind(&data_entry_dates)
            .bind(&vehicle_ids)
            .bind(&activity_dates)
            .bind(&trip_ids)
            .bind(&custodians)
            .bind(&drivers)
            .bind(&branch_names)
            .bind(&sol_ids)
            .bind(&clusters)
            .bind(&circles)
            .bind(&clients)
            .bind(&retrievals)
            .bind(&fresh_pickups)
            .bind(&return_retrievals)
            .bind(&empty_boxes)
            .bind(&opening)
            .bind(&closing)
            .bind(&trip_kms)
            .bind(&remarks)
            .bind(&branch_counts)
            .bind(&branch_kms)
            .bind(&transaction_ids)
            .fetch_all(executor)
            .await
    }

    /// Count, apportion and insert one trip save atomically.
    ///
    /// A transaction-scoped advisory lock keyed on the trip id serializes
    /// concurrent saves of the same trip, so each one sees the legs the
    /// previous one committed. Saves of different trips do not contend.
    pub async fn append_trip(pool: &PgPool, trip: PreparedTrip) -> Result<SavedTrip, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(trip.trip_id())
            .execute(&mut *tx)
            .await?;

        let prior_legs = Self::count_by_trip(&mut *tx, trip.trip_id()).await?;
        let plan = trip.apportion(prior_legs);
        let legs = Self::insert_batch(&mut *tx, &plan.legs).await?;

        tx.commit().await?;

        tracing::debug!(
            trip_id = %plan.trip_id,
            prior_legs = plan.prior_legs,
            total_legs = plan.total_legs,
            "Appended trip legs"
        );

        Ok(SavedTrip {
            trip_id: plan.trip_id,
            prior_legs: plan.prior_legs,
            total_legs: plan.total_legs,
            branch_kms: plan.branch_kms,
            legs,
        })
    }

    pub async fn list_by_trip(pool: &PgPool, trip_id: &str) -> Result<Vec<TripLeg>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trip_legs WHERE trip_id = $1 ORDER BY id");
        sqlx::query_as::<_, TripLeg>(&query)
            .bind(trip_id)
            .fetch_all(pool)
            .await
    }
}
