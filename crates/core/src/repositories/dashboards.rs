//! Summary statistics for the customer and professional home screens.

use api_shared::{CustomerDashboardRes, ProDashboardRes};
use sqlx::PgPool;

use crate::matching::round1;
use crate::models::UserRow;
use crate::CoreResult;

#[derive(Clone, Debug)]
pub struct DashboardService {
    pool: PgPool,
}

impl DashboardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn customer(&self, customer_id: &str) -> CoreResult<CustomerDashboardRes> {
        let active_requests: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_requests
             WHERE customer_id = $1 AND status IN ('open', 'matched')",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        let (upcoming_bookings, completed_bookings, total_spent): (i64, i64, f64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (WHERE status IN ('confirmed', 'in_progress')),
                COUNT(*) FILTER (WHERE status = 'completed'),
                COALESCE(SUM(agreed_price) FILTER (WHERE status = 'completed'), 0)::float8
             FROM bookings WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CustomerDashboardRes {
            active_requests,
            upcoming_bookings,
            completed_bookings,
            total_spent,
        })
    }

    pub async fn professional(&self, pro: &UserRow) -> CoreResult<ProDashboardRes> {
        let (active_jobs, completed_jobs, total_earnings): (i64, i64, f64) = sqlx::query_as(
            "SELECT
                COUNT(*) FILTER (WHERE status IN ('confirmed', 'in_progress')),
                COUNT(*) FILTER (WHERE status = 'completed'),
                COALESCE(SUM(agreed_price) FILTER (WHERE status = 'completed'), 0)::float8
             FROM bookings WHERE professional_id = $1",
        )
        .bind(&pro.id)
        .fetch_one(&self.pool)
        .await?;

        // Pros without a category have no pending requests.
        let pending_requests: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_requests WHERE category_id = $1 AND status = 'open'",
        )
        .bind(pro.service_category.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let (avg, reviews_count): (Option<f64>, i64) = sqlx::query_as(
            "SELECT AVG(rating)::float8, COUNT(*) FROM reviews WHERE reviewee_id = $1",
        )
        .bind(&pro.id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProDashboardRes {
            active_jobs,
            pending_requests,
            completed_jobs,
            total_earnings,
            rating: round1(avg.unwrap_or_default()),
            reviews_count,
        })
    }
}
