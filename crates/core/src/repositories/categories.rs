use sqlx::PgPool;

use crate::constants::POPULAR_CATEGORY_LIMIT;
use crate::models::CategoryRow;
use crate::CoreResult;

#[derive(Clone, Debug)]
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> CoreResult<Vec<CategoryRow>> {
        Ok(
            sqlx::query_as::<_, CategoryRow>("SELECT * FROM service_categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn popular(&self) -> CoreResult<Vec<CategoryRow>> {
        Ok(sqlx::query_as::<_, CategoryRow>(
            "SELECT * FROM service_categories ORDER BY name LIMIT $1",
        )
        .bind(POPULAR_CATEGORY_LIMIT)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn exists(&self, id: &str) -> CoreResult<bool> {
        Ok(
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM service_categories WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?,
        )
    }
}
