//! Store liveness probe.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::{AppResult, DatabaseErrorConverter};
use crate::repositories::HealthProbe;

/// Round-trips `SELECT 1` through the pool.
#[derive(Clone)]
pub struct PgHealthProbe {
    pool: AsyncDbPool,
}

impl PgHealthProbe {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HealthProbe for PgHealthProbe {
    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "health check"))
    }
}
