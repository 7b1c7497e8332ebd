//! PostgreSQL pickup point repository.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff::Timestamp;
use jiff_diesel::ToDiesel;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{City, PickupPoint};
use crate::repositories::PickupPointRepository;
use crate::schema::pvzs;

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = pvzs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PickupPointRow {
    pub id: Uuid,
    pub registration_date: jiff_diesel::Timestamp,
    pub city: City,
}

impl From<PickupPointRow> for PickupPoint {
    fn from(row: PickupPointRow) -> Self {
        Self {
            id: row.id,
            registration_date: row.registration_date.to_jiff(),
            city: row.city,
        }
    }
}

/// Since `AsyncDbPool` (bb8::Pool) uses `Arc` internally, cloning is cheap.
#[derive(Clone)]
pub struct PgPickupPointRepository {
    pool: AsyncDbPool,
}

impl PgPickupPointRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PickupPointRepository for PgPickupPointRepository {
    async fn create(&self, city: City) -> AppResult<PickupPoint> {
        let row = PickupPointRow {
            id: Uuid::new_v4(),
            registration_date: Timestamp::now().to_diesel(),
            city,
        };
        let mut conn = self.pool.get().await?;

        diesel::insert_into(pvzs::table)
            .values(&row)
            .returning(PickupPointRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(PickupPoint::from)
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "insert pickup point"))
    }

    async fn find_by_id(&self, pvz_id: Uuid) -> AppResult<Option<PickupPoint>> {
        let mut conn = self.pool.get().await?;

        pvzs::table
            .find(pvz_id)
            .select(PickupPointRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(PickupPoint::from))
            .map_err(AppError::from)
    }

    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<PickupPoint>> {
        let mut conn = self.pool.get().await?;

        let rows = pvzs::table
            .order((pvzs::registration_date.desc(), pvzs::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(PickupPointRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list pickup points"))?;

        Ok(rows.into_iter().map(PickupPoint::from).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<PickupPoint>> {
        let mut conn = self.pool.get().await?;

        let rows = pvzs::table
            .order((pvzs::registration_date.desc(), pvzs::id.desc()))
            .select(PickupPointRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list pickup points"))?;

        Ok(rows.into_iter().map(PickupPoint::from).collect())
    }
}
