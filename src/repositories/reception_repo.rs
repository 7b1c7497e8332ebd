//! PostgreSQL reception repository.
//!
//! Opening a reception locks the pickup point row, so two concurrent openers
//! serialise; the partial unique index `receptions_one_open_per_pvz` backs the
//! same rule at the storage level.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use jiff::Timestamp;
use jiff_diesel::ToDiesel;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{DateWindow, Reception, ReceptionStatus};
use crate::repositories::ReceptionRepository;
use crate::schema::{products, pvzs, receptions};

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = receptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ReceptionRow {
    pub id: Uuid,
    pub date_time: jiff_diesel::Timestamp,
    pub pvz_id: Uuid,
    pub status: ReceptionStatus,
}

impl From<ReceptionRow> for Reception {
    fn from(row: ReceptionRow) -> Self {
        Self {
            id: row.id,
            date_time: row.date_time.to_jiff(),
            pvz_id: row.pvz_id,
            status: row.status,
        }
    }
}

#[derive(Clone)]
pub struct PgReceptionRepository {
    pool: AsyncDbPool,
}

impl PgReceptionRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReceptionRepository for PgReceptionRepository {
    async fn find_latest_by_pvz(&self, pvz_id: Uuid) -> AppResult<Option<Reception>> {
        let mut conn = self.pool.get().await?;

        receptions::table
            .filter(receptions::pvz_id.eq(pvz_id))
            // An open reception outranks any timestamp: `in_progress` is the
            // first label of the `reception_status` enum.
            .order((receptions::status.asc(), receptions::date_time.desc()))
            .select(ReceptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Reception::from))
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "find latest reception"))
    }

    async fn create_open(&self, pvz_id: Uuid) -> AppResult<Reception> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                pvzs::table
                    .find(pvz_id)
                    .select(pvzs::id)
                    .for_update()
                    .first::<Uuid>(conn)
                    .await
                    .optional()?
                    .ok_or_else(|| AppError::pickup_point_not_found(pvz_id))?;

                let open = receptions::table
                    .filter(receptions::pvz_id.eq(pvz_id))
                    .filter(receptions::status.eq(ReceptionStatus::InProgress))
                    .select(receptions::id)
                    .first::<Uuid>(conn)
                    .await
                    .optional()?;
                if open.is_some() {
                    return Err(AppError::ReceptionAlreadyOpen { pvz_id });
                }

                let row = ReceptionRow {
                    id: Uuid::new_v4(),
                    date_time: Timestamp::now().to_diesel(),
                    pvz_id,
                    status: ReceptionStatus::InProgress,
                };
                let created = diesel::insert_into(receptions::table)
                    .values(&row)
                    .returning(ReceptionRow::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(Reception::from(created))
            }
            .scope_boxed()
        })
        .await
    }

    async fn close(&self, reception_id: Uuid) -> AppResult<Option<Reception>> {
        let mut conn = self.pool.get().await?;

        diesel::update(
            receptions::table
                .filter(receptions::id.eq(reception_id))
                .filter(receptions::status.eq(ReceptionStatus::InProgress)),
        )
        .set(receptions::status.eq(ReceptionStatus::Close))
        .returning(ReceptionRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map(|row| row.map(Reception::from))
        .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "close reception"))
    }

    async fn list_by_pvz_ids(
        &self,
        pvz_ids: &[Uuid],
        window: Option<DateWindow>,
    ) -> AppResult<Vec<Reception>> {
        if pvz_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        let mut query = receptions::table
            .filter(receptions::pvz_id.eq_any(pvz_ids.to_vec()))
            .order((receptions::date_time.asc(), receptions::id.asc()))
            .select(ReceptionRow::as_select())
            .into_boxed();

        if let Some(window) = window {
            query = query.filter(
                receptions::id.eq_any(
                    products::table
                        .filter(
                            products::date_time
                                .between(window.start.to_diesel(), window.end.to_diesel()),
                        )
                        .select(products::reception_id),
                ),
            );
        }

        let rows = query
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list receptions"))?;

        Ok(rows.into_iter().map(Reception::from).collect())
    }
}
