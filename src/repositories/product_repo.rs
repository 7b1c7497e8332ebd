//! PostgreSQL product repository.
//!
//! Mutations lock the owning reception row first, which serialises them with
//! each other and with closing.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use jiff::Timestamp;
use jiff_diesel::ToDiesel;
use uuid::Uuid;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult, DatabaseErrorConverter};
use crate::models::{DateWindow, Product, ProductType, ReceptionStatus};
use crate::repositories::{DeleteLastOutcome, ProductRepository};
use crate::schema::{products, receptions};

#[derive(Debug, Queryable, Selectable, Insertable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProductRow {
    pub id: Uuid,
    pub date_time: jiff_diesel::Timestamp,
    pub product_type: ProductType,
    pub reception_id: Uuid,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            date_time: row.date_time.to_jiff(),
            product_type: row.product_type,
            reception_id: row.reception_id,
        }
    }
}

#[derive(Clone)]
pub struct PgProductRepository {
    pool: AsyncDbPool,
}

impl PgProductRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn add_to_open_reception(
        &self,
        reception_id: Uuid,
        product_type: ProductType,
    ) -> AppResult<Option<Product>> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let locked = receptions::table
                    .filter(receptions::id.eq(reception_id))
                    .filter(receptions::status.eq(ReceptionStatus::InProgress))
                    .select(receptions::id)
                    .for_update()
                    .first::<Uuid>(conn)
                    .await
                    .optional()?;
                if locked.is_none() {
                    return Ok(None);
                }

                let row = ProductRow {
                    id: Uuid::new_v4(),
                    date_time: Timestamp::now().to_diesel(),
                    product_type,
                    reception_id,
                };
                let created = diesel::insert_into(products::table)
                    .values(&row)
                    .returning(ProductRow::as_returning())
                    .get_result(conn)
                    .await?;

                Ok(Some(Product::from(created)))
            }
            .scope_boxed()
        })
        .await
    }

    async fn delete_last_in_open_reception(
        &self,
        reception_id: Uuid,
    ) -> AppResult<DeleteLastOutcome> {
        let mut conn = self.pool.get().await?;

        conn.transaction::<_, AppError, _>(|conn| {
            async move {
                let status = receptions::table
                    .find(reception_id)
                    .select(receptions::status)
                    .for_update()
                    .first::<ReceptionStatus>(conn)
                    .await
                    .optional()?;
                if status != Some(ReceptionStatus::InProgress) {
                    return Ok(DeleteLastOutcome::ReceptionNotOpen);
                }

                let last = products::table
                    .filter(products::reception_id.eq(reception_id))
                    .order(products::seq.desc())
                    .select(ProductRow::as_select())
                    .first(conn)
                    .await
                    .optional()?;
                let Some(last) = last else {
                    return Ok(DeleteLastOutcome::Empty);
                };

                diesel::delete(products::table.find(last.id))
                    .execute(conn)
                    .await?;

                Ok(DeleteLastOutcome::Deleted(Product::from(last)))
            }
            .scope_boxed()
        })
        .await
    }

    async fn list_by_reception_ids(
        &self,
        reception_ids: &[Uuid],
        window: Option<DateWindow>,
    ) -> AppResult<Vec<Product>> {
        if reception_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;

        let mut query = products::table
            .filter(products::reception_id.eq_any(reception_ids.to_vec()))
            .order(products::seq.asc())
            .select(ProductRow::as_select())
            .into_boxed();

        if let Some(window) = window {
            query = query.filter(
                products::date_time.between(window.start.to_diesel(), window.end.to_diesel()),
            );
        }

        let rows = query
            .load(&mut conn)
            .await
            .map_err(|e| DatabaseErrorConverter::convert_diesel_error(e, "list products"))?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}
