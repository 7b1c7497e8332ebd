//! In-memory implementation of every repository trait.
//!
//! All repositories share one mutex-guarded store, so each trait method is
//! atomic with respect to the others, mirroring the row locks of the
//! PostgreSQL implementation.

use async_trait::async_trait;
use jiff::Timestamp;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    City, DateWindow, NewUser, PickupPoint, Product, ProductType, Reception, ReceptionStatus, User,
};
use crate::repositories::{
    DeleteLastOutcome, HealthProbe, PickupPointRepository, ProductRepository, ReceptionRepository,
    UserRepository,
};

#[derive(Debug, Default)]
struct MemoryData {
    // Each vector is kept in insertion order.
    pickup_points: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    products: Vec<Product>,
    users: Vec<User>,
}

impl MemoryData {
    fn latest_reception(&self, pvz_id: Uuid) -> Option<&Reception> {
        self.receptions
            .iter()
            .filter(|r| r.pvz_id == pvz_id)
            .max_by_key(|r| (r.is_open(), r.date_time))
    }

    fn sorted_pickup_points(&self) -> Vec<PickupPoint> {
        // Newest first; ties fall back to reverse insertion order.
        let mut points: Vec<PickupPoint> = self.pickup_points.iter().rev().cloned().collect();
        points.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));
        points
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> AppResult<MutexGuard<'_, MemoryData>> {
        self.data.lock().map_err(|_| AppError::Internal {
            source: anyhow::anyhow!("in-memory store lock poisoned"),
        })
    }
}

#[async_trait]
impl PickupPointRepository for MemoryStore {
    async fn create(&self, city: City) -> AppResult<PickupPoint> {
        let point = PickupPoint {
            id: Uuid::new_v4(),
            registration_date: Timestamp::now(),
            city,
        };
        self.data()?.pickup_points.push(point.clone());
        Ok(point)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PickupPoint>> {
        Ok(self
            .data()?
            .pickup_points
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<PickupPoint>> {
        let (Ok(offset), Ok(limit)) = (usize::try_from(offset), usize::try_from(limit)) else {
            return Err(AppError::BadRequest {
                message: format!("Invalid page window: offset {offset}, limit {limit}"),
            });
        };
        Ok(self
            .data()?
            .sorted_pickup_points()
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn list_all(&self) -> AppResult<Vec<PickupPoint>> {
        Ok(self.data()?.sorted_pickup_points())
    }
}

#[async_trait]
impl ReceptionRepository for MemoryStore {
    async fn find_latest_by_pvz(&self, pvz_id: Uuid) -> AppResult<Option<Reception>> {
        Ok(self.data()?.latest_reception(pvz_id).cloned())
    }

    async fn create_open(&self, pvz_id: Uuid) -> AppResult<Reception> {
        let mut data = self.data()?;
        if !data.pickup_points.iter().any(|p| p.id == pvz_id) {
            return Err(AppError::pickup_point_not_found(pvz_id));
        }
        if data
            .receptions
            .iter()
            .any(|r| r.pvz_id == pvz_id && r.is_open())
        {
            return Err(AppError::ReceptionAlreadyOpen { pvz_id });
        }

        let reception = Reception {
            id: Uuid::new_v4(),
            date_time: Timestamp::now(),
            pvz_id,
            status: ReceptionStatus::InProgress,
        };
        data.receptions.push(reception.clone());
        Ok(reception)
    }

    async fn close(&self, reception_id: Uuid) -> AppResult<Option<Reception>> {
        let mut data = self.data()?;
        let closed = data
            .receptions
            .iter_mut()
            .find(|r| r.id == reception_id && r.is_open())
            .map(|r| {
                r.status = ReceptionStatus::Close;
                r.clone()
            });
        Ok(closed)
    }

    async fn list_by_pvz_ids(
        &self,
        pvz_ids: &[Uuid],
        window: Option<DateWindow>,
    ) -> AppResult<Vec<Reception>> {
        let data = self.data()?;
        let mut receptions: Vec<Reception> = data
            .receptions
            .iter()
            .filter(|r| pvz_ids.contains(&r.pvz_id))
            .filter(|r| match window {
                Some(window) => data
                    .products
                    .iter()
                    .any(|p| p.reception_id == r.id && window.contains(p.date_time)),
                None => true,
            })
            .cloned()
            .collect();
        receptions.sort_by_key(|r| r.date_time);
        Ok(receptions)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn add_to_open_reception(
        &self,
        reception_id: Uuid,
        product_type: ProductType,
    ) -> AppResult<Option<Product>> {
        let mut data = self.data()?;
        if !data
            .receptions
            .iter()
            .any(|r| r.id == reception_id && r.is_open())
        {
            return Ok(None);
        }

        let product = Product {
            id: Uuid::new_v4(),
            date_time: Timestamp::now(),
            product_type,
            reception_id,
        };
        data.products.push(product.clone());
        Ok(Some(product))
    }

    async fn delete_last_in_open_reception(
        &self,
        reception_id: Uuid,
    ) -> AppResult<DeleteLastOutcome> {
        let mut data = self.data()?;
        if !data
            .receptions
            .iter()
            .any(|r| r.id == reception_id && r.is_open())
        {
            return Ok(DeleteLastOutcome::ReceptionNotOpen);
        }

        match data
            .products
            .iter()
            .rposition(|p| p.reception_id == reception_id)
        {
            Some(index) => Ok(DeleteLastOutcome::Deleted(data.products.remove(index))),
            None => Ok(DeleteLastOutcome::Empty),
        }
    }

    async fn list_by_reception_ids(
        &self,
        reception_ids: &[Uuid],
        window: Option<DateWindow>,
    ) -> AppResult<Vec<Product>> {
        Ok(self
            .data()?
            .products
            .iter()
            .filter(|p| reception_ids.contains(&p.reception_id))
            .filter(|p| window.is_none_or(|w| w.contains(p.date_time)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut data = self.data()?;
        if data.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::Duplicate {
                entity: "users".to_string(),
                field: "email".to_string(),
                value: new_user.email,
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .data()?
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl HealthProbe for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.data().map(|_| ())
    }
}
