//! Persistence seams for the reception workflow.
//!
//! Services depend on these traits only, so the PostgreSQL implementations can
//! be swapped for the in-memory store in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    City, DateWindow, NewUser, PickupPoint, Product, ProductType, Reception, User,
};

#[async_trait]
pub trait PickupPointRepository: Send + Sync {
    /// Persists a new pickup point with a generated id and the current time.
    async fn create(&self, city: City) -> AppResult<PickupPoint>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<PickupPoint>>;

    /// One page of pickup points, newest registration first.
    async fn list_page(&self, offset: i64, limit: i64) -> AppResult<Vec<PickupPoint>>;

    /// Every pickup point, newest registration first.
    async fn list_all(&self) -> AppResult<Vec<PickupPoint>>;
}

#[async_trait]
pub trait ReceptionRepository: Send + Sync {
    /// Current reception of a pickup point: the open one when present,
    /// otherwise the most recently created.
    async fn find_latest_by_pvz(&self, pvz_id: Uuid) -> AppResult<Option<Reception>>;

    /// Opens a reception for the pickup point.
    ///
    /// Atomic with respect to concurrent callers: fails with
    /// `AppError::ReceptionAlreadyOpen` when another reception is in progress
    /// and with `AppError::NotFound` when the pickup point is missing.
    async fn create_open(&self, pvz_id: Uuid) -> AppResult<Reception>;

    /// Closes the reception if it is still in progress.
    ///
    /// Returns `None` when the reception is already closed or does not exist.
    async fn close(&self, reception_id: Uuid) -> AppResult<Option<Reception>>;

    /// Receptions of the given pickup points, oldest first.
    ///
    /// With a window, only receptions holding at least one product created
    /// inside it are returned.
    async fn list_by_pvz_ids(
        &self,
        pvz_ids: &[Uuid],
        window: Option<DateWindow>,
    ) -> AppResult<Vec<Reception>>;
}

/// Result of removing the newest product of a reception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteLastOutcome {
    Deleted(Product),
    /// The reception was closed (or vanished) before the delete ran.
    ReceptionNotOpen,
    /// The reception is open but holds no products.
    Empty,
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Adds a product while holding the reception open.
    ///
    /// Returns `None` if the reception is not in progress at insert time.
    async fn add_to_open_reception(
        &self,
        reception_id: Uuid,
        product_type: ProductType,
    ) -> AppResult<Option<Product>>;

    /// Deletes the most recently inserted product of an open reception.
    async fn delete_last_in_open_reception(
        &self,
        reception_id: Uuid,
    ) -> AppResult<DeleteLastOutcome>;

    /// Products of the given receptions in insertion order, optionally
    /// restricted to a creation-time window.
    async fn list_by_reception_ids(
        &self,
        reception_ids: &[Uuid],
        window: Option<DateWindow>,
    ) -> AppResult<Vec<Product>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

/// Liveness check of the backing store.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}
