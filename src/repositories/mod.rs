//! Repository layer for data access operations.
//!
//! Traits live in [`traits`]; PostgreSQL implementations use diesel_async and
//! [`MemoryStore`] provides a shared in-memory substitute.

mod health_repo;
pub mod memory;
mod pickup_point_repo;
mod product_repo;
mod reception_repo;
mod traits;
mod user_repo;

pub use health_repo::PgHealthProbe;
pub use memory::MemoryStore;
pub use pickup_point_repo::PgPickupPointRepository;
pub use product_repo::PgProductRepository;
pub use reception_repo::PgReceptionRepository;
pub use traits::{
    DeleteLastOutcome, HealthProbe, PickupPointRepository, ProductRepository,
    ReceptionRepository, UserRepository,
};
pub use user_repo::PgUserRepository;

use std::sync::Arc;

use crate::db::AsyncDbPool;

/// Aggregates all repository handles.
///
/// Every handle is an `Arc<dyn ...>`, so cloning is cheap and services can
/// share the same underlying store.
#[derive(Clone)]
pub struct Repositories {
    pub pickup_points: Arc<dyn PickupPointRepository>,
    pub receptions: Arc<dyn ReceptionRepository>,
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub health: Arc<dyn HealthProbe>,
}

impl Repositories {
    /// Creates PostgreSQL-backed repositories sharing one connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            pickup_points: Arc::new(PgPickupPointRepository::new(pool.clone())),
            receptions: Arc::new(PgReceptionRepository::new(pool.clone())),
            products: Arc::new(PgProductRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool.clone())),
            health: Arc::new(PgHealthProbe::new(pool)),
        }
    }

    /// Creates repositories backed by a single [`MemoryStore`].
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            pickup_points: Arc::new(store.clone()),
            receptions: Arc::new(store.clone()),
            products: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            health: Arc::new(store),
        }
    }
}
