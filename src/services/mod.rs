//! Service layer for business logic operations.
//!
//! Services never call each other; they share repository handles and enforce
//! the reception workflow rules before delegating to the atomic repository
//! operations.

mod guards;
mod pickup_point_service;
mod product_service;
mod reception_service;
mod user_service;

pub use pickup_point_service::{
    PickupPointQuery, PickupPointService, DEFAULT_LIMIT, DEFAULT_PAGE, MAX_LIMIT,
};
pub use product_service::ProductService;
pub use reception_service::ReceptionService;
pub use user_service::UserService;

use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// Cloning is cheap since every repository handle is an `Arc`.
#[derive(Clone)]
pub struct Services {
    pub pickup_points: PickupPointService,
    pub receptions: ReceptionService,
    pub products: ProductService,
    pub users: UserService,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        Self {
            pickup_points: PickupPointService::new(
                repos.pickup_points.clone(),
                repos.receptions.clone(),
                repos.products.clone(),
            ),
            receptions: ReceptionService::new(
                repos.pickup_points.clone(),
                repos.receptions.clone(),
            ),
            products: ProductService::new(
                repos.pickup_points,
                repos.receptions,
                repos.products,
            ),
            users: UserService::new(repos.users),
        }
    }
}
