//! Adding products to the open reception of a pickup point.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Product, ProductType};
use crate::repositories::{PickupPointRepository, ProductRepository, ReceptionRepository};
use crate::services::guards::{ensure_pickup_point, require_open_reception};
use crate::telemetry;

#[derive(Clone)]
pub struct ProductService {
    pickup_points: Arc<dyn PickupPointRepository>,
    receptions: Arc<dyn ReceptionRepository>,
    products: Arc<dyn ProductRepository>,
}

impl ProductService {
    pub fn new(
        pickup_points: Arc<dyn PickupPointRepository>,
        receptions: Arc<dyn ReceptionRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            pickup_points,
            receptions,
            products,
        }
    }

    /// Adds a product of `product_type` to the pickup point's open reception.
    ///
    /// # Errors
    /// - `Validation` for an unknown product type
    /// - `NotFound` if the pickup point does not exist
    /// - `NoActiveReception` if there is no reception in progress, including
    ///   when it was closed between the check and the insert
    pub async fn add_product(&self, product_type: &str, pvz_id: Uuid) -> AppResult<Product> {
        let product_type: ProductType = product_type.parse()?;
        ensure_pickup_point(self.pickup_points.as_ref(), pvz_id).await?;
        let reception = require_open_reception(self.receptions.as_ref(), pvz_id).await?;

        let product = self
            .products
            .add_to_open_reception(reception.id, product_type)
            .await?
            .ok_or(AppError::NoActiveReception { pvz_id })?;

        tracing::info!(
            pvz_id = %pvz_id,
            reception_id = %reception.id,
            product_id = %product.id,
            product_type = %product.product_type,
            "Product added"
        );
        telemetry::product_added();
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::City;
    use crate::repositories::Repositories;

    fn service(repos: &Repositories) -> ProductService {
        ProductService::new(
            repos.pickup_points.clone(),
            repos.receptions.clone(),
            repos.products.clone(),
        )
    }

    #[tokio::test]
    async fn test_add_product_to_open_reception() {
        let repos = Repositories::in_memory();
        let point = repos.pickup_points.create(City::Moscow).await.unwrap();
        let reception = repos.receptions.create_open(point.id).await.unwrap();

        let product = service(&repos)
            .add_product("электроника", point.id)
            .await
            .unwrap();

        assert_eq!(product.reception_id, reception.id);
        assert_eq!(product.product_type, ProductType::Electronics);
    }

    #[tokio::test]
    async fn test_add_product_without_reception() {
        let repos = Repositories::in_memory();
        let point = repos.pickup_points.create(City::Moscow).await.unwrap();

        let result = service(&repos).add_product("обувь", point.id).await;
        assert!(matches!(result, Err(AppError::NoActiveReception { .. })));
    }

    #[tokio::test]
    async fn test_add_product_after_close() {
        let repos = Repositories::in_memory();
        let point = repos.pickup_points.create(City::Kazan).await.unwrap();
        let reception = repos.receptions.create_open(point.id).await.unwrap();
        repos.receptions.close(reception.id).await.unwrap();

        let result = service(&repos).add_product("одежда", point.id).await;
        assert!(matches!(result, Err(AppError::NoActiveReception { .. })));
    }

    #[tokio::test]
    async fn test_add_product_rejects_unknown_type() {
        let repos = Repositories::in_memory();
        let point = repos.pickup_points.create(City::Kazan).await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();

        let result = service(&repos).add_product("мебель", point.id).await;
        match result {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "type"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_product_to_unknown_pickup_point() {
        let repos = Repositories::in_memory();
        let result = service(&repos).add_product("обувь", Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }
}
