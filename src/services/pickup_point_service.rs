//! Pickup point operations and the aggregated read model.
//!
//! The listing paginates pickup points first and applies the date window to
//! their receptions afterwards, so a filtered page may hold fewer than `limit`
//! pickup points.

use std::collections::HashMap;
use std::sync::Arc;

use jiff::Timestamp;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    City, DateWindow, PickupPoint, PickupPointWithReceptions, Product, Reception,
    ReceptionWithProducts,
};
use crate::repositories::{
    DeleteLastOutcome, PickupPointRepository, ProductRepository, ReceptionRepository,
};
use crate::services::guards::{ensure_pickup_point, require_open_reception};
use crate::telemetry;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 30;

/// Parameters of the aggregated pickup point listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickupPointQuery {
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub page: i64,
    pub limit: i64,
}

impl Default for PickupPointQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PickupPointQuery {
    pub fn validate(&self) -> AppResult<()> {
        if self.page < 1 {
            return Err(AppError::Validation {
                field: "page".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if !(1..=MAX_LIMIT).contains(&self.limit) {
            return Err(AppError::Validation {
                field: "limit".to_string(),
                reason: format!("must be between 1 and {}", MAX_LIMIT),
            });
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start >= end {
                return Err(AppError::Validation {
                    field: "startDate".to_string(),
                    reason: "must be before endDate".to_string(),
                });
            }
        }
        self.offset().map(|_| ())
    }

    /// The product-time window, present only when a bound was supplied.
    pub fn window(&self) -> Option<DateWindow> {
        (self.start_date.is_some() || self.end_date.is_some())
            .then(|| DateWindow::from_bounds(self.start_date, self.end_date))
    }

    /// Rows skipped before this page; fails when the page is out of range.
    fn offset(&self) -> AppResult<i64> {
        self.page
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(self.limit))
            .ok_or_else(|| AppError::Validation {
                field: "page".to_string(),
                reason: "is too large".to_string(),
            })
    }
}

#[derive(Clone)]
pub struct PickupPointService {
    pickup_points: Arc<dyn PickupPointRepository>,
    receptions: Arc<dyn ReceptionRepository>,
    products: Arc<dyn ProductRepository>,
}

impl PickupPointService {
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

    /// Registers a pickup point in one of the supported cities.
    pub async fn create_pickup_point(&self, city: &str) -> AppResult<PickupPoint> {
        let city: City = city.parse().inspect_err(|_| {
            tracing::warn!(city = %city, "Rejected pickup point city");
        })?;

        let point = self.pickup_points.create(city).await?;
        tracing::info!(pvz_id = %point.id, city = %point.city, "Pickup point created");
        telemetry::pickup_point_created();
        Ok(point)
    }

    /// Every pickup point, newest first, without receptions.
    pub async fn list_all(&self) -> AppResult<Vec<PickupPoint>> {
        self.pickup_points.list_all().await
    }

    /// One page of pickup points with their receptions and products.
    ///
    /// When a date bound is given, only receptions with at least one product
    /// created inside the window are kept, only those products are shown, and
    /// pickup points left without receptions are dropped.
    pub async fn list_with_receptions(
        &self,
        query: PickupPointQuery,
    ) -> AppResult<Vec<PickupPointWithReceptions>> {
        query.validate()?;
        let window = query.window();

        let points = self
            .pickup_points
            .list_page(query.offset()?, query.limit)
            .await?;
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let pvz_ids: Vec<Uuid> = points.iter().map(|p| p.id).collect();
        let receptions = self.receptions.list_by_pvz_ids(&pvz_ids, window).await?;

        let reception_ids: Vec<Uuid> = receptions.iter().map(|r| r.id).collect();
        let products = self
            .products
            .list_by_reception_ids(&reception_ids, window)
            .await?;

        Ok(assemble(points, receptions, products, window.is_some()))
    }

    /// Closes the latest reception of the pickup point.
    ///
    /// # Errors
    /// - `NotFound` if the pickup point does not exist
    /// - `NoActiveReception` if there is nothing open to close
    pub async fn close_last_reception(&self, pvz_id: Uuid) -> AppResult<Reception> {
        ensure_pickup_point(self.pickup_points.as_ref(), pvz_id).await?;
        let open = require_open_reception(self.receptions.as_ref(), pvz_id).await?;

        let closed = self
            .receptions
            .close(open.id)
            .await?
            .ok_or(AppError::NoActiveReception { pvz_id })?;

        tracing::info!(pvz_id = %pvz_id, reception_id = %closed.id, "Reception closed");
        Ok(closed)
    }

    /// Removes the most recently added product of the open reception.
    ///
    /// # Errors
    /// - `NotFound` if the pickup point does not exist
    /// - `NoActiveReception` if there is no open reception
    /// - `NoProductsInReception` if the open reception is empty
    pub async fn delete_last_product(&self, pvz_id: Uuid) -> AppResult<Product> {
        ensure_pickup_point(self.pickup_points.as_ref(), pvz_id).await?;
        let open = require_open_reception(self.receptions.as_ref(), pvz_id).await?;

        match self.products.delete_last_in_open_reception(open.id).await? {
            DeleteLastOutcome::Deleted(product) => {
                tracing::info!(
                    pvz_id = %pvz_id,
                    reception_id = %open.id,
                    product_id = %product.id,
                    "Product removed"
                );
                Ok(product)
            }
            DeleteLastOutcome::ReceptionNotOpen => Err(AppError::NoActiveReception { pvz_id }),
            DeleteLastOutcome::Empty => {
                tracing::warn!(reception_id = %open.id, "No products to delete");
                Err(AppError::NoProductsInReception {
                    reception_id: open.id,
                })
            }
        }
    }
}

/// Groups products under receptions and receptions under pickup points,
/// keeping the order each list arrived in.
fn assemble(
    points: Vec<PickupPoint>,
    receptions: Vec<Reception>,
    products: Vec<Product>,
    drop_empty: bool,
) -> Vec<PickupPointWithReceptions> {
    let mut products_by_reception: HashMap<Uuid, Vec<Product>> = HashMap::new();
    for product in products {
        products_by_reception
            .entry(product.reception_id)
            .or_default()
            .push(product);
    }

    let mut receptions_by_point: HashMap<Uuid, Vec<ReceptionWithProducts>> = HashMap::new();
    for reception in receptions {
        let products = products_by_reception
            .remove(&reception.id)
            .unwrap_or_default();
        receptions_by_point
            .entry(reception.pvz_id)
            .or_default()
            .push(ReceptionWithProducts {
                reception,
                products,
            });
    }

    points
        .into_iter()
        .filter_map(|pickup_point| {
            let receptions = receptions_by_point
                .remove(&pickup_point.id)
                .unwrap_or_default();
            if drop_empty && receptions.is_empty() {
                return None;
            }
            Some(PickupPointWithReceptions {
                pickup_point,
                receptions,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductType, ReceptionStatus};
    use crate::repositories::Repositories;
    use crate::services::ProductService;
    use jiff::ToSpan;
    use proptest::prelude::*;

    fn service(repos: &Repositories) -> PickupPointService {
        PickupPointService::new(
            repos.pickup_points.clone(),
            repos.receptions.clone(),
            repos.products.clone(),
        )
    }

    fn products(repos: &Repositories) -> ProductService {
        ProductService::new(
            repos.pickup_points.clone(),
            repos.receptions.clone(),
            repos.products.clone(),
        )
    }

    #[tokio::test]
    async fn test_create_pickup_point_in_supported_city() {
        let repos = Repositories::in_memory();
        let point = service(&repos).create_pickup_point("Москва").await.unwrap();
        assert_eq!(point.city, City::Moscow);
    }

    #[tokio::test]
    async fn test_create_pickup_point_rejects_unknown_city() {
        let repos = Repositories::in_memory();
        let result = service(&repos).create_pickup_point("Омск").await;
        match result {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "city"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
        assert!(repos.pickup_points.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_pickup_point_is_listed_without_receptions() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Казань").await.unwrap();

        let listing = service
            .list_with_receptions(PickupPointQuery::default())
            .await
            .unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].pickup_point, point);
        assert!(listing[0].receptions.is_empty());
    }

    #[tokio::test]
    async fn test_full_reception_scenario() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let products = products(&repos);

        let point = service.create_pickup_point("Москва").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();
        for product_type in ["электроника", "одежда", "обувь"] {
            products.add_product(product_type, point.id).await.unwrap();
        }
        service.close_last_reception(point.id).await.unwrap();

        let listing = service
            .list_with_receptions(PickupPointQuery::default())
            .await
            .unwrap();

        assert_eq!(listing.len(), 1);
        let receptions = &listing[0].receptions;
        assert_eq!(receptions.len(), 1);
        assert_eq!(receptions[0].reception.status, ReceptionStatus::Close);
        let types: Vec<ProductType> = receptions[0]
            .products
            .iter()
            .map(|p| p.product_type)
            .collect();
        assert_eq!(
            types,
            vec![ProductType::Electronics, ProductType::Clothes, ProductType::Shoes]
        );
    }

    #[tokio::test]
    async fn test_delete_last_product_removes_newest() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let products = products(&repos);

        let point = service.create_pickup_point("Казань").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();
        let mut added = Vec::new();
        for product_type in ["обувь", "одежда", "электроника", "обувь"] {
            added.push(products.add_product(product_type, point.id).await.unwrap());
        }

        let removed = service.delete_last_product(point.id).await.unwrap();
        assert_eq!(removed, added[3]);

        let listing = service
            .list_with_receptions(PickupPointQuery::default())
            .await
            .unwrap();
        assert_eq!(listing[0].receptions[0].products, added[..3].to_vec());
    }

    #[tokio::test]
    async fn test_delete_last_product_on_empty_reception() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Москва").await.unwrap();
        let reception = repos.receptions.create_open(point.id).await.unwrap();

        match service.delete_last_product(point.id).await {
            Err(AppError::NoProductsInReception { reception_id }) => {
                assert_eq!(reception_id, reception.id)
            }
            other => panic!("Expected NoProductsInReception, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_last_product_after_close() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Москва").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();
        products(&repos).add_product("обувь", point.id).await.unwrap();
        service.close_last_reception(point.id).await.unwrap();

        let result = service.delete_last_product(point.id).await;
        assert!(matches!(result, Err(AppError::NoActiveReception { .. })));
    }

    #[tokio::test]
    async fn test_close_twice() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Москва").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();

        let closed = service.close_last_reception(point.id).await.unwrap();
        assert_eq!(closed.status, ReceptionStatus::Close);

        let again = service.close_last_reception(point.id).await;
        assert!(matches!(again, Err(AppError::NoActiveReception { .. })));
    }

    #[tokio::test]
    async fn test_operations_on_unknown_pickup_point() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let missing = Uuid::new_v4();

        assert!(matches!(
            service.close_last_reception(missing).await,
            Err(AppError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete_last_product(missing).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_pages_partition_newest_first() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let mut created = Vec::new();
        for _ in 0..15 {
            created.push(service.create_pickup_point("Казань").await.unwrap());
        }
        created.reverse();

        let page = |page| PickupPointQuery {
            page,
            limit: 10,
            ..PickupPointQuery::default()
        };
        let first = service.list_with_receptions(page(1)).await.unwrap();
        let second = service.list_with_receptions(page(2)).await.unwrap();
        let third = service.list_with_receptions(page(3)).await.unwrap();

        let ids: Vec<Uuid> = first
            .iter()
            .chain(second.iter())
            .map(|p| p.pickup_point.id)
            .collect();
        let expected: Vec<Uuid> = created.iter().map(|p| p.id).collect();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 5);
        assert!(third.is_empty());
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_date_filter_drops_pickup_points_without_matching_products() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let products = products(&repos);

        let empty = service.create_pickup_point("Москва").await.unwrap();
        let busy = service.create_pickup_point("Казань").await.unwrap();
        repos.receptions.create_open(empty.id).await.unwrap();
        repos.receptions.create_open(busy.id).await.unwrap();
        let product = products.add_product("обувь", busy.id).await.unwrap();

        let query = PickupPointQuery {
            start_date: Some(product.date_time - 1.minute()),
            end_date: Some(product.date_time + 1.minute()),
            ..PickupPointQuery::default()
        };
        let listing = service.list_with_receptions(query).await.unwrap();

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].pickup_point.id, busy.id);
        assert_eq!(listing[0].receptions[0].products, vec![product]);
    }

    #[tokio::test]
    async fn test_date_filter_outside_window_is_empty() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Москва").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();
        products(&repos).add_product("обувь", point.id).await.unwrap();

        let query = PickupPointQuery {
            end_date: Some("2000-01-01T00:00:00Z".parse().unwrap()),
            ..PickupPointQuery::default()
        };
        assert!(service.list_with_receptions(query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_listing_rejects_inverted_window() {
        let repos = Repositories::in_memory();
        let now = Timestamp::now();
        let query = PickupPointQuery {
            start_date: Some(now),
            end_date: Some(now),
            ..PickupPointQuery::default()
        };

        match service(&repos).list_with_receptions(query).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "startDate"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deletes_each_remove_a_distinct_product() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Москва").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();

        let mut added = Vec::new();
        for _ in 0..12 {
            added.push(products(&repos).add_product("одежда", point.id).await.unwrap().id);
        }

        let handles: Vec<_> = (0..added.len())
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.delete_last_product(point.id).await })
            })
            .collect();

        let mut deleted = Vec::new();
        for handle in handles {
            deleted.push(handle.await.unwrap().unwrap().id);
        }
        deleted.sort();
        added.sort();
        assert_eq!(deleted, added);

        assert!(matches!(
            service.delete_last_product(point.id).await,
            Err(AppError::NoProductsInReception { .. })
        ));
        let listing = service
            .list_with_receptions(PickupPointQuery::default())
            .await
            .unwrap();
        assert!(listing[0].receptions[0].products.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_adds_racing_close_never_land_in_closed_reception() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        let point = service.create_pickup_point("Казань").await.unwrap();
        repos.receptions.create_open(point.id).await.unwrap();

        let adders: Vec<_> = (0..16)
            .map(|_| {
                let products = products(&repos);
                tokio::spawn(async move { products.add_product("обувь", point.id).await })
            })
            .collect();
        let closer = {
            let service = service.clone();
            tokio::spawn(async move { service.close_last_reception(point.id).await })
        };

        let closed = closer.await.unwrap().unwrap();
        let mut accepted = Vec::new();
        for handle in adders {
            match handle.await.unwrap() {
                Ok(product) => accepted.push(product.id),
                Err(AppError::NoActiveReception { .. }) => {}
                Err(other) => panic!("unexpected error {:?}", other),
            }
        }

        let listing = service
            .list_with_receptions(PickupPointQuery::default())
            .await
            .unwrap();
        let reception = &listing[0].receptions[0];
        assert_eq!(reception.reception.id, closed.id);
        assert_eq!(reception.reception.status, ReceptionStatus::Close);

        let mut stored: Vec<Uuid> = reception.products.iter().map(|p| p.id).collect();
        stored.sort();
        accepted.sort();
        assert_eq!(stored, accepted);

        assert!(matches!(
            products(&repos).add_product("обувь", point.id).await,
            Err(AppError::NoActiveReception { .. })
        ));
    }

    #[tokio::test]
    async fn test_listing_rejects_page_past_addressable_range() {
        let repos = Repositories::in_memory();
        let service = service(&repos);
        service.create_pickup_point("Москва").await.unwrap();

        let query = PickupPointQuery {
            page: i64::MAX,
            limit: MAX_LIMIT,
            ..PickupPointQuery::default()
        };
        match service.list_with_receptions(query).await {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "page"),
            other => panic!("Expected Validation error, got {:?}", other),
        }

        let last_addressable = PickupPointQuery {
            page: i64::MAX / MAX_LIMIT,
            limit: MAX_LIMIT,
            ..PickupPointQuery::default()
        };
        assert!(service
            .list_with_receptions(last_addressable)
            .await
            .unwrap()
            .is_empty());
    }

    proptest! {
        #[test]
        fn prop_query_validation_matches_bounds(page in -5i64..50, limit in -5i64..50) {
            let query = PickupPointQuery { page, limit, ..PickupPointQuery::default() };
            let valid = page >= 1 && (1..=MAX_LIMIT).contains(&limit);
            prop_assert_eq!(query.validate().is_ok(), valid);
        }

        #[test]
        fn prop_window_only_with_bounds(has_start in any::<bool>(), has_end in any::<bool>()) {
            let start: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
            let query = PickupPointQuery {
                start_date: has_start.then_some(start),
                end_date: has_end.then(|| start + 1.hour()),
                ..PickupPointQuery::default()
            };
            prop_assert_eq!(query.window().is_some(), has_start || has_end);
        }
    }
}
