//! Pickup point DTOs, including the aggregated listing.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::api::dto::{ProductResponse, ReceptionResponse};
use crate::models::{City, PickupPoint, PickupPointWithReceptions, ReceptionWithProducts};
use crate::services::{DEFAULT_LIMIT, DEFAULT_PAGE, PickupPointQuery};

// ============================================================================
// Request DTOs
// ============================================================================

/// Request body for registering a pickup point.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePickupPointRequest {
    /// One of `Москва`, `Санкт-Петербург`, `Казань`
    #[schema(example = "Москва")]
    pub city: String,
}

/// Query string of `GET /pvz`.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PickupPointListParams {
    /// Lower bound (inclusive) on product time, RFC 3339
    #[param(value_type = Option<String>, format = DateTime)]
    pub start_date: Option<Timestamp>,
    /// Upper bound (inclusive) on product time, RFC 3339
    #[param(value_type = Option<String>, format = DateTime)]
    pub end_date: Option<Timestamp>,
    #[validate(range(min = 1, message = "page must be at least 1"))]
    #[param(minimum = 1, default = 1)]
    pub page: Option<i64>,
    #[validate(range(min = 1, max = 30, message = "limit must be between 1 and 30"))]
    #[param(minimum = 1, maximum = 30, default = 10)]
    pub limit: Option<i64>,
}

impl PickupPointListParams {
    pub fn into_query(self) -> PickupPointQuery {
        PickupPointQuery {
            start_date: self.start_date,
            end_date: self.end_date,
            page: self.page.unwrap_or(DEFAULT_PAGE),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PickupPointResponse {
    pub id: Uuid,
    #[schema(value_type = String, format = DateTime)]
    pub registration_date: Timestamp,
    pub city: City,
}

impl From<PickupPoint> for PickupPointResponse {
    fn from(point: PickupPoint) -> Self {
        Self {
            id: point.id,
            registration_date: point.registration_date,
            city: point.city,
        }
    }
}

/// A reception with its products in insertion order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReceptionWithProductsResponse {
    pub reception: ReceptionResponse,
    pub products: Vec<ProductResponse>,
}

impl From<ReceptionWithProducts> for ReceptionWithProductsResponse {
    fn from(entry: ReceptionWithProducts) -> Self {
        Self {
            reception: entry.reception.into(),
            products: entry.products.into_iter().map(Into::into).collect(),
        }
    }
}

/// One item of the aggregated listing.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PickupPointWithReceptionsResponse {
    pub pvz: PickupPointResponse,
    pub receptions: Vec<ReceptionWithProductsResponse>,
}

impl From<PickupPointWithReceptions> for PickupPointWithReceptionsResponse {
    fn from(entry: PickupPointWithReceptions) -> Self {
        Self {
            pvz: entry.pickup_point.into(),
            receptions: entry.receptions.into_iter().map(Into::into).collect(),
        }
    }
}
