//! Product DTOs.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Product, ProductType};

/// Request body for adding a product to the open reception.
///
/// `type` stays a string here so an unknown category is reported as a
/// field validation error rather than a JSON parse failure.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(rename = "type")]
    #[schema(example = "электроника")]
    pub product_type: String,
    pub pvz_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    #[schema(value_type = String, format = DateTime)]
    pub date_time: Timestamp,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub reception_id: Uuid,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            date_time: product.date_time,
            product_type: product.product_type,
            reception_id: product.reception_id,
        }
    }
}
