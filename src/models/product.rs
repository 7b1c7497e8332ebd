use diesel_derive_enum::DbEnum;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Product categories accepted at pickup points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ProductType")]
pub enum ProductType {
    #[serde(rename = "электроника")]
    Electronics,
    #[serde(rename = "одежда")]
    Clothes,
    #[serde(rename = "обувь")]
    Shoes,
}

impl ProductType {
    pub const ALL: [ProductType; 3] = [
        ProductType::Electronics,
        ProductType::Clothes,
        ProductType::Shoes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Electronics => "электроника",
            ProductType::Clothes => "одежда",
            ProductType::Shoes => "обувь",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| AppError::Validation {
                field: "type".to_string(),
                reason: format!("unsupported product type '{}'", s),
            })
    }
}

/// A single item accepted within a reception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub date_time: Timestamp,
    pub product_type: ProductType,
    pub reception_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_type_round_trips_through_str() {
        for product_type in ProductType::ALL {
            assert_eq!(product_type.as_str().parse::<ProductType>().unwrap(), product_type);
        }
    }

    #[test]
    fn test_product_type_rejects_unknown() {
        assert!(matches!(
            "мебель".parse::<ProductType>(),
            Err(AppError::Validation { .. })
        ));
    }
}
