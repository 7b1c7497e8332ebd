use diesel_derive_enum::DbEnum;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Product, Reception};

/// Cities where pickup points may be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::City")]
pub enum City {
    #[serde(rename = "Москва")]
    Moscow,
    #[serde(rename = "Санкт-Петербург")]
    SaintPetersburg,
    #[serde(rename = "Казань")]
    Kazan,
}

impl City {
    pub const ALL: [City; 3] = [City::Moscow, City::SaintPetersburg, City::Kazan];

    pub fn as_str(&self) -> &'static str {
        match self {
            City::Moscow => "Москва",
            City::SaintPetersburg => "Санкт-Петербург",
            City::Kazan => "Казань",
        }
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for City {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        City::ALL
            .into_iter()
            .find(|city| city.as_str() == s)
            .ok_or_else(|| AppError::Validation {
                field: "city".to_string(),
                reason: format!("unsupported city '{}'", s),
            })
    }
}

/// A registered pickup point. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupPoint {
    pub id: Uuid,
    pub registration_date: Timestamp,
    pub city: City,
}

/// A reception together with its products, oldest product first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceptionWithProducts {
    pub reception: Reception,
    pub products: Vec<Product>,
}

/// A pickup point together with its receptions, oldest reception first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupPointWithReceptions {
    pub pickup_point: PickupPoint,
    pub receptions: Vec<ReceptionWithProducts>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_city_parses_known_names() {
        assert_eq!("Москва".parse::<City>().unwrap(), City::Moscow);
        assert_eq!("Санкт-Петербург".parse::<City>().unwrap(), City::SaintPetersburg);
        assert_eq!("Казань".parse::<City>().unwrap(), City::Kazan);
    }

    #[test]
    fn test_city_rejects_unknown_name() {
        match "Новосибирск".parse::<City>() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "city"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_city_serializes_to_display_name() {
        let json = serde_json::to_string(&City::SaintPetersburg).unwrap();
        assert_eq!(json, "\"Санкт-Петербург\"");
    }
}
