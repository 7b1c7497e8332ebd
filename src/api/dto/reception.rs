//! Reception DTOs.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{Reception, ReceptionStatus};

/// Request body for opening a reception.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceptionRequest {
    pub pvz_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionResponse {
    pub id: Uuid,
    #[schema(value_type = String, format = DateTime)]
    pub date_time: Timestamp,
    pub pvz_id: Uuid,
    pub status: ReceptionStatus,
}

impl From<Reception> for ReceptionResponse {
    fn from(reception: Reception) -> Self {
        Self {
            id: reception.id,
            date_time: reception.date_time,
            pvz_id: reception.pvz_id,
            status: reception.status,
        }
    }
}
