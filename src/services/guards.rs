//! Preconditions shared by the workflow services.

use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{PickupPoint, Reception};
use crate::repositories::{PickupPointRepository, ReceptionRepository};

pub(super) async fn ensure_pickup_point(
    pickup_points: &dyn PickupPointRepository,
    pvz_id: Uuid,
) -> AppResult<PickupPoint> {
    pickup_points
        .find_by_id(pvz_id)
        .await?
        .ok_or_else(|| AppError::pickup_point_not_found(pvz_id))
}

/// The latest reception of the pickup point, provided it is still open.
pub(super) async fn require_open_reception(
    receptions: &dyn ReceptionRepository,
    pvz_id: Uuid,
) -> AppResult<Reception> {
    match receptions.find_latest_by_pvz(pvz_id).await? {
        Some(reception) if reception.is_open() => Ok(reception),
        _ => {
            tracing::warn!(pvz_id = %pvz_id, "No active reception");
            Err(AppError::NoActiveReception { pvz_id })
        }
    }
}
