//! Reception lifecycle: opening a reception at a pickup point.

use std::sync::Arc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Reception;
use crate::repositories::{PickupPointRepository, ReceptionRepository};
use crate::services::guards::ensure_pickup_point;
use crate::telemetry;

#[derive(Clone)]
pub struct ReceptionService {
    pickup_points: Arc<dyn PickupPointRepository>,
    receptions: Arc<dyn ReceptionRepository>,
}

impl ReceptionService {
    pub fn new(
        pickup_points: Arc<dyn PickupPointRepository>,
        receptions: Arc<dyn ReceptionRepository>,
    ) -> Self {
        Self {
            pickup_points,
            receptions,
        }
    }

    /// Opens a new reception.
    ///
    /// # Errors
    /// - `NotFound` if the pickup point does not exist
    /// - `ReceptionAlreadyOpen` if its latest reception is still in progress,
    ///   including when a concurrent request opened one first
    pub async fn create_reception(&self, pvz_id: Uuid) -> AppResult<Reception> {
        ensure_pickup_point(self.pickup_points.as_ref(), pvz_id).await?;

        if let Some(latest) = self.receptions.find_latest_by_pvz(pvz_id).await? {
            if latest.is_open() {
                tracing::warn!(pvz_id = %pvz_id, reception_id = %latest.id, "Reception already open");
                return Err(AppError::ReceptionAlreadyOpen { pvz_id });
            }
        }

        let reception = self.receptions.create_open(pvz_id).await?;
        tracing::info!(pvz_id = %pvz_id, reception_id = %reception.id, "Reception opened");
        telemetry::reception_created();
        Ok(reception)
    }
}
