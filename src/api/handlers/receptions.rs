//! Reception handlers.

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::RECEPTION_TAG;
use crate::api::dto::{CreateReceptionRequest, ErrorResponse, ReceptionResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

pub fn reception_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(create_reception))
}

/// POST /receptions - Open a reception at a pickup point
#[utoipa::path(
    post,
    path = "/receptions",
    tag = RECEPTION_TAG,
    request_body = CreateReceptionRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Reception opened", body = ReceptionResponse),
        (status = 403, description = "Employee role required", body = ErrorResponse),
        (status = 404, description = "Pickup point not found", body = ErrorResponse),
        (status = 409, description = "A reception is already open", body = ErrorResponse)
    )
)]
async fn create_reception(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateReceptionRequest>,
) -> AppResult<(StatusCode, Json<ReceptionResponse>)> {
    user.require_role(&[UserRole::Employee])?;

    let reception = state
        .services
        .receptions
        .create_reception(payload.pvz_id)
        .await?;

    Ok((StatusCode::CREATED, Json(reception.into())))
}
