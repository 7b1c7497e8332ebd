//! Pickup point handlers, including the reception close and product undo
//! actions addressed by pickup point.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use uuid::Uuid;

use crate::api::doc::PVZ_TAG;
use crate::api::dto::{
    CreatePickupPointRequest, ErrorResponse, PickupPointListParams, PickupPointResponse,
    PickupPointWithReceptionsResponse, ReceptionResponse,
};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::validate::{ValidatedJson, ValidatedQuery};

/// Creates pickup point routes. All of them require authentication.
///
/// # Routes
/// - `POST /pvz` - Register a pickup point (moderator)
/// - `GET /pvz` - Paged listing with receptions and products
/// - `GET /pvz/all` - Every pickup point
/// - `POST /pvz/{pvzId}/close_last_reception` (employee)
/// - `POST /pvz/{pvzId}/delete_last_product` (employee)
pub fn pickup_point_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(create_pickup_point, list_pickup_points))
        .routes(routes!(list_all_pickup_points))
        .routes(routes!(close_last_reception))
        .routes(routes!(delete_last_product))
}

/// POST /pvz - Register a pickup point
#[utoipa::path(
    post,
    path = "/pvz",
    tag = PVZ_TAG,
    request_body = CreatePickupPointRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Pickup point created", body = PickupPointResponse),
        (status = 400, description = "Unsupported city", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Moderator role required", body = ErrorResponse)
    )
)]
async fn create_pickup_point(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreatePickupPointRequest>,
) -> AppResult<(StatusCode, Json<PickupPointResponse>)> {
    user.require_role(&[UserRole::Moderator])?;

    let point = state
        .services
        .pickup_points
        .create_pickup_point(&payload.city)
        .await?;

    Ok((StatusCode::CREATED, Json(point.into())))
}

/// GET /pvz - Pickup points with receptions and products
///
/// Pickup points are paged newest first. With `startDate`/`endDate`, only
/// receptions holding products from that window are shown, and pickup points
/// left without any are omitted from the page.
#[utoipa::path(
    get,
    path = "/pvz",
    tag = PVZ_TAG,
    params(PickupPointListParams),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "One page of pickup points", body = [PickupPointWithReceptionsResponse]),
        (status = 400, description = "Invalid paging or date range", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse)
    )
)]
async fn list_pickup_points(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedQuery(params): ValidatedQuery<PickupPointListParams>,
) -> AppResult<Json<Vec<PickupPointWithReceptionsResponse>>> {
    user.require_role(&[UserRole::Employee, UserRole::Moderator])?;

    let page = state
        .services
        .pickup_points
        .list_with_receptions(params.into_query())
        .await?;

    Ok(Json(page.into_iter().map(Into::into).collect()))
}

/// GET /pvz/all - Every pickup point, newest first
#[utoipa::path(
    get,
    path = "/pvz/all",
    tag = PVZ_TAG,
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "All pickup points", body = [PickupPointResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse)
    )
)]
async fn list_all_pickup_points(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<Vec<PickupPointResponse>>> {
    user.require_role(&[UserRole::Employee, UserRole::Moderator])?;

    let points = state.services.pickup_points.list_all().await?;
    Ok(Json(points.into_iter().map(Into::into).collect()))
}

/// POST /pvz/{pvzId}/close_last_reception - Close the open reception
#[utoipa::path(
    post,
    path = "/pvz/{pvzId}/close_last_reception",
    tag = PVZ_TAG,
    params(("pvzId" = Uuid, Path, description = "Pickup point ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Reception closed", body = ReceptionResponse),
        (status = 400, description = "No active reception", body = ErrorResponse),
        (status = 403, description = "Employee role required", body = ErrorResponse),
        (status = 404, description = "Pickup point not found", body = ErrorResponse)
    )
)]
async fn close_last_reception(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pvz_id): Path<Uuid>,
) -> AppResult<Json<ReceptionResponse>> {
    user.require_role(&[UserRole::Employee])?;

    let reception = state
        .services
        .pickup_points
        .close_last_reception(pvz_id)
        .await?;

    Ok(Json(reception.into()))
}

/// POST /pvz/{pvzId}/delete_last_product - Undo the latest product
#[utoipa::path(
    post,
    path = "/pvz/{pvzId}/delete_last_product",
    tag = PVZ_TAG,
    params(("pvzId" = Uuid, Path, description = "Pickup point ID")),
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, description = "No active reception or nothing to delete", body = ErrorResponse),
        (status = 403, description = "Employee role required", body = ErrorResponse),
        (status = 404, description = "Pickup point not found", body = ErrorResponse)
    )
)]
async fn delete_last_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(pvz_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_role(&[UserRole::Employee])?;

    state
        .services
        .pickup_points
        .delete_last_product(pvz_id)
        .await?;

    Ok(StatusCode::OK)
}
