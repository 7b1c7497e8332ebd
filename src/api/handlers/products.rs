//! Product handlers.

use axum::{Extension, Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{CreateProductRequest, ErrorResponse, ProductResponse};
use crate::api::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

pub fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(add_product))
}

/// POST /products - Add a product to the open reception
#[utoipa::path(
    post,
    path = "/products",
    tag = PRODUCT_TAG,
    request_body = CreateProductRequest,
    security(("bearerAuth" = [])),
    responses(
        (status = 201, description = "Product added", body = ProductResponse),
        (status = 400, description = "Unknown type or no active reception", body = ErrorResponse),
        (status = 403, description = "Employee role required", body = ErrorResponse),
        (status = 404, description = "Pickup point not found", body = ErrorResponse)
    )
)]
async fn add_product(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    user.require_role(&[UserRole::Employee])?;

    let product = state
        .services
        .products
        .add_product(&payload.product_type, payload.pvz_id)
        .await?;

    Ok((StatusCode::CREATED, Json(product.into())))
}
