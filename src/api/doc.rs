use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const AUTH_TAG: &str = "Auth";
pub const PVZ_TAG: &str = "Pickup points";
pub const RECEPTION_TAG: &str = "Receptions";
pub const PRODUCT_TAG: &str = "Products";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PVZ service",
        description = "Pickup point reception workflow API",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::models::City,
            crate::models::ProductType,
            crate::models::ReceptionStatus,
            crate::models::UserRole,
        )
    ),
    tags(
        (name = AUTH_TAG, description = "Registration and token endpoints"),
        (name = PVZ_TAG, description = "Pickup point endpoints"),
        (name = RECEPTION_TAG, description = "Reception endpoints"),
        (name = PRODUCT_TAG, description = "Product endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer Token Authentication"))
                        .build(),
                ),
            )
        }
    }
}
