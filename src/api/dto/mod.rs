//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `auth` - registration, login and token DTOs
//! - `pickup_point` - pickup points and the aggregated listing
//! - `reception` / `product` - reception workflow DTOs
//! - `health` - health check responses
//! - `error` - common error response DTO

mod auth;
mod error;
mod health;
mod pickup_point;
mod product;
mod reception;

pub use auth::{DummyLoginRequest, LoginRequest, RegisterRequest, TokenResponse, UserResponse};
pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pickup_point::{
    CreatePickupPointRequest, PickupPointListParams, PickupPointResponse,
    PickupPointWithReceptionsResponse, ReceptionWithProductsResponse,
};
pub use product::{CreateProductRequest, ProductResponse};
pub use reception::{CreateReceptionRequest, ReceptionResponse};
