//! HTTP surface: camelCase DTOs, role-checked handlers, middleware and the
//! OpenAPI document served at `/api-docs/openapi.json`.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
mod doc;

pub use doc::ApiDoc;
