//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod auth;
pub mod health;
pub mod metrics;
pub mod pickup_points;
pub mod products;
pub mod receptions;
