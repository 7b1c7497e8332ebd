//! Authentication handlers: registration, login and dummy login.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{
    DummyLoginRequest, ErrorResponse, LoginRequest, RegisterRequest, TokenResponse, UserResponse,
};
use crate::error::AppResult;
use crate::models::UserRole;
use crate::state::AppState;
use crate::utils::jwt::{DUMMY_SUBJECT, generate_token};
use crate::utils::validate::ValidatedJson;

/// Creates the authentication routes
///
/// # Routes
/// - `POST /register` - Create an account
/// - `POST /login` - Exchange credentials for a token
/// - `POST /dummyLogin` - Token for a role without an account
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(register))
        .routes(routes!(login))
        .routes(routes!(dummy_login))
}

/// POST /register - Register new user
#[utoipa::path(
    post,
    path = "/register",
    tag = AUTH_TAG,
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid email, password or role", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let role: UserRole = payload.role.parse()?;
    let user = state
        .services
        .users
        .register(&payload.email, &payload.password, role)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /login - Authenticate user
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Malformed request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let user = state
        .services
        .users
        .login(&payload.email, &payload.password)
        .await?;

    let token = generate_token(
        user.id.to_string(),
        user.role,
        &state.jwt_config.secret,
        state.jwt_config.token_expiration,
    )?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse { token }))
}

/// POST /dummyLogin - Token for a role
///
/// Issues a token that carries only the requested role.
#[utoipa::path(
    post,
    path = "/dummyLogin",
    tag = AUTH_TAG,
    request_body = DummyLoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unknown role", body = ErrorResponse)
    )
)]
async fn dummy_login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DummyLoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let role: UserRole = payload.role.parse()?;
    let token = generate_token(
        DUMMY_SUBJECT,
        role,
        &state.jwt_config.secret,
        state.jwt_config.token_expiration,
    )?;

    Ok(Json(TokenResponse { token }))
}
