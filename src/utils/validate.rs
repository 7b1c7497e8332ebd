//! Extractors that deserialize and then run `validator` rules.

use axum::extract::{
    rejection::{JsonRejection, QueryRejection},
    FromRequest, FromRequestParts, Json, Query, Request,
};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::error::{AppError, AppResult, ValidationFieldError};

/// JSON body that passed its `Validate` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

/// Query string that passed its `Validate` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut errors: Vec<ValidationFieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| ValidationFieldError {
                    field: field.to_string(),
                    message: failure
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| failure.code.to_string()),
                })
            })
            .collect();
        errors.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationErrors { errors }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> AppResult<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> AppResult<Self> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(email(message = "Invalid email format"))]
        email: String,
        #[validate(length(min = 1, message = "Password must not be empty"))]
        password: String,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct TestQuery {
        #[validate(range(min = 1, max = 30, message = "limit must be between 1 and 30"))]
        limit: i64,
    }

    fn json_request(body: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri("/test")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_json() {
        let request = json_request(r#"{"email":"a@b.com","password":"x"}"#);
        let ValidatedJson(body) = ValidatedJson::<TestBody>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(body.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_invalid_json_fields_are_collected() {
        let request = json_request(r#"{"email":"nope","password":""}"#);
        match ValidatedJson::<TestBody>::from_request(request, &()).await {
            Err(AppError::ValidationErrors { errors }) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
                assert_eq!(errors[0].message, "Invalid email format");
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = json_request(r#"{"email":"#);
        let result = ValidatedJson::<TestBody>::from_request(request, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_query_out_of_range() {
        let (mut parts, _) = Request::builder()
            .uri("/test?limit=31")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let result = ValidatedQuery::<TestQuery>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::ValidationErrors { .. })));
    }

    #[tokio::test]
    async fn test_query_with_wrong_type_is_bad_request() {
        let (mut parts, _) = Request::builder()
            .uri("/test?limit=abc")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let result = ValidatedQuery::<TestQuery>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest { .. })));
    }
}
