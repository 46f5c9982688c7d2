//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The body is neither JSON nor form-encoded.
    #[schema(rename = "unsupported_media_type")]
    UnsupportedMediaType,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Invalid age.")]
    error: String,
    /// Correlation identifier echoed from the `trace-id` header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Offending field and a machine-readable reason.
    #[schema(value_type = Object, example = json!({"field": "age", "code": "invalid_field"}))]
    details: Option<serde_json::Value>,
}

/// Registration submission.
///
/// Any further scalar fields (`firstname`, `age`, `address`, ...) are
/// accepted and validated when a rule exists for them.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RegistrationRequest {
    #[schema(example = "alice1234")]
    username: String,
    #[schema(example = "a@b.com")]
    email: String,
    #[schema(example = "Abcdef1!")]
    password: String,
}

/// OpenAPI schema for [`crate::domain::UserRecord`].
#[derive(ToSchema)]
#[schema(as = crate::domain::UserRecord)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserRecordSchema {
    /// Submitted value; a numeric JSON username is echoed as a number.
    #[schema(example = "alice1234")]
    username: String,
    #[schema(example = "a@b.com")]
    email: String,
    /// PBKDF2-SHA512 digest, 128 lowercase hex characters.
    password: String,
    /// Salt the digest was derived with.
    #[schema(rename = "passwordSalt", example = "$2b$10$0f1e2d3c4b5a69788796a5b4c3d2e1f0")]
    password_salt: String,
}

/// OpenAPI schema for [`crate::domain::Registration`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Registration)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RegistrationSchema {
    #[schema(example = "Registration successful")]
    message: String,
    user: UserRecordSchema,
}
