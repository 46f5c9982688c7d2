//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the registration and health endpoints together with
//! the schema wrappers from [`crate::inbound::http::schemas`]. The document
//! backs Swagger UI in debug builds and is exported by the `openapi-dump`
//! binary.

use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, RegistrationRequest, RegistrationSchema, UserRecordSchema,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registration service API",
        description = "User registration with validated fields and salted password hashes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::registration::register,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        RegistrationRequest,
        RegistrationSchema,
        UserRecordSchema,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "registration", description = "Account registration"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
