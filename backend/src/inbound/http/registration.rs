//! Registration API handler.
//!
//! ```text
//! POST /register {"username":"alice1234","email":"a@b.com","password":"Abcdef1!","age":"25"}
//! POST /register username=alice1234&email=a%40b.com&password=Abcdef1%21
//! ```

use actix_web::{HttpMessage, HttpRequest, HttpResponse, post, web};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{Error, RegistrationInput};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RegistrationRequest, RegistrationSchema};
use crate::inbound::http::state::HttpState;

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Decode a request body into ordered registration fields.
///
/// JSON bodies must be a single object; its keys keep their textual order.
/// Form bodies keep pair order, and a repeated key keeps the last value.
/// Media types compare case-insensitively and ignore any parameters.
///
/// # Examples
/// ```
/// use backend::inbound::http::registration::decode_registration;
///
/// let input = decode_registration("application/x-www-form-urlencoded", b"username=alice1234&age=25")
///     .expect("form decodes");
/// assert_eq!(input.get("age").and_then(|value| value.as_str()), Some("25"));
/// ```
pub fn decode_registration(content_type: &str, body: &[u8]) -> Result<RegistrationInput, Error> {
    let essence = content_type
        .split_once(';')
        .map_or(content_type, |(essence, _)| essence)
        .trim();
    if essence.eq_ignore_ascii_case(JSON_CONTENT_TYPE) {
        decode_json(body)
    } else if essence.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        Ok(RegistrationInput::from_pairs(
            url::form_urlencoded::parse(body).map(|(name, value)| (name.into_owned(), value.into_owned())),
        ))
    } else {
        Err(unsupported_media_type(essence))
    }
}

fn decode_json(body: &[u8]) -> Result<RegistrationInput, Error> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(RegistrationInput::from(fields)),
        Ok(_) => Err(malformed_body("request body must be a JSON object")),
        Err(err) => {
            debug!(error = %err, "registration body is not valid JSON");
            Err(malformed_body("request body is not valid JSON"))
        }
    }
}

fn unsupported_media_type(essence: &str) -> Error {
    Error::unsupported_media_type(format!(
        "unsupported content type: {}",
        if essence.is_empty() { "none" } else { essence }
    ))
    .with_details(json!({
        "accepted": [JSON_CONTENT_TYPE, FORM_CONTENT_TYPE],
        "code": "unsupported_media_type",
    }))
}

fn malformed_body(message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({ "code": "malformed_body" }))
}

/// Register a new user.
///
/// Validates the submission, hashes the password and stores the record. The
/// response echoes the stored record, digest and salt included.
#[utoipa::path(
    post,
    path = "/register",
    request_body(
        content(
            (RegistrationRequest = "application/json"),
            (RegistrationRequest = "application/x-www-form-urlencoded")
        ),
        description = "Required credentials plus optional profile fields"
    ),
    responses(
        (status = 201, description = "User registered", body = RegistrationSchema),
        (status = 400, description = "Missing or invalid field", body = ErrorSchema),
        (status = 415, description = "Unsupported content type", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["registration"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let input = decode_registration(request.content_type(), &body)?;
    let registration = state.registration.register(input).await?;
    Ok(HttpResponse::Created().json(registration))
}
