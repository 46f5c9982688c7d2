//! Tests for the registration service.

use std::cell::RefCell;
use std::sync::Arc;

use rstest::rstest;
use rstest_bdd_macros::{given, then, when};
use serde_json::{Value, json};

use super::*;
use crate::domain::ports::MockUserStore;
use crate::domain::{
    ErrorCode, HashingMode, PASSWORD_SALT_FIELD, REGISTRATION_SUCCESS_MESSAGE, UnknownFieldPolicy,
    compare_password,
};

fn make_service(store: MockUserStore) -> RegistrationService<MockUserStore> {
    RegistrationService::new(Arc::new(store))
}

fn accepting_store() -> MockUserStore {
    let mut store = MockUserStore::new();
    store.expect_save().times(1).returning(|_| Ok(()));
    store
}

fn untouched_store() -> MockUserStore {
    let mut store = MockUserStore::new();
    store.expect_save().times(0);
    store
}

fn valid_input(extra: Value) -> RegistrationInput {
    let mut body = json!({
        "username": "alice1234",
        "email": "a@b.com",
        "password": "Abcdef1!",
    });
    if let (Some(body), Value::Object(extra)) = (body.as_object_mut(), extra) {
        body.extend(extra);
    }
    match body {
        Value::Object(map) => RegistrationInput::from(map),
        other => panic!("expected an object, got {other}"),
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
        .block_on(future)
}

/// A submission paired with the store expectations it should meet.
///
/// The store is handed to the service once, so it sits behind a `RefCell`.
struct Submission {
    input: RegistrationInput,
    store: RefCell<Option<MockUserStore>>,
}

impl Submission {
    fn new(input: RegistrationInput, store: MockUserStore) -> Self {
        Self {
            input,
            store: RefCell::new(Some(store)),
        }
    }
}

#[given("a complete registration submission")]
fn a_complete_registration_submission() -> Submission {
    Submission::new(valid_input(json!({ "age": "25" })), accepting_store())
}

#[given("a submission without an email")]
fn a_submission_without_an_email() -> Submission {
    Submission::new(
        RegistrationInput::from_pairs([("username", "alice1234"), ("password", "Abcdef1!")]),
        untouched_store(),
    )
}

#[when("the registration service handles it")]
fn the_registration_service_handles_it(
    submission: &Submission,
) -> Result<Registration, RegistrationError> {
    let store = submission
        .store
        .borrow_mut()
        .take()
        .expect("each submission is handled once");
    block_on(make_service(store).register(submission.input.clone()))
}

#[then("the stored user carries a hashed password")]
fn the_stored_user_carries_a_hashed_password(outcome: Result<Registration, RegistrationError>) {
    let registration = outcome.expect("registration succeeds");
    assert_eq!(registration.message, REGISTRATION_SUCCESS_MESSAGE);
    assert_eq!(registration.user.password().as_str().len(), 128);
    assert_ne!(registration.user.password().as_str(), "Abcdef1!");
    assert!(registration.user.credential().verify("Abcdef1!"));
}

#[then("the submission is refused as incomplete")]
fn the_submission_is_refused_as_incomplete(outcome: Result<Registration, RegistrationError>) {
    assert_eq!(
        outcome.expect_err("missing field"),
        RegistrationError::MissingField {
            fields: vec!["email".to_owned()],
        }
    );
}

#[rstest]
fn registers_complete_submission() {
    let submission = a_complete_registration_submission();
    let outcome = the_registration_service_handles_it(&submission);
    the_stored_user_carries_a_hashed_password(outcome);
}

#[rstest]
fn refuses_incomplete_submission_without_storing() {
    let submission = a_submission_without_an_email();
    let outcome = the_registration_service_handles_it(&submission);
    the_submission_is_refused_as_incomplete(outcome);
}

#[rstest]
#[case(json!({ "username": "", "email": "a@b.com", "password": "Abcdef1!" }), vec!["username"])]
#[case(json!({ "username": "alice1234", "email": null, "password": false }), vec!["email", "password"])]
#[case(json!({ "username": 0, "email": "a@b.com" }), vec!["username", "password"])]
#[tokio::test]
async fn blank_required_fields_are_missing(#[case] body: Value, #[case] expected: Vec<&str>) {
    let Value::Object(map) = body else {
        panic!("case bodies are objects");
    };
    let err = make_service(untouched_store())
        .register(RegistrationInput::from(map))
        .await
        .expect_err("missing fields");

    assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
    assert_eq!(
        err,
        RegistrationError::MissingField {
            fields: expected.into_iter().map(str::to_owned).collect(),
        }
    );
}

#[rstest]
#[case(json!({ "username": "short" }), "username")]
#[case(json!({ "password": "alllowercase1!" }), "password")]
#[case(json!({ "email": "not-an-email" }), "email")]
#[case(json!({ "age": "17" }), "age")]
#[case(json!({ "gender": "robot", "age": "5" }), "gender")]
#[case(json!({ "passwordSalt": "$2b$10$00000000000000000000000000000000" }), "passwordSalt")]
#[tokio::test]
async fn invalid_fields_never_reach_storage(#[case] overrides: Value, #[case] field: &str) {
    let err = make_service(untouched_store())
        .register(valid_input(overrides))
        .await
        .expect_err("invalid field");

    assert_eq!(
        err,
        RegistrationError::InvalidField {
            field: field.to_owned(),
            reason: format!("Invalid {field}."),
        }
    );
}

#[tokio::test]
async fn record_keeps_additional_fields_in_order_without_plaintext() {
    let input = valid_input(json!({ "unknownField": "anything", "age": "25" }));

    let registration = make_service(accepting_store())
        .register(input)
        .await
        .expect("registration succeeds");

    let user = serde_json::to_value(&registration.user).expect("record serialises");
    let keys: Vec<&str> = user
        .as_object()
        .expect("record is an object")
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        keys,
        [
            "username",
            "email",
            "password",
            PASSWORD_SALT_FIELD,
            "unknownField",
            "age"
        ]
    );
    assert!(!user.to_string().contains("Abcdef1!"));

    let stored = registration.user.credential().to_string();
    assert!(compare_password("Abcdef1!", &stored));
    assert!(!compare_password("Abcdef1?", &stored));
}

#[tokio::test]
async fn reject_policy_refuses_unknown_fields() {
    let service = RegistrationService::with_parts(
        Arc::new(untouched_store()),
        CredentialHasher::default(),
        RegistrationValidator::new(UnknownFieldPolicy::Reject),
    );

    let err = service
        .register(valid_input(json!({ "unknownField": "anything" })))
        .await
        .expect_err("unknown field refused");

    assert!(matches!(
        err,
        RegistrationError::InvalidField { ref field, .. } if field == "unknownField"
    ));
}

#[rstest]
#[case(HashingMode::Blocking)]
#[case(HashingMode::Suspending)]
#[tokio::test]
async fn hashing_modes_produce_identically_shaped_records(#[case] mode: HashingMode) {
    let service = RegistrationService::with_parts(
        Arc::new(accepting_store()),
        CredentialHasher::new(mode, 10),
        RegistrationValidator::default(),
    );

    let registration = service
        .register(valid_input(json!({})))
        .await
        .expect("registration succeeds");

    assert_eq!(registration.user.password_salt().rounds(), 10);
    assert_eq!(registration.user.password().as_str().len(), 128);
    assert!(registration.user.credential().verify("Abcdef1!"));
}

#[tokio::test]
async fn store_receives_the_returned_record() {
    let mut store = MockUserStore::new();
    store
        .expect_save()
        .withf(|record| record.username() == "alice1234" && record.email() == "a@b.com")
        .times(1)
        .returning(|_| Ok(()));

    make_service(store)
        .register(valid_input(json!({})))
        .await
        .expect("registration succeeds");
}

#[tokio::test]
async fn storage_failure_surfaces_as_storage_error() {
    let mut store = MockUserStore::new();
    store
        .expect_save()
        .times(1)
        .return_once(|_| Err(UserStoreError::write("disk full")));

    let err = make_service(store)
        .register(valid_input(json!({})))
        .await
        .expect_err("storage failure");

    assert_eq!(err, RegistrationError::Storage(UserStoreError::write("disk full")));
}

#[tokio::test]
async fn command_port_redacts_storage_failures() {
    let mut store = MockUserStore::new();
    store
        .expect_save()
        .return_once(|_| Err(UserStoreError::connection("refused")));
    let service = make_service(store);

    let err = RegistrationCommand::register(&service, valid_input(json!({})))
        .await
        .expect_err("storage failure");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), INTERNAL_ERROR_MESSAGE);
    assert!(err.details().is_none());
}

#[tokio::test]
async fn command_port_names_the_invalid_field() {
    let service = make_service(untouched_store());

    let err = RegistrationCommand::register(&service, valid_input(json!({ "age": "17" })))
        .await
        .expect_err("invalid age");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), "Invalid age.");
    assert_eq!(
        err.details(),
        Some(&json!({ "field": "age", "code": "invalid_field" }))
    );
}

#[tokio::test]
async fn command_port_lists_missing_fields() {
    let service = make_service(untouched_store());

    let err = RegistrationCommand::register(&service, RegistrationInput::default())
        .await
        .expect_err("missing fields");

    assert_eq!(err.message(), MISSING_FIELDS_MESSAGE);
    assert_eq!(
        err.details(),
        Some(&json!({
            "field": "username",
            "fields": ["username", "email", "password"],
            "code": "missing_field",
        }))
    );
}
