//! Validation and serialisation coverage for the user model.

use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::Value;

use super::{
    Age, EmailAddress, NewUser, User, UserId, UserName, UserPatch, UserValidationError,
    USER_NAME_MAX,
};

const VALID_ID: &str = "66f1a0b2c3d4e5f6a7b8c9d0";

fn sample_user() -> User {
    User::new(
        UserId::new(VALID_ID).expect("valid id"),
        UserName::new("Ada Lovelace").expect("valid name"),
        EmailAddress::new("ada@example.com").expect("valid email"),
        Some(Age::new(36).expect("valid age")),
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 30, 0).single().expect("valid timestamp"),
    )
}

#[rstest]
#[case("", UserValidationError::EmptyId)]
#[case("not-hex", UserValidationError::InvalidId)]
#[case("66F1A0B2C3D4E5F6A7B8C9D0", UserValidationError::InvalidId)] // uppercase
#[case("66f1a0b2c3d4e5f6a7b8c9", UserValidationError::InvalidId)] // too short
#[case(" 66f1a0b2c3d4e5f6a7b8c9d0", UserValidationError::InvalidId)] // padding
fn user_id_rejects_malformed_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserId::new(raw), Err(expected));
}

#[test]
fn user_id_accepts_store_shaped_hex() {
    let id = UserId::new(VALID_ID).expect("valid id");
    assert_eq!(id.as_ref(), VALID_ID);
    assert_eq!(id.to_string(), VALID_ID);
}

#[rstest]
#[case("", UserValidationError::EmptyName)]
#[case("   ", UserValidationError::EmptyName)]
fn user_name_rejects_blank_input(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(UserName::new(raw), Err(expected));
}

#[test]
fn user_name_is_trimmed() {
    let name = UserName::new("  Ada  ").expect("valid name");
    assert_eq!(name.as_ref(), "Ada");
}

#[test]
fn user_name_enforces_maximum_length() {
    let long = "x".repeat(USER_NAME_MAX + 1);
    assert_eq!(
        UserName::new(long),
        Err(UserValidationError::NameTooLong { max: USER_NAME_MAX })
    );
}

#[rstest]
#[case("plainaddress")]
#[case("@no-local.example.com")]
#[case("two@@example.com")]
#[case("spaces in@example.com")]
#[case("no-domain-dot@example")]
fn email_rejects_malformed_input(#[case] raw: &str) {
    assert_eq!(
        EmailAddress::new(raw),
        Err(UserValidationError::InvalidEmail)
    );
}

#[rstest]
#[case("a@x.com")]
#[case("first.last+tag@sub.example.co.uk")]
fn email_accepts_common_shapes(#[case] raw: &str) {
    assert!(EmailAddress::new(raw).is_ok());
}

#[test]
fn age_rejects_implausible_values() {
    assert!(Age::new(150).is_ok());
    assert_eq!(
        Age::new(151),
        Err(UserValidationError::AgeOutOfRange { max: 150 })
    );
}

#[test]
fn user_serialises_camel_case_and_omits_absent_age() {
    let value = serde_json::to_value(sample_user()).expect("serialise user");
    assert_eq!(value.get("id").and_then(Value::as_str), Some(VALID_ID));
    assert_eq!(
        value.get("name").and_then(Value::as_str),
        Some("Ada Lovelace")
    );
    assert!(value.get("createdAt").is_some());
    assert!(value.get("created_at").is_none());

    let without_age = User::new(
        UserId::new(VALID_ID).expect("valid id"),
        UserName::new("Ada").expect("valid name"),
        EmailAddress::new("ada@example.com").expect("valid email"),
        None,
        Utc::now(),
    );
    let value = serde_json::to_value(without_age).expect("serialise user");
    assert!(value.get("age").is_none());
}

#[test]
fn user_round_trips_through_json() {
    let user = sample_user();
    let json = serde_json::to_string(&user).expect("serialise user");
    let back: User = serde_json::from_str(&json).expect("deserialise user");
    assert_eq!(back, user);
}

#[test]
fn user_deserialisation_revalidates_fields() {
    let malformed = format!(
        r#"{{"id":"{VALID_ID}","name":"","email":"ada@example.com","createdAt":"2026-01-15T09:30:00Z"}}"#
    );
    let result: Result<User, _> = serde_json::from_str(&malformed);
    assert!(result.is_err());
}

#[test]
fn patch_requires_at_least_one_field() {
    assert_eq!(
        UserPatch::new(None, None, None),
        Err(UserValidationError::EmptyPatch)
    );
    let patch = UserPatch::new(Some(UserName::new("Alicia").expect("valid name")), None, None)
        .expect("valid patch");
    assert_eq!(patch.name().map(AsRef::as_ref), Some("Alicia"));
    assert!(patch.email().is_none());
}

#[test]
fn new_user_exposes_its_components() {
    let new_user = NewUser::new(
        UserName::new("Ada").expect("valid name"),
        EmailAddress::new("ada@example.com").expect("valid email"),
        None,
    );
    assert_eq!(new_user.name().as_ref(), "Ada");
    assert_eq!(new_user.email().as_ref(), "ada@example.com");
    assert!(new_user.age().is_none());
}
