//! Regression coverage for user values.

use super::*;
use chrono::TimeZone;
use rstest::{fixture, rstest};

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
        .single()
        .expect("fixed timestamp")
}

#[fixture]
fn user() -> User {
    let draft = UserDraft {
        name: UserName::new("Ivan Petrov").expect("valid name"),
        email: Email::new("ivan@example.com").expect("valid email"),
        role: Role::Client,
    };
    User::register(UserId::random(), draft, at(9))
}

#[rstest]
#[case("")]
#[case("   ")]
fn blank_names_are_rejected(#[case] raw: &str) {
    assert_eq!(UserName::new(raw), Err(UserValidationError::EmptyName));
}

#[rstest]
fn long_names_are_rejected() {
    let raw = "я".repeat(USER_NAME_MAX + 1);
    assert_eq!(
        UserName::new(raw),
        Err(UserValidationError::NameTooLong {
            max: USER_NAME_MAX
        })
    );
}

#[rstest]
fn name_limit_counts_characters_not_bytes() {
    let raw = "я".repeat(USER_NAME_MAX);
    assert!(UserName::new(raw).is_ok());
}

#[rstest]
#[case("plainaddress", UserValidationError::InvalidEmail)]
#[case("a@b", UserValidationError::InvalidEmail)]
#[case("two words@example.com", UserValidationError::InvalidEmail)]
#[case("  ", UserValidationError::EmptyEmail)]
fn malformed_emails_are_rejected(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Email::new(raw), Err(expected));
}

#[rstest]
fn email_keeps_its_spelling_and_compares_case_blind() {
    let email = Email::new("  Master@Workshop.RU ").expect("valid email");
    assert_eq!(email.as_ref(), "Master@Workshop.RU");
    assert_eq!(email.normalized(), "master@workshop.ru");
    assert_eq!(email, Email::new("master@workshop.ru").expect("valid email"));
}

#[rstest]
#[case("client", Role::Client)]
#[case("MASTER", Role::Master)]
#[case("verified_master", Role::VerifiedMaster)]
#[case(" admin ", Role::Admin)]
fn roles_parse_case_insensitively(#[case] raw: &str, #[case] expected: Role) {
    assert_eq!(raw.parse::<Role>(), Ok(expected));
}

#[rstest]
fn unknown_role_is_rejected() {
    let err = "superuser".parse::<Role>().expect_err("unknown role");
    assert!(matches!(err, UserValidationError::UnknownRole { .. }));
}

#[rstest]
fn only_craftsman_roles_are_masters() {
    let masters: Vec<_> = Role::ALL.into_iter().filter(|r| r.is_master()).collect();
    assert_eq!(masters, vec![Role::Master, Role::VerifiedMaster]);
}

#[rstest]
fn user_id_rejects_non_uuid() {
    assert_eq!(UserId::new("42"), Err(UserValidationError::InvalidId));
    assert_eq!(UserId::new(""), Err(UserValidationError::EmptyId));
}

#[rstest]
fn partial_patch_leaves_other_fields(mut user: User) {
    let before = user.clone();
    let patch = UserPatch {
        name: Some(UserName::new("Ivan P.").expect("valid name")),
        ..UserPatch::default()
    };
    user.apply(&patch, at(10));

    assert_eq!(user.name().as_ref(), "Ivan P.");
    assert_eq!(user.email(), before.email());
    assert_eq!(user.role(), before.role());
    assert_eq!(user.is_active(), before.is_active());
    assert_eq!(user.created_at(), before.created_at());
    assert_eq!(user.updated_at(), at(10));
}

#[rstest]
fn toggling_twice_restores_active_flag(mut user: User) {
    let original = user.is_active();
    user.toggle_active(at(10));
    assert_ne!(user.is_active(), original);
    user.toggle_active(at(11));
    assert_eq!(user.is_active(), original);
}

#[rstest]
fn updated_at_never_precedes_created_at(mut user: User) {
    user.toggle_active(at(1));
    assert_eq!(user.updated_at(), user.created_at());
}

#[rstest]
fn role_serialises_snake_case() {
    let value = serde_json::to_value(Role::VerifiedMaster).expect("role serialises");
    assert_eq!(value, serde_json::json!("verified_master"));
}
