//! Tests for login, registration and admin bootstrap.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{
    MockMasterProfileRepository, MockPasswordHasher, MockUserRepository, UserPersistenceError,
};
use crate::domain::{ErrorCode, PasswordHash, RegistrationInput, UserName};
use crate::test_support::{MutableClock, fixture_instant};
use rstest::rstest;

type Service =
    AuthenticationService<MockUserRepository, MockMasterProfileRepository, MockPasswordHasher>;

fn make_service(
    users: MockUserRepository,
    profiles: MockMasterProfileRepository,
    hasher: MockPasswordHasher,
) -> Service {
    AuthenticationService::new(
        Arc::new(users),
        Arc::new(profiles),
        Arc::new(hasher),
        Arc::new(MutableClock::fixed()),
    )
}

fn account(role: Role, active: bool) -> UserAccount {
    let draft = UserDraft {
        name: UserName::new("Sergey").expect("valid name"),
        email: Email::new("sergey@example.com").expect("valid email"),
        role,
    };
    let mut user = User::register(UserId::random(), draft, fixture_instant());
    if !active {
        user.toggle_active(fixture_instant());
    }
    UserAccount {
        user,
        password_hash: Some(PasswordHash::new("stored-hash")),
    }
}

fn credentials(password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts("Sergey@Example.com", password).expect("valid shape")
}

fn hasher_answering(verified: bool) -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .times(1)
        .return_once(move |_, _| Ok(verified));
    hasher
}

#[rstest]
#[tokio::test]
async fn valid_credentials_return_user() {
    let stored = account(Role::Master, true);
    let expected_id = *stored.user.id();
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .withf(|email| email.as_ref() == "sergey@example.com")
        .return_once(move |_| Ok(Some(stored)));

    let service = make_service(users, MockMasterProfileRepository::new(), hasher_answering(true));
    let user = service
        .authenticate(&credentials("secret1"))
        .await
        .expect("login succeeds");
    assert_eq!(user.id(), &expected_id);
}

#[rstest]
#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let stored = account(Role::Client, true);
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .return_once(move |_| Ok(Some(stored)));

    let service = make_service(users, MockMasterProfileRepository::new(), hasher_answering(false));
    let err = service
        .authenticate(&credentials("wrong1"))
        .await
        .expect_err("wrong password");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn unknown_email_is_unauthorized_without_hashing() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().never();

    let service = make_service(users, MockMasterProfileRepository::new(), hasher);
    let err = service
        .authenticate(&credentials("secret1"))
        .await
        .expect_err("unknown email");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), INVALID_CREDENTIALS);
}

#[rstest]
#[tokio::test]
async fn malformed_email_is_unauthorized_without_lookup() {
    let mut users = MockUserRepository::new();
    users.expect_find_account_by_email().never();

    let service = make_service(users, MockMasterProfileRepository::new(), MockPasswordHasher::new());
    let creds = LoginCredentials::try_from_parts("not-an-email", "secret1").expect("shape");
    let err = service.authenticate(&creds).await.expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn blocked_account_is_forbidden() {
    let stored = account(Role::Client, false);
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .return_once(move |_| Ok(Some(stored)));

    let service = make_service(users, MockMasterProfileRepository::new(), hasher_answering(true));
    let err = service
        .authenticate(&credentials("secret1"))
        .await
        .expect_err("blocked account");
    assert_eq!(err.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn account_without_password_cannot_log_in() {
    let mut stored = account(Role::Client, true);
    stored.password_hash = None;
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .return_once(move |_| Ok(Some(stored)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().never();

    let service = make_service(users, MockMasterProfileRepository::new(), hasher);
    let err = service
        .authenticate(&credentials("secret1"))
        .await
        .expect_err("no password");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn master_registration_creates_profile() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|account| account.user.role() == Role::Master && account.password_hash.is_some())
        .times(1)
        .return_once(|_| Ok(()));
    let mut profiles = MockMasterProfileRepository::new();
    profiles.expect_ensure().times(1).return_once(|_, _| Ok(true));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let registration = Registration::try_from_input(RegistrationInput {
        name: "Dmitry",
        email: "dmitry@example.com",
        password: "secret1",
        role: Some("master"),
        accept_terms: true,
    })
    .expect("valid registration");
    let user = make_service(users, profiles, hasher)
        .register(registration)
        .await
        .expect("registered");
    assert_eq!(user.role(), Role::Master);
    assert!(user.is_active());
}

#[rstest]
#[tokio::test]
async fn registration_with_taken_email_conflicts() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .return_once(|_| Err(UserPersistenceError::duplicate_email("dmitry@example.com")));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let registration = Registration::try_from_input(RegistrationInput {
        name: "Dmitry",
        email: "dmitry@example.com",
        password: "secret1",
        role: None,
        accept_terms: true,
    })
    .expect("valid registration");
    let err = make_service(users, MockMasterProfileRepository::new(), hasher)
        .register(registration)
        .await
        .expect_err("email taken");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_keeps_existing_account() {
    let stored = account(Role::Admin, true);
    let expected_id = *stored.user.id();
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .return_once(move |_| Ok(Some(stored)));
    users.expect_insert().never();

    let draft = UserDraft {
        name: UserName::new("Admin").expect("valid name"),
        email: Email::new("sergey@example.com").expect("valid email"),
        role: Role::Client,
    };
    let user = make_service(users, MockMasterProfileRepository::new(), MockPasswordHasher::new())
        .ensure_admin(draft, &Password::new("secret1").expect("valid password"))
        .await
        .expect("admin ensured");
    assert_eq!(user.id(), &expected_id);
}

#[rstest]
#[tokio::test]
async fn ensure_admin_creates_admin_role() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_account_by_email()
        .return_once(|_| Ok(None));
    users
        .expect_insert()
        .withf(|account| account.user.role() == Role::Admin)
        .times(1)
        .return_once(|_| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let draft = UserDraft {
        name: UserName::new("Admin").expect("valid name"),
        email: Email::new("admin@example.com").expect("valid email"),
        role: Role::Client,
    };
    let user = make_service(users, MockMasterProfileRepository::new(), hasher)
        .ensure_admin(draft, &Password::new("secret1").expect("valid password"))
        .await
        .expect("admin created");
    assert_eq!(user.role(), Role::Admin);
}
