//! Tests for the authentication handlers.

use super::*;
use crate::domain::{ErrorCode, Role};
use crate::inbound::http::test_utils::{
    MockPorts, sample_user, session_cookie, test_session_middleware,
};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::{Value, json};

fn test_app(
    ports: MockPorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(ports.into_state()))
        .wrap(test_session_middleware())
        .service(
            web::scope("/api")
                .service(login)
                .service(register)
                .service(logout)
                .service(me),
        )
}

#[rstest]
#[case(Role::Admin, "/admin")]
#[case(Role::Master, "/master")]
#[case(Role::Client, "/dashboard")]
#[actix_web::test]
async fn login_returns_user_and_role_destination(#[case] role: Role, #[case] destination: &str) {
    let user = sample_user("Anna", role);
    let mut ports = MockPorts::default();
    let returned = user.clone();
    ports
        .login
        .expect_authenticate()
        .withf(|creds| creds.email() == "anna@example.com" && creds.password() == "secret1")
        .times(1)
        .returning(move |_| Ok(returned.clone()));
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": " Anna@Example.com ", "password": "secret1"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    session_cookie(&res);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["redirectTo"], destination);
    assert_eq!(body["user"]["id"], user.id().to_string());
    assert_eq!(body["expiresAt"], "2024-06-01T12:30:00Z");
}

#[rstest]
#[case(json!({"email": "  ", "password": "x"}), "email")]
#[case(json!({"email": "a@b.io"}), "password")]
#[actix_web::test]
async fn login_rejects_blank_fields(#[case] payload: Value, #[case] field: &str) {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], "empty_field");
}

#[actix_web::test]
async fn login_propagates_unauthorised() {
    let mut ports = MockPorts::default();
    ports
        .login
        .expect_authenticate()
        .returning(|_| Err(Error::unauthorized("invalid credentials")));
    let app = actix_test::init_service(test_app(ports)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "a@b.io", "password": "wrong"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Error = actix_test::read_body_json(res).await;
    assert_eq!(body.code(), ErrorCode::Unauthorized);
    assert_eq!(body.message(), "invalid credentials");
}

#[rstest]
#[case(json!({"name": "Anna", "email": "anna@example.com", "password": "12345", "acceptTerms": true}), "password", "too_short")]
#[case(json!({"name": "Anna", "email": "anna@example.com", "password": "secret1"}), "acceptTerms", "terms_not_accepted")]
#[case(json!({"name": "Anna", "email": "anna@example.com", "password": "secret1", "role": "admin", "acceptTerms": true}), "role", "role_not_allowed")]
#[actix_web::test]
async fn register_validates_before_calling_the_service(
    #[case] payload: Value,
    #[case] field: &str,
    #[case] code: &str,
) {
    let mut ports = MockPorts::default();
    ports.registration.expect_register().never();
    let app = actix_test::init_service(test_app(ports)).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], field);
    assert_eq!(body["details"]["code"], code);
}

#[actix_web::test]
async fn register_creates_and_logs_in() {
    let user = sample_user("Boris", Role::Master);
    let mut ports = MockPorts::default();
    let returned = user.clone();
    ports
        .registration
        .expect_register()
        .withf(|registration| registration.draft().role == Role::Master)
        .returning(move |_| Ok(returned.clone()));
    let ports = ports.with_session_user(&user);
    let app = actix_test::init_service(test_app(ports)).await;

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": "Boris",
                "email": "boris@example.com",
                "password": "secret1",
                "role": "master",
                "acceptTerms": true
            }))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let cookie = session_cookie(&res);

    let me_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(me_res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(me_res).await;
    assert_eq!(body["user"]["email"], "boris@example.com");
    assert_eq!(body["redirectTo"], "/master");
}

#[actix_web::test]
async fn me_without_session_is_unauthorised() {
    let app = actix_test::init_service(test_app(MockPorts::default())).await;
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/auth/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn logout_clears_the_session() {
    let user = sample_user("Anna", Role::Client);
    let mut ports = MockPorts::default();
    let returned = user.clone();
    ports
        .login
        .expect_authenticate()
        .returning(move |_| Ok(returned.clone()));
    let app = actix_test::init_service(test_app(ports.with_session_user(&user))).await;
    let login_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "anna@example.com", "password": "secret1"}))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&login_res);

    let logout_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/auth/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(logout_res.status(), StatusCode::NO_CONTENT);
    let cleared = session_cookie(&logout_res);
    assert!(cleared.value().is_empty());

    let me_res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/auth/me")
            .cookie(cleared)
            .to_request(),
    )
    .await;
    assert_eq!(me_res.status(), StatusCode::UNAUTHORIZED);
}
