//! Shared harness for HTTP integration tests.
//!
//! Builds the full API over in-memory adapters, the fixture payment processor
//! and a clock the test controls.
#![allow(dead_code)]

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key, time::Duration as CookieDuration};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, Error, test, web};
use chrono::TimeDelta;
use serde_json::{Value, json};

use masters_backend::Trace;
use masters_backend::domain::{
    AuthenticationService, Currency, Email, MasterProfileService, OrderService, Password,
    PaymentService, PaymentsConfig, Role, RoleDestinations, UserDirectoryService, UserDraft,
    UserName,
};
use masters_backend::inbound::http::configure_api;
use masters_backend::inbound::http::error::json_config;
use masters_backend::inbound::http::state::{HttpState, HttpStatePorts, SessionSettings};
use masters_backend::outbound::memory::{
    InMemoryMasterProfileRepository, InMemoryOrderRepository, InMemoryUserRepository,
};
use masters_backend::outbound::payments::FixturePaymentProcessor;
use masters_backend::test_support::{MutableClock, fast_hasher};

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";
pub const MEMBER_PASSWORD: &str = "long-enough-secret";
pub const SESSION_TTL_MINUTES: i64 = 60;

/// Running API plus handles to inspect and steer its adapters.
pub struct Harness {
    pub state: web::Data<HttpState>,
    pub clock: MutableClock,
    pub profiles: Arc<InMemoryMasterProfileRepository>,
    pub processor: Arc<FixturePaymentProcessor>,
    key: Key,
}

impl Harness {
    pub async fn new() -> Self {
        let clock = MutableClock::fixed();
        let shared_clock: Arc<dyn mockable::Clock> = Arc::new(clock.clone());
        let users = Arc::new(InMemoryUserRepository::new());
        let profiles = Arc::new(InMemoryMasterProfileRepository::new());
        let orders = Arc::new(InMemoryOrderRepository::new());
        let hasher = Arc::new(fast_hasher());
        let processor = Arc::new(FixturePaymentProcessor::default());
        let currency = Currency::new("rub").expect("currency");

        let auth = Arc::new(AuthenticationService::new(
            users.clone(),
            profiles.clone(),
            hasher.clone(),
            shared_clock.clone(),
        ));
        auth.ensure_admin(
            UserDraft {
                name: UserName::new("Root").expect("name"),
                email: Email::new(ADMIN_EMAIL).expect("email"),
                role: Role::Admin,
            },
            &Password::new(ADMIN_PASSWORD).expect("password"),
        )
        .await
        .expect("admin bootstrap");
        let directory = Arc::new(UserDirectoryService::new(
            users.clone(),
            profiles.clone(),
            hasher,
            shared_clock.clone(),
        ));
        let masters = Arc::new(MasterProfileService::new(users, profiles.clone()));
        let order_service = Arc::new(OrderService::new(
            orders.clone(),
            currency.clone(),
            shared_clock.clone(),
        ));
        let payments = Arc::new(PaymentService::new(
            orders,
            processor.clone(),
            PaymentsConfig {
                publishable_key: "pk_test_fixture".to_owned(),
                currency,
            },
            shared_clock.clone(),
        ));

        let ports = HttpStatePorts {
            login: auth.clone(),
            registration: auth,
            users: directory.clone(),
            users_command: directory,
            master_profiles: masters.clone(),
            master_profiles_command: masters,
            orders: order_service.clone(),
            orders_query: order_service,
            payments,
        };
        let session = SessionSettings {
            destinations: RoleDestinations::default(),
            ttl: TimeDelta::minutes(SESSION_TTL_MINUTES),
            clock: shared_clock,
        };
        Self {
            state: web::Data::new(HttpState::new(ports, session)),
            clock,
            profiles,
            processor,
            key: Key::generate(),
        }
    }

    /// Application mounted the way the server mounts it.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name("session".to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(false)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .session_lifecycle(
                PersistentSession::default()
                    .session_ttl(CookieDuration::minutes(SESSION_TTL_MINUTES)),
            )
            .build();
        App::new()
            .app_data(self.state.clone())
            .app_data(json_config())
            .wrap(Trace)
            .service(web::scope("/api").wrap(session).configure(configure_api))
    }
}

/// Status, decoded body and refreshed session cookie of one exchange.
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<Cookie<'static>>,
}

pub async fn send<S, B>(app: &S, request: test::TestRequest) -> Reply
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let res = test::call_service(app, request.to_request()).await;
    let status = res.status();
    let cookie = res
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned);
    let bytes = test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    Reply {
        status,
        body,
        cookie,
    }
}

/// Log in and return the session cookie.
pub async fn login<S, B>(app: &S, email: &str, password: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let reply = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
    reply.cookie.expect("session cookie")
}

/// Register a self-service account; returns its id and session cookie.
pub async fn register<S, B>(
    app: &S,
    name: &str,
    email: &str,
    role: &str,
) -> (String, Cookie<'static>)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let reply = send(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": name,
                "email": email,
                "password": MEMBER_PASSWORD,
                "role": role,
                "acceptTerms": true,
            })),
    )
    .await;
    assert_eq!(
        reply.status,
        StatusCode::CREATED,
        "registration failed: {}",
        reply.body
    );
    let id = reply.body["user"]["id"]
        .as_str()
        .expect("user id")
        .to_owned();
    (id, reply.cookie.expect("session cookie"))
}
