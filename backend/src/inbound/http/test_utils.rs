//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, Route, test, web};
use chrono::TimeDelta;
use mockable::Clock;

use crate::domain::ports::{
    MockLoginService, MockMasterProfilesCommand, MockMasterProfilesQuery, MockOrdersCommand,
    MockOrdersQuery, MockPaymentsCommand, MockRegistrationService, MockUsersCommand,
    MockUsersQuery,
};
use crate::domain::{
    AuthSession, Email, Error, Role, RoleDestinations, User, UserDraft, UserId, UserName,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts, SessionSettings};
use crate::test_support::{MutableClock, fixture_instant};

/// Session middleware with a fresh key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// Active user with `role`, created at the fixture instant.
pub fn sample_user(name: &str, role: Role) -> User {
    let draft = UserDraft {
        name: UserName::new(name).expect("valid name"),
        email: Email::new(format!("{}@example.com", name.to_lowercase())).expect("valid email"),
        role,
    };
    User::register(UserId::random(), draft, fixture_instant())
}

/// Mocks for every port, configured per test before building state.
#[derive(Default)]
pub struct MockPorts {
    pub login: MockLoginService,
    pub registration: MockRegistrationService,
    pub users: MockUsersQuery,
    pub users_command: MockUsersCommand,
    pub master_profiles: MockMasterProfilesQuery,
    pub master_profiles_command: MockMasterProfilesCommand,
    pub orders: MockOrdersCommand,
    pub orders_query: MockOrdersQuery,
    pub payments: MockPaymentsCommand,
}

impl MockPorts {
    /// Expect any number of session re-checks for `user`.
    pub fn with_session_user(mut self, user: &User) -> Self {
        let expected = user.clone();
        self.users
            .expect_find_user()
            .returning(move |_| Ok(expected.clone()));
        self
    }

    /// Build handler state over the mocks with a clock frozen at the fixture instant.
    pub fn into_state(self) -> HttpState {
        let clock: Arc<dyn Clock> = Arc::new(MutableClock::fixed());
        HttpState::new(
            HttpStatePorts {
                login: Arc::new(self.login),
                registration: Arc::new(self.registration),
                users: Arc::new(self.users),
                users_command: Arc::new(self.users_command),
                master_profiles: Arc::new(self.master_profiles),
                master_profiles_command: Arc::new(self.master_profiles_command),
                orders: Arc::new(self.orders),
                orders_query: Arc::new(self.orders_query),
                payments: Arc::new(self.payments),
            },
            SessionSettings {
                destinations: RoleDestinations::default(),
                ttl: TimeDelta::minutes(30),
                clock,
            },
        )
    }
}

/// Session a handler test logs in with.
pub fn session_for(user: &User) -> AuthSession {
    AuthSession::issue(user, fixture_instant(), TimeDelta::minutes(30))
}

/// Path of the route installed by [`login_route`].
pub const TEST_LOGIN_PATH: &str = "/test/login";

/// Route that stores `auth` in the session, standing in for a real login.
pub fn login_route(auth: AuthSession) -> Route {
    web::get().to(move |session: SessionContext| {
        let auth = auth.clone();
        async move {
            session.persist(&auth)?;
            Ok::<_, Error>(HttpResponse::NoContent().finish())
        }
    })
}

/// Session cookie obtained through [`login_route`].
pub async fn login_cookie<S, B, E>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = E>,
    E: std::fmt::Debug,
{
    let res = test::call_service(app, test::TestRequest::get().uri(TEST_LOGIN_PATH).to_request())
        .await;
    session_cookie(&res)
}

/// App over `state` with the test session middleware, a login route for
/// `auth` and the given services mounted under `/api`.
macro_rules! test_app {
    ($state:expr, $auth:expr, $($service:expr),+ $(,)?) => {
        actix_web::App::new()
            .app_data(actix_web::web::Data::new($state))
            .wrap($crate::inbound::http::test_utils::test_session_middleware())
            .route(
                $crate::inbound::http::test_utils::TEST_LOGIN_PATH,
                $crate::inbound::http::test_utils::login_route($auth),
            )
            .service(actix_web::web::scope("/api")$(.service($service))+)
    };
}
pub(crate) use test_app;
