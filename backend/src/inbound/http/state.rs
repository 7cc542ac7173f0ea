//! Shared HTTP adapter state.
//!
//! Handlers receive this state via `actix_web::web::Data`, so they depend
//! only on domain ports and stay testable without I/O.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    LoginService, MasterProfilesCommand, MasterProfilesQuery, OrdersCommand, OrdersQuery,
    PaymentsCommand, RegistrationService, UsersCommand, UsersQuery,
};
use crate::domain::{DEFAULT_SESSION_TTL_MINUTES, RoleDestinations};

/// Parameter object bundling the port implementations used by handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub master_profiles: Arc<dyn MasterProfilesQuery>,
    pub master_profiles_command: Arc<dyn MasterProfilesCommand>,
    pub orders: Arc<dyn OrdersCommand>,
    pub orders_query: Arc<dyn OrdersQuery>,
    pub payments: Arc<dyn PaymentsCommand>,
}

/// Session policy applied by the auth handlers.
#[derive(Clone)]
pub struct SessionSettings {
    /// Landing page per role returned after login.
    pub destinations: RoleDestinations,
    /// Lifetime of a freshly issued session.
    pub ttl: TimeDelta,
    /// Time source for issuing and expiring sessions.
    pub clock: Arc<dyn Clock>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            destinations: RoleDestinations::default(),
            ttl: TimeDelta::minutes(DEFAULT_SESSION_TTL_MINUTES),
            clock: Arc::new(DefaultClock),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
    pub users: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    pub master_profiles: Arc<dyn MasterProfilesQuery>,
    pub master_profiles_command: Arc<dyn MasterProfilesCommand>,
    pub orders: Arc<dyn OrdersCommand>,
    pub orders_query: Arc<dyn OrdersQuery>,
    pub payments: Arc<dyn PaymentsCommand>,
    pub session: SessionSettings,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports, SessionSettings::default())
    }
}

impl HttpState {
    /// Construct state from ports and session policy.
    pub fn new(ports: HttpStatePorts, session: SessionSettings) -> Self {
        let HttpStatePorts {
            login,
            registration,
            users,
            users_command,
            master_profiles,
            master_profiles_command,
            orders,
            orders_query,
            payments,
        } = ports;
        Self {
            login,
            registration,
            users,
            users_command,
            master_profiles,
            master_profiles_command,
            orders,
            orders_query,
            payments,
            session,
        }
    }
}
