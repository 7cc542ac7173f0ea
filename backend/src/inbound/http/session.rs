//! Session helpers keeping handlers free of framework-specific logic.
//!
//! The cookie holds one serialised [`AuthSession`]. Handlers persist it at
//! login, require it on protected routes and purge it at logout; an expired
//! or undecodable session is purged and treated as absent.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

use crate::domain::{AuthSession, Error};

pub(crate) const AUTH_SESSION_KEY: &str = "auth";

/// Newtype wrapper exposing the session operations handlers need.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Store `auth` under a fresh session key.
    pub fn persist(&self, auth: &AuthSession) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(AUTH_SESSION_KEY, auth)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The stored session, if present, decodable and unexpired at `now`.
    pub fn current(&self, now: DateTime<Utc>) -> Option<AuthSession> {
        let auth = match self.0.get::<AuthSession>(AUTH_SESSION_KEY) {
            Ok(auth) => auth?,
            Err(error) => {
                warn!(%error, "discarding undecodable session cookie");
                self.purge();
                return None;
            }
        };
        if auth.is_expired(now) {
            debug!(user_id = %auth.user_id(), "session expired");
            self.purge();
            return None;
        }
        Some(auth)
    }

    /// Require a live session or fail with `401 Unauthorized`.
    pub fn require(&self, now: DateTime<Utc>) -> Result<AuthSession, Error> {
        self.current(now)
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session entry and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
