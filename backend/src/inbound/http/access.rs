//! Per-request access checks.
//!
//! The cookie only proves who logged in. Every protected handler re-loads
//! that user so deletions, blocks and role changes take effect on the next
//! request rather than at session expiry.

use tracing::info;

use crate::domain::{Actor, Error, ErrorCode, Role, User};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// The stored user behind the session.
///
/// A deleted user is logged out with `401`; a blocked user is logged out
/// and refused with `403`.
pub(crate) async fn current_user(state: &HttpState, session: &SessionContext) -> Result<User, Error> {
    let auth = session.require(state.session.clock.utc())?;
    match state.users.find_user(auth.user_id()).await {
        Ok(user) if user.is_active() => Ok(user),
        Ok(user) => {
            info!(user_id = %user.id(), "blocked user presented a session");
            session.purge();
            Err(Error::forbidden("account is blocked"))
        }
        Err(err) if err.code() == ErrorCode::NotFound => {
            info!(user_id = %auth.user_id(), "session user no longer exists");
            session.purge();
            Err(Error::unauthorized("login required"))
        }
        Err(err) => Err(err),
    }
}

/// Caller identity with the stored role.
pub(crate) async fn require_actor(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Actor, Error> {
    current_user(state, session)
        .await
        .map(|user| Actor::from_user(&user))
}

/// Caller identity, refusing anyone who is not an administrator.
pub(crate) async fn require_admin(
    state: &HttpState,
    session: &SessionContext,
) -> Result<Actor, Error> {
    let actor = require_actor(state, session).await?;
    if actor.role() == Role::Admin {
        Ok(actor)
    } else {
        Err(Error::forbidden("administrator role required"))
    }
}
