//! Explicit authentication session carried in request context.
//!
//! An [`AuthSession`] records who logged in, with which role, and until when
//! the login is valid. Inbound adapters persist it (for HTTP, in an encrypted
//! cookie) and must reject it once [`AuthSession::is_expired`] holds.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::user::{Role, User, UserId};

/// Default lifetime of a login.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

/// Login state for one user.
///
/// ## Invariants
/// - `expires_at` is strictly after `issued_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    user_id: UserId,
    role: Role,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Open a session for `user` valid for `ttl` from `now`.
    ///
    /// Non-positive lifetimes are raised to one second.
    pub fn issue(user: &User, now: DateTime<Utc>, ttl: TimeDelta) -> Self {
        let ttl = if ttl <= TimeDelta::zero() {
            TimeDelta::seconds(1)
        } else {
            ttl
        };
        Self {
            user_id: *user.id(),
            role: user.role(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// Logged in user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role at login time.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Login time.
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// End of validity.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True once `now` has reached the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Identity and current role of the caller of a domain operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    id: UserId,
    role: Role,
}

impl Actor {
    /// Build an actor.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Actor built from a loaded user.
    pub fn from_user(user: &User) -> Self {
        Self::new(*user.id(), user.role())
    }

    /// Acting user.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Acting role.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{Email, UserDraft, UserName};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .expect("fixed timestamp")
    }

    #[fixture]
    fn user() -> User {
        let draft = UserDraft {
            name: UserName::new("Oleg").expect("valid name"),
            email: Email::new("oleg@example.com").expect("valid email"),
            role: Role::Master,
        };
        User::register(UserId::random(), draft, noon())
    }

    #[rstest]
    fn issued_session_captures_user_and_role(user: User) {
        let session = AuthSession::issue(&user, noon(), TimeDelta::minutes(30));
        assert_eq!(session.user_id(), user.id());
        assert_eq!(session.role(), Role::Master);
        assert_eq!(session.expires_at(), noon() + TimeDelta::minutes(30));
    }

    #[rstest]
    #[case(TimeDelta::minutes(29), false)]
    #[case(TimeDelta::minutes(30), true)]
    #[case(TimeDelta::hours(2), true)]
    fn expiry_is_inclusive_of_deadline(
        user: User,
        #[case] elapsed: TimeDelta,
        #[case] expired: bool,
    ) {
        let session = AuthSession::issue(&user, noon(), TimeDelta::minutes(30));
        assert_eq!(session.is_expired(noon() + elapsed), expired);
    }

    #[rstest]
    fn zero_ttl_still_yields_ordered_window(user: User) {
        let session = AuthSession::issue(&user, noon(), TimeDelta::zero());
        assert!(session.expires_at() > session.issued_at());
    }

    #[rstest]
    fn session_round_trips_through_json(user: User) {
        let session = AuthSession::issue(&user, noon(), TimeDelta::minutes(5));
        let encoded = serde_json::to_string(&session).expect("session serialises");
        let decoded: AuthSession = serde_json::from_str(&encoded).expect("session decodes");
        assert_eq!(decoded, session);
    }
}
