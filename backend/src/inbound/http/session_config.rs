//! Session cookie configuration read from the environment.
//!
//! Debug builds fall back to development defaults and warn; release builds
//! refuse to start when a toggle is missing or invalid.
//!
//! | Variable                  | Meaning                                 |
//! |---------------------------|-----------------------------------------|
//! | `SESSION_KEY_FILE`        | file holding at least 64 key bytes      |
//! | `SESSION_COOKIE_SECURE`   | mark the cookie `Secure`                |
//! | `SESSION_SAMESITE`        | `Strict`, `Lax` or `None`               |
//! | `SESSION_ALLOW_EPHEMERAL` | generate a key when the file is missing |

use std::path::PathBuf;

use actix_session::SessionMiddleware;
use actix_session::config::{CookieContentSecurity, PersistentSession};
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use chrono::TimeDelta;
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";
/// Minimum key file length accepted by release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;

const DEFAULT_KEY_PATH: &str = "/var/run/secrets/session_key";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const FINGERPRINT_BYTES: usize = 8;

/// How strictly the environment is validated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Defaults with warnings.
    Debug,
    /// Every toggle explicit and valid.
    Release,
}

impl BuildMode {
    /// Mode of the running binary.
    #[must_use]
    pub fn current() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie settings.
#[derive(Clone)]
pub struct CookieSettings {
    key: Key,
    /// Cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
    /// The key was generated for this process and dies with it.
    pub ephemeral_key: bool,
}

impl CookieSettings {
    /// Truncated SHA-256 of the signing key, safe to log.
    ///
    /// # Examples
    /// ```
    /// use masters_backend::inbound::http::session_config::{BuildMode, cookie_settings_from_env};
    /// use mockable::MockEnv;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|_| None);
    /// # if cfg!(debug_assertions) {
    /// let settings = cookie_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
    /// assert_eq!(settings.fingerprint().len(), 16);
    /// # }
    /// ```
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.key.signing());
        hex::encode(&digest[..FINGERPRINT_BYTES])
    }

    /// Cookie session middleware whose cookie lives as long as a session.
    pub fn middleware(&self, ttl: TimeDelta) -> SessionMiddleware<CookieSessionStore> {
        SessionMiddleware::builder(CookieSessionStore::default(), self.key.clone())
            .cookie_name(SESSION_COOKIE_NAME.to_owned())
            .cookie_path("/".to_owned())
            .cookie_secure(self.cookie_secure)
            .cookie_same_site(self.same_site)
            .cookie_http_only(true)
            .cookie_content_security(CookieContentSecurity::Private)
            .session_lifecycle(
                PersistentSession::default().session_ttl(CookieDuration::seconds(ttl.num_seconds())),
            )
            .build()
    }
}

/// Invalid session environment.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// Variable absent.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// Variable present but unparseable.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Key file unreadable and no ephemeral fallback allowed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Key file shorter than [`SESSION_KEY_MIN_LEN`].
    #[error("session key at {path} too short: need >= {SESSION_KEY_MIN_LEN} bytes, got {length}")]
    KeyTooShort { path: PathBuf, length: usize },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Ephemeral keys requested in a release build.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate the session toggles.
pub fn cookie_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<CookieSettings, SessionConfigError> {
    let cookie_secure = flag(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site(env, mode, cookie_secure)?;
    let allow_ephemeral = flag(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let (key, ephemeral_key) = session_key(env, mode, allow_ephemeral)?;
    Ok(CookieSettings {
        key,
        cookie_secure,
        same_site,
        ephemeral_key,
    })
}

/// Fallback in debug builds, the error in release builds.
fn lenient<T>(mode: BuildMode, fallback: T, error: SessionConfigError) -> Result<T, SessionConfigError> {
    match mode {
        BuildMode::Debug => {
            warn!(%error, "using development default");
            Ok(fallback)
        }
        BuildMode::Release => Err(error),
    }
}

fn flag<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    fallback: bool,
) -> Result<bool, SessionConfigError> {
    let Some(raw) = env.string(name) else {
        return lenient(mode, fallback, SessionConfigError::MissingEnv { name });
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        _ => lenient(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name,
                value: raw,
                expected: BOOL_EXPECTED,
            },
        ),
    }
}

fn same_site<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = match mode {
        BuildMode::Debug => SameSite::Lax,
        BuildMode::Release => SameSite::Strict,
    };
    let Some(raw) = env.string(SAMESITE_ENV) else {
        return lenient(mode, fallback, SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" => lenient(mode, SameSite::None, SessionConfigError::InsecureSameSiteNone),
        _ => lenient(
            mode,
            fallback,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: raw,
                expected: SAMESITE_EXPECTED,
            },
        ),
    }
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<(Key, bool), SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_KEY_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            // `Key::derive_from` panics on short input, so the length check
            // applies in every build mode.
            let result = if length < SESSION_KEY_MIN_LEN {
                Err(SessionConfigError::KeyTooShort {
                    path: path.clone(),
                    length,
                })
            } else {
                Ok((Key::derive_from(&bytes), false))
            };
            bytes.zeroize();
            result
        }
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %source,
                "using temporary session key (dev only)"
            );
            Ok((Key::generate(), true))
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}
