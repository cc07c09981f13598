//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to development defaults with a warning. Release
//! builds require every toggle to be present and valid.

use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

pub(crate) const KEY_FILE_ENV: &str = "PORTAL_SESSION_KEY_FILE";
pub(crate) const COOKIE_SECURE_ENV: &str = "PORTAL_SESSION_COOKIE_SECURE";
pub(crate) const SAMESITE_ENV: &str = "PORTAL_SESSION_SAMESITE";
pub(crate) const ALLOW_EPHEMERAL_ENV: &str = "PORTAL_SESSION_ALLOW_EPHEMERAL";
pub(crate) const TTL_HOURS_ENV: &str = "PORTAL_SESSION_TTL_HOURS";

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/portal_session_key";
pub(crate) const SESSION_KEY_MIN_LEN: usize = 64;
const DEFAULT_TTL_HOURS: u64 = 2;
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const HOURS_EXPECTED: &str = "a whole number of hours between 1 and 720";

/// Whether to tolerate missing toggles.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    /// ```rust
    /// use portal::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) { BuildMode::Debug } else { BuildMode::Release };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Cookie session settings.
pub struct SessionSettings {
    /// Cookie signing and encryption key.
    pub key: Key,
    /// Send the cookie over HTTPS only.
    pub cookie_secure: bool,
    /// `SameSite` policy for the cookie.
    pub same_site: SameSite,
    /// Lifetime of the persistent session cookie.
    pub ttl: Duration,
}

/// Failures reading session settings.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    #[error("{SAMESITE_ENV}=None requires {COOKIE_SECURE_ENV}=1")]
    InsecureSameSiteNone,
    #[error("{ALLOW_EPHEMERAL_ENV} must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// One toggle as found in the environment.
enum Lookup<T> {
    Missing,
    Invalid(String),
    Parsed(T),
}

fn lookup<E: Env, T>(env: &E, name: &str, parse: impl Fn(&str) -> Option<T>) -> Lookup<T> {
    match env.string(name) {
        None => Lookup::Missing,
        Some(raw) => match parse(raw.trim()) {
            Some(value) => Lookup::Parsed(value),
            None => Lookup::Invalid(raw),
        },
    }
}

/// Apply the build-mode rules to a looked-up toggle.
fn resolve<T>(
    mode: BuildMode,
    name: &'static str,
    expected: &'static str,
    found: Lookup<T>,
    debug_default: T,
) -> Result<T, SessionConfigError> {
    match (found, mode.is_debug()) {
        (Lookup::Parsed(value), _) => Ok(value),
        (Lookup::Missing, true) => {
            warn!(name, "session toggle not set; using development default");
            Ok(debug_default)
        }
        (Lookup::Invalid(value), true) => {
            warn!(name, %value, "invalid session toggle; using development default");
            Ok(debug_default)
        }
        (Lookup::Missing, false) => Err(SessionConfigError::MissingEnv { name }),
        (Lookup::Invalid(value), false) => Err(SessionConfigError::InvalidEnv {
            name,
            value,
            expected,
        }),
    }
}

/// Build session settings from `env`.
///
/// The TTL is optional in both modes and defaults to two hours.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("portal_session_key_example");
/// std::fs::write(&key_path, vec![b'k'; 64])?;
/// let key_path = key_path.to_string_lossy().into_owned();
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "PORTAL_SESSION_KEY_FILE" => Some(key_path.clone()),
///     "PORTAL_SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///     "PORTAL_SESSION_SAMESITE" => Some("Strict".to_owned()),
///     "PORTAL_SESSION_ALLOW_EPHEMERAL" => Some("0".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.ttl.as_secs(), 2 * 3600);
/// # Ok(())
/// # }
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = resolve(
        mode,
        COOKIE_SECURE_ENV,
        BOOL_EXPECTED,
        lookup(env, COOKIE_SECURE_ENV, parse_bool),
        true,
    )?;

    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let same_site = resolve(
        mode,
        SAMESITE_ENV,
        SAMESITE_EXPECTED,
        lookup(env, SAMESITE_ENV, parse_same_site),
        default_same_site,
    )?;
    if same_site == SameSite::None && !cookie_secure {
        if mode.is_debug() {
            warn!("SameSite=None without Secure; browsers may drop the cookie");
        } else {
            return Err(SessionConfigError::InsecureSameSiteNone);
        }
    }

    let allow_ephemeral = resolve(
        mode,
        ALLOW_EPHEMERAL_ENV,
        BOOL_EXPECTED,
        lookup(env, ALLOW_EPHEMERAL_ENV, parse_bool),
        false,
    )?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }

    let ttl = match lookup(env, TTL_HOURS_ENV, parse_hours) {
        Lookup::Missing => Duration::from_secs(DEFAULT_TTL_HOURS * 3600),
        Lookup::Parsed(ttl) => ttl,
        Lookup::Invalid(value) => {
            return Err(SessionConfigError::InvalidEnv {
                name: TTL_HOURS_ENV,
                value,
                expected: HOURS_EXPECTED,
            });
        }
    };

    let key = session_key(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl,
    })
}

fn session_key<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    let mut bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(source) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "using temporary session key (dev only)");
            return Ok(Key::generate());
        }
        Err(source) => return Err(SessionConfigError::KeyRead { path, source }),
    };

    let length = bytes.len();
    // Key::derive_from panics on short input in every mode.
    if length < SESSION_KEY_MIN_LEN && (!mode.is_debug() || length < 32) {
        bytes.zeroize();
        return Err(SessionConfigError::KeyTooShort {
            path,
            length,
            min_len: SESSION_KEY_MIN_LEN,
        });
    }
    let key = Key::derive_from(&bytes);
    bytes.zeroize();
    Ok(key)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Some(SameSite::Lax),
        "strict" => Some(SameSite::Strict),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

fn parse_hours(value: &str) -> Option<Duration> {
    value
        .parse::<u64>()
        .ok()
        .filter(|hours| (1..=720).contains(hours))
        .map(|hours| Duration::from_secs(hours * 3600))
}
