//! Process configuration loaded via OrthoConfig.
//!
//! Values come from `GAMEX_*` environment variables, an optional
//! configuration file and command-line flags, in OrthoConfig's usual order of
//! precedence.

use std::fmt;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Configuration for the game exchange server.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "GAMEX")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string. The in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Maximum number of pooled database connections.
    pub pool_max_size: Option<u32>,
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: Option<String>,
    /// Lifetime of issued access tokens in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Permit a random per-process signing secret in release builds.
    #[ortho_config(default = false)]
    pub allow_ephemeral_secret: bool,
}

impl AppSettings {
    /// Parse the configured listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`AddrParseError`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Access token lifetime.
    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    /// Upper bound on pooled database connections.
    #[must_use]
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Configured signing secret, ignoring blank values.
    #[must_use]
    pub fn jwt_secret(&self) -> Option<Zeroizing<Vec<u8>>> {
        self.jwt_secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty())
            .map(|secret| Zeroizing::new(secret.as_bytes().to_vec()))
    }
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("pool_max_size", &self.pool_max_size)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("allow_ephemeral_secret", &self.allow_ephemeral_secret)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 6] = [
        "GAMEX_BIND_ADDR",
        "GAMEX_DATABASE_URL",
        "GAMEX_POOL_MAX_SIZE",
        "GAMEX_JWT_SECRET",
        "GAMEX_TOKEN_TTL_SECS",
        "GAMEX_ALLOW_EPHEMERAL_SECRET",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("game-exchange")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.token_ttl(), Duration::from_secs(3600));
        assert_eq!(settings.pool_max_size(), 10);
        assert!(settings.database_url.is_none());
        assert!(settings.jwt_secret().is_none());
        assert!(!settings.allow_ephemeral_secret);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("GAMEX_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "GAMEX_DATABASE_URL",
                Some("postgres://exchange@localhost/exchange".to_owned()),
            ),
            ("GAMEX_POOL_MAX_SIZE", Some("4".to_owned())),
            ("GAMEX_JWT_SECRET", Some("s3cret".to_owned())),
            ("GAMEX_TOKEN_TTL_SECS", Some("60".to_owned())),
            ("GAMEX_ALLOW_EPHEMERAL_SECRET", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("override parses"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.token_ttl(), Duration::from_secs(60));
        assert_eq!(
            settings.jwt_secret().as_deref().map(Vec::as_slice),
            Some(b"s3cret".as_slice())
        );
        assert!(settings.allow_ephemeral_secret);
    }

    #[rstest]
    fn blank_secret_counts_as_unset() {
        let _guard = lock_env([("GAMEX_JWT_SECRET", Some("   ".to_owned()))]);
        assert!(load_from_empty_args().jwt_secret().is_none());
    }

    #[rstest]
    fn debug_output_redacts_credentials() {
        let _guard = lock_env([
            ("GAMEX_JWT_SECRET", Some("s3cret".to_owned())),
            (
                "GAMEX_DATABASE_URL",
                Some("postgres://user:pw@db/exchange".to_owned()),
            ),
        ]);
        let rendered = format!("{:?}", load_from_empty_args());
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("pw@db"));
    }
}
