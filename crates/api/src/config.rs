use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Credentials of the admin account ensured at startup.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory for uploaded media (default: `upload`).
    pub upload_dir: PathBuf,
    /// Base URL prefixed to issued media URLs (default: `http://localhost:{port}`).
    pub public_base_url: String,
    /// Whether the refresh cookie carries the `Secure` attribute (default: `false`).
    pub cookie_secure: bool,
    /// Interval between purges of expired/revoked sessions (default: `3600`).
    pub session_cleanup_interval_secs: u64,
    /// Optional admin account ensured at startup.
    pub admin_seed: Option<AdminSeed>,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                    |
    /// |---------------------------------|----------------------------|
    /// | `HOST`                          | `0.0.0.0`                  |
    /// | `PORT`                          | `8000`                     |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                       |
    /// | `UPLOAD_DIR`                    | `upload`                   |
    /// | `PUBLIC_BASE_URL`               | `http://localhost:{PORT}`  |
    /// | `COOKIE_SECURE`                 | `false`                    |
    /// | `SESSION_CLEANUP_INTERVAL_SECS` | `3600`                     |
    /// | `ADMIN_USERNAME`                | `admin`                    |
    /// | `ADMIN_EMAIL` / `ADMIN_PASSWORD`| unset (no seeding)         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "upload".into()));

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"));

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let session_cleanup_interval_secs: u64 = std::env::var("SESSION_CLEANUP_INTERVAL_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("SESSION_CLEANUP_INTERVAL_SECS must be a valid u64");

        let admin_seed = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed {
                    username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
                    email,
                    password,
                })
            }
            _ => None,
        };

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            public_base_url,
            cookie_secure,
            session_cleanup_interval_secs,
            admin_seed,
            jwt,
        }
    }
}
