/// Application configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite database URL (default: `sqlite:ecocusco.db`).
    pub database_url: String,
    /// Verbose error output for pages and envelopes (default: `false`).
    /// Full detail is always logged server-side regardless.
    pub debug: bool,
    /// Session lifetime in minutes; sliding, refreshed on save.
    pub session_lifetime_mins: i64,
    /// Password-reset token lifetime in minutes.
    pub reset_token_expiry_mins: i64,
    /// Directory for uploaded report photos.
    pub uploads_dir: String,
    /// Upload size cap in bytes (default: 5 MB).
    pub max_upload_bytes: u64,
    /// Allowed CORS origins for API clients, comma-separated.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `DATABASE_URL`            | `sqlite:ecocusco.db`    |
    /// | `APP_DEBUG`               | `false`                 |
    /// | `SESSION_LIFETIME_MINS`   | `120`                   |
    /// | `RESET_TOKEN_EXPIRY_MINS` | `60`                    |
    /// | `UPLOADS_DIR`             | `public/uploads`        |
    /// | `MAX_UPLOAD_BYTES`        | `5242880`               |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    ///
    /// # Panics
    ///
    /// Panics on unparseable numeric values -- misconfiguration should fail
    /// at startup, not at first use.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:ecocusco.db".into());

        let debug = std::env::var("APP_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let session_lifetime_mins: i64 = std::env::var("SESSION_LIFETIME_MINS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("SESSION_LIFETIME_MINS must be a valid i64");

        let reset_token_expiry_mins: i64 = std::env::var("RESET_TOKEN_EXPIRY_MINS")
            .unwrap_or_else(|_| "60".into())
            .parse()
            .expect("RESET_TOKEN_EXPIRY_MINS must be a valid i64");

        let uploads_dir =
            std::env::var("UPLOADS_DIR").unwrap_or_else(|_| "public/uploads".into());

        let max_upload_bytes: u64 = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "5242880".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid u64");

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

        Self {
            host,
            port,
            database_url,
            debug,
            session_lifetime_mins,
            reset_token_expiry_mins,
            uploads_dir,
            max_upload_bytes,
            cors_origins,
            request_timeout_secs,
        }
    }
}
