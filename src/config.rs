use std::env;
use std::path::PathBuf;

/// Runtime settings, resolved once at startup from the environment
/// (`dotenv` is loaded by `main` beforehand).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in_days: i64,
    pub client_url: String,
    pub production: bool,
    pub public_dir: PathBuf,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_seconds: u64,
}

impl Config {
    pub fn init() -> Config {
        let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        let jwt_expires_in_days = env_or("JWT_EXPIRES_IN_DAYS", 7);
        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:5173".to_owned());
        let production = env::var("APP_ENV").as_deref() == Ok("production");
        let public_dir = PathBuf::from(env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_owned()));
        let rate_limit_max_requests = env_or("RATE_LIMIT_MAX_REQUESTS", 100);
        let rate_limit_window_seconds = env_or("RATE_LIMIT_WINDOW_SECONDS", 15 * 60);

        Config {
            db_url,
            jwt_secret,
            jwt_expires_in_days,
            client_url,
            production,
            public_dir,
            rate_limit_max_requests,
            rate_limit_window_seconds,
        }
    }

    /// Where uploaded dish images are written; served back under `/uploads`.
    pub fn upload_dir(&self) -> PathBuf {
        self.public_dir.join("uploads")
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
