use crate::config::Config;
use crate::database::PostgreDatabase;
use crate::routes::RateLimiter;

pub struct AppState {
    pub db: PostgreDatabase,
    pub config: Config,
    pub limiter: RateLimiter,
}
