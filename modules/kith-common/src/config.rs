use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Web server
    pub api_host: String,
    pub api_port: u16,

    // Duplicate scanning
    /// Hours between background scans of each workspace. 0 disables the loop.
    pub scan_interval_hours: u64,
    /// Composite-score threshold for the fuzzy matcher.
    pub fuzzy_threshold: f64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("API_PORT must be a number"),
            scan_interval_hours: env::var("SCAN_INTERVAL_HOURS")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("SCAN_INTERVAL_HOURS must be a number"),
            fuzzy_threshold: env::var("FUZZY_THRESHOLD")
                .unwrap_or_else(|_| "0.75".to_string())
                .parse()
                .expect("FUZZY_THRESHOLD must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
