use std::path::PathBuf;

use crate::names::DEFAULT_NAME_API_URL;

/// Runtime configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerConfig {
    /// SQLite file (from ROOMMATE_LEDGER_DB). `None` uses the platform data directory.
    pub db_path: Option<PathBuf>,
    /// Display-name service URL (from ROOMMATE_LEDGER_NAME_API)
    pub name_api_url: String,
    /// Allowed CORS origins (from ROOMMATE_LEDGER_CORS_ORIGINS, comma-separated).
    /// `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl LedgerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("ROOMMATE_LEDGER_DB")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let name_api_url = lookup("ROOMMATE_LEDGER_NAME_API")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NAME_API_URL.to_string());

        let cors_origins = lookup("ROOMMATE_LEDGER_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            db_path,
            name_api_url,
            cors_origins,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
