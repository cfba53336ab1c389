use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_SQL_FUNCTION: &str = "exec_sql";

/// Where the hosted store lives and how to authenticate against it.
#[derive(Clone)]
pub struct StoreConfig {
    /// Project endpoint, e.g. `https://<ref>.supabase.co`.
    pub endpoint: String,
    pub api_key: String,
    /// Applied to every remote call.
    pub timeout: Duration,
    /// Remote procedure used for DDL statements.
    pub sql_function: String,
}

impl StoreConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            sql_function: DEFAULT_SQL_FUNCTION.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sql_function(mut self, name: impl Into<String>) -> Self {
        self.sql_function = name.into();
        self
    }

    /// First host label of a `*.supabase.co` endpoint, which is the project
    /// reference shown in the dashboard.
    pub fn project_ref(&self) -> Option<&str> {
        let host = self
            .endpoint
            .split_once("://")
            .map_or(self.endpoint.as_str(), |(_, rest)| rest);
        let host = host.split(['/', ':']).next()?;
        let (label, domain) = host.split_once('.')?;
        (domain == "supabase.co" && !label.is_empty()).then_some(label)
    }
}

// Keep the key out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("sql_function", &self.sql_function)
            .finish()
    }
}
