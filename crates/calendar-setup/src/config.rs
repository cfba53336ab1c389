use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use calendar_db::StoreConfig;
use calendar_db::config::{DEFAULT_SQL_FUNCTION, DEFAULT_TIMEOUT};
use thiserror::Error;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const KEY_VAR: &str = "SUPABASE_ANON_KEY";
pub const MODE_VAR: &str = "CALENDAR_SETUP_MODE";
pub const SEED_VAR: &str = "CALENDAR_SEED";
pub const TIMEOUT_VAR: &str = "CALENDAR_REQUEST_TIMEOUT_SECS";
pub const SQL_FUNCTION_VAR: &str = "CALENDAR_SQL_FUNCTION";

const MAX_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// What to do about a missing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Read-only: report state, never write.
    CheckOnly,
    /// Try to create the schema through the store's SQL function.
    AutoProvision,
    /// Print the SQL to run by hand and stop.
    #[default]
    ManualInstructions,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check-only" => Ok(Self::CheckOnly),
            "auto-provision" => Ok(Self::AutoProvision),
            "manual-instructions" => Ok(Self::ManualInstructions),
            other => Err(format!(
                "expected check-only, auto-provision or manual-instructions, got {:?}",
                other
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CheckOnly => "check-only",
            Self::AutoProvision => "auto-provision",
            Self::ManualInstructions => "manual-instructions",
        })
    }
}

/// When sample events are inserted into an existing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedPolicy {
    /// Only when the table holds no rows.
    #[default]
    IfEmpty,
    /// Every run. Repeated runs duplicate the rows.
    Always,
    Never,
}

impl FromStr for SeedPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "if-empty" => Ok(Self::IfEmpty),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("expected if-empty, always or never, got {:?}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub store: StoreConfig,
    pub mode: Mode,
    pub seed: SeedPolicy,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, which returns a variable's value if
    /// it is set. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let endpoint = get(URL_VAR).ok_or(ConfigError::Missing(URL_VAR))?;
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                var: URL_VAR,
                value: endpoint,
                reason: "must start with http:// or https://".into(),
            });
        }
        let api_key = get(KEY_VAR).ok_or(ConfigError::Missing(KEY_VAR))?;

        let mode = parse_or_default(MODE_VAR, get(MODE_VAR))?;
        let seed = parse_or_default(SEED_VAR, get(SEED_VAR))?;

        let timeout = match get(TIMEOUT_VAR) {
            None => DEFAULT_TIMEOUT,
            Some(raw) => {
                let secs = raw.parse::<u64>().ok().filter(|s| (1..=MAX_TIMEOUT_SECS).contains(s));
                match secs {
                    Some(secs) => Duration::from_secs(secs),
                    None => {
                        return Err(ConfigError::Invalid {
                            var: TIMEOUT_VAR,
                            value: raw,
                            reason: format!("expected whole seconds between 1 and {}", MAX_TIMEOUT_SECS),
                        });
                    }
                }
            }
        };

        let sql_function = get(SQL_FUNCTION_VAR).unwrap_or_else(|| DEFAULT_SQL_FUNCTION.to_string());

        Ok(Self {
            store: StoreConfig::new(endpoint, api_key)
                .with_timeout(timeout)
                .with_sql_function(sql_function),
            mode,
            seed,
        })
    }
}

fn parse_or_default<T>(var: &'static str, raw: Option<String>) -> Result<T, ConfigError>
where
    T: FromStr<Err = String> + Default,
{
    match raw {
        None => Ok(T::default()),
        Some(value) => value
            .parse()
            .map_err(|reason| ConfigError::Invalid { var, value, reason }),
    }
}
