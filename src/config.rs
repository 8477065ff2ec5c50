use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use dotenvy::dotenv;

use crate::attendance::normalizer::{AttendancePolicy, Punch};

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,
    pub log_dir: String,

    // Rate limiting
    pub rate_upload_per_min: u32,
    pub rate_report_per_min: u32,

    /// Largest accepted sheet upload body
    pub upload_limit_bytes: usize,
    pub outcome_cache_capacity: u64,

    pub policy: AttendancePolicy,
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key}={raw:?} is invalid: {e}")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = AttendancePolicy::default();

        let shift_start = match lookup("SHIFT_START") {
            Some(raw) => Punch::parse(raw.trim())
                .map(|p| p.minutes_since_midnight())
                .with_context(|| format!("SHIFT_START={raw:?} must be HH:MM"))?,
            None => defaults.shift_start,
        };

        let config = Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            server_addr: lookup("SERVER_ADDR").context("SERVER_ADDR must be set")?,
            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),

            rate_upload_per_min: parsed(&lookup, "RATE_UPLOAD_PER_MIN", 30)?,
            rate_report_per_min: parsed(&lookup, "RATE_REPORT_PER_MIN", 600)?,

            upload_limit_bytes: parsed(&lookup, "UPLOAD_LIMIT_BYTES", 4 * 1024 * 1024)?,
            outcome_cache_capacity: parsed(&lookup, "OUTCOME_CACHE_CAPACITY", 50_000)?,

            policy: AttendancePolicy {
                shift_start,
                grace_minutes: parsed(&lookup, "GRACE_MINUTES", defaults.grace_minutes)?,
                full_day_hours: parsed(&lookup, "FULL_DAY_HOURS", defaults.full_day_hours)?,
            },
        };

        if config.rate_upload_per_min == 0 || config.rate_report_per_min == 0 {
            bail!("rate limits must be at least one request per minute");
        }

        Ok(config)
    }
}
