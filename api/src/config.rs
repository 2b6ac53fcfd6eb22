use std::env;

use anyhow::{bail, Context};

#[derive(Clone)]
pub struct Config {
    /// Postgres connection string of the hosted database
    pub database_url: String,
    /// Base URL of the hosted project (auth API lives under /auth/v1)
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// Needed to delete half-created accounts; optional in development
    pub supabase_service_role_key: Option<String>,
    /// Shared admin password, also used as the admin bearer token
    pub admin_password: String,
    pub port: u16,
    /// Seconds after which one sign-in request per client IP is replenished (0 disables)
    pub rate_limit_per_second: u64,
    /// Sign-in requests a client IP may send back to back (0 disables)
    pub rate_limit_burst: u32,
    /// Allowed CORS origin; any origin when unset
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let admin_password = required("ADMIN_PASSWORD")?;
        if admin_password.len() < 8 {
            bail!("ADMIN_PASSWORD must be at least 8 characters");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            supabase_url: required("SUPABASE_URL")?,
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: optional("SUPABASE_SERVICE_ROLE_KEY"),
            admin_password,
            port: parsed("PORT", 8080)?,
            rate_limit_per_second: parsed("RATE_LIMIT_PER_SECOND", 2)?,
            rate_limit_burst: parsed("RATE_LIMIT_BURST", 5)?,
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
        })
    }

    /// Check if account cleanup after a failed registration is possible
    pub fn can_delete_accounts(&self) -> bool {
        self.supabase_service_role_key.is_some()
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    optional(name).with_context(|| format!("{} must be set", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} has an invalid value: {}", name, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for router tests; rate limiting is off because test
    /// requests carry no peer address.
    pub fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/medhubb_test".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "anon-key".to_string(),
            supabase_service_role_key: None,
            admin_password: "admin-secret".to_string(),
            port: 0,
            rate_limit_per_second: 0,
            rate_limit_burst: 0,
            cors_allowed_origin: None,
        }
    }
}
