use std::env;

use fulfillment_engine::fulfillment_api::client_api::DEFAULT_BCRYPT_COST;
use log::*;
use ofp_common::{
    helpers::{env_flag, env_or_default},
    Secret,
};

const DEFAULT_OFP_HOST: &str = "127.0.0.1";
const DEFAULT_OFP_PORT: u16 = 8360;
const DEFAULT_OFP_DATABASE_URL: &str = "sqlite://data/fulfillment.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The maximum number of connections held by the database pool.
    pub max_connections: u32,
    pub access_keys: AccessKeys,
    /// The bcrypt work factor for new password hashes. Existing hashes carry their own cost, so this should match the
    /// cost of the stored hashes. Logins for unknown documents are checked against a dummy hash of this cost.
    pub bcrypt_cost: u32,
    /// If true, pending database migrations are applied before the server starts accepting requests.
    pub run_migrations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_OFP_HOST.to_string(),
            port: DEFAULT_OFP_PORT,
            database_url: DEFAULT_OFP_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            access_keys: AccessKeys::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            run_migrations: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("OFP_HOST").ok().unwrap_or_else(|| DEFAULT_OFP_HOST.into());
        let port = env_or_default("OFP_PORT", DEFAULT_OFP_PORT);
        let database_url = env::var("OFP_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ OFP_DATABASE_URL is not set. Using the default, {DEFAULT_OFP_DATABASE_URL}.");
            DEFAULT_OFP_DATABASE_URL.to_string()
        });
        let max_connections = match env_or_default("OFP_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS) {
            0 => {
                error!("🪛️ OFP_MAX_CONNECTIONS must be at least 1. Using the default, {DEFAULT_MAX_CONNECTIONS}.");
                DEFAULT_MAX_CONNECTIONS
            },
            n => n,
        };
        let bcrypt_cost = match env_or_default("OFP_BCRYPT_COST", DEFAULT_BCRYPT_COST) {
            c if (4..=31).contains(&c) => c,
            c => {
                error!(
                    "🪛️ {c} is not a valid bcrypt cost for OFP_BCRYPT_COST. Using the default, \
                     {DEFAULT_BCRYPT_COST}."
                );
                DEFAULT_BCRYPT_COST
            },
        };
        let access_keys = AccessKeys::from_env();
        let run_migrations = env_flag("OFP_RUN_MIGRATIONS", false);
        Self { host, port, database_url, max_connections, access_keys, bcrypt_cost, run_migrations }
    }
}

//-------------------------------------------------  AccessKeys  -------------------------------------------------------
/// The keys that grant elevated roles to a request. Keys are presented in the `ofp_access_key` header.
#[derive(Clone, Debug, Default)]
pub struct AccessKeys {
    pub admin: Secret<String>,
}

impl AccessKeys {
    pub fn new<S: Into<String>>(admin: S) -> Self {
        Self { admin: Secret::new(admin.into()) }
    }

    pub fn from_env() -> Self {
        let admin = env::var("OFP_ADMIN_ACCESS_KEY").ok().unwrap_or_else(|| {
            warn!(
                "🚨️ OFP_ADMIN_ACCESS_KEY is not set. Administrative routes (status overrides and product updates) \
                 will reject every request."
            );
            String::default()
        });
        Self { admin: Secret::new(admin) }
    }
}
