use std::env;

use crate::db::is_valid_table_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Left unset, the service still starts but every Postgres storage call
    /// fails. The memory backend has no tables and ignores it.
    pub mood_table: Option<String>,
    pub store_backend: StoreBackend,

    pub database_url: Option<String>,
    pub database_max_connections: u32,

    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mood_table = lookup("MOOD_TABLE").filter(|s| !s.is_empty());
        if let Some(table) = &mood_table {
            assert!(
                is_valid_table_name(table),
                "MOOD_TABLE must be an identifier of ASCII letters, digits and underscores"
            );
        }

        let store_backend = match lookup("MOOD_STORE").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => panic!("MOOD_STORE must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            panic!("DATABASE_URL must be set when MOOD_STORE=postgres");
        }

        Self {
            mood_table,
            store_backend,
            database_url,
            database_max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|| "20".into())
                .parse()
                .expect("DATABASE_MAX_CONNECTIONS must be a number"),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// True when storage calls are bound to fail for lack of a table name.
    pub fn table_unconfigured(&self) -> bool {
        self.store_backend == StoreBackend::Postgres && self.mood_table.is_none()
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
