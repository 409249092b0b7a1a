pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    database_url: Option<String>,
    max_connections: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("PREVENTIVE_DB_MAX_CONNECTIONS").ok(),
        )
    }

    pub fn from_values(database_url: Option<String>, max_connections: Option<String>) -> Self {
        let database_url = database_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let max_connections = match max_connections {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = DEFAULT_MAX_CONNECTIONS,
                        "invalid PREVENTIVE_DB_MAX_CONNECTIONS, using default"
                    );
                    DEFAULT_MAX_CONNECTIONS
                }
            },
        };

        Self {
            database_url,
            max_connections,
        }
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}
