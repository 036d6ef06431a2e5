//! Connection configuration for the streaming ingest service.
//!
//! Configuration arrives as a flat map of named string values. Validation
//! is pure: no network access, no filesystem access. The binary collects
//! the map from `FLOE_`-prefixed environment variables.

use std::collections::HashMap;
use std::fmt;

use snafu::Snafu;

/// Logical configuration keys recognized by [`ConnectionConfig::from_map`].
pub mod keys {
    pub const ACCOUNT: &str = "ACCOUNT";
    pub const USER: &str = "USER";
    pub const PASSWORD: &str = "PASSWORD";
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
    pub const WAREHOUSE: &str = "WAREHOUSE";
    pub const ROLE: &str = "ROLE";
    pub const STREAMING_CLIENT: &str = "STREAMING_CLIENT";
    pub const STREAMING_CHANNEL: &str = "STREAMING_CHANNEL";
    pub const DB_SCHEMA_TABLE: &str = "DB_SCHEMA_TABLE";
    pub const TABLE_VARIANT_COLUMN: &str = "TABLE_VARIANT_COLUMN";
}

/// Prefix stripped from environment variables by [`ConnectionConfig::from_env`].
pub const ENV_PREFIX: &str = "FLOE_";

/// Destination column used when no variant column is configured.
pub const DEFAULT_VARIANT_COLUMN: &str = "jsonValue";

const DEFAULT_STREAMING_CLIENT: &str = "streamingClient";
const DEFAULT_STREAMING_CHANNEL: &str = "streamingChannel";

const SERVICE_DOMAIN: &str = "snowflakecomputing.com";
const INGEST_PORT: u16 = 443;

/// Errors that can occur when validating connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum ConfigError {
    #[snafu(display("missing required configuration key: {key}"))]
    MissingKey { key: &'static str },
    #[snafu(display("at least one of PASSWORD or PRIVATE_KEY must be set"))]
    MissingCredential,
    #[snafu(display(
        "invalid table identifier '{value}': expected format database.schema.table"
    ))]
    InvalidTableFormat { value: String },
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Fully-qualified identity of the destination table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableIdent {
    pub database: String,
    pub schema: String,
    pub table: String,
}

impl TableIdent {
    /// Parse a `database.schema.table` identifier.
    ///
    /// Exactly three non-empty dot-separated segments are required.
    pub fn parse(value: &str) -> Result<Self> {
        let segments: Vec<&str> = value.split('.').collect();

        let [database, schema, table] = segments.as_slice() else {
            return Err(ConfigError::InvalidTableFormat {
                value: value.to_string(),
            });
        };

        if database.is_empty() || schema.is_empty() || table.is_empty() {
            return Err(ConfigError::InvalidTableFormat {
                value: value.to_string(),
            });
        }

        Ok(Self {
            database: database.to_string(),
            schema: schema.to_string(),
            table: table.to_string(),
        })
    }
}

impl fmt::Display for TableIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.database, self.schema, self.table)
    }
}

/// Validated connection configuration for the ingest service.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Account identifier, used to derive the service hostname.
    pub account: String,
    /// Service user name.
    pub user: String,
    /// Password credential, if configured.
    pub password: Option<String>,
    /// Private-key credential, if configured.
    pub private_key: Option<String>,
    /// Compute warehouse, omitted from requests when unset.
    pub warehouse: Option<String>,
    /// Role, omitted from requests when unset.
    pub role: Option<String>,
    /// Name under which the streaming client registers itself.
    pub client_name: String,
    /// Name of the streaming channel to open.
    pub channel_name: String,
    /// The destination table.
    pub table: TableIdent,
    /// The variant column that stores each JSON record.
    pub variant_column: String,
}

impl ConnectionConfig {
    /// Validate a flat map of configuration values.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let account = required(values, keys::ACCOUNT)?;
        let user = required(values, keys::USER)?;

        let password = optional(values, keys::PASSWORD);
        let private_key = optional(values, keys::PRIVATE_KEY);
        if password.is_none() && private_key.is_none() {
            return Err(ConfigError::MissingCredential);
        }

        let table = TableIdent::parse(&required(values, keys::DB_SCHEMA_TABLE)?)?;

        let client_name = optional(values, keys::STREAMING_CLIENT)
            .unwrap_or_else(|| DEFAULT_STREAMING_CLIENT.to_string());
        let channel_name = optional(values, keys::STREAMING_CHANNEL)
            .unwrap_or_else(|| DEFAULT_STREAMING_CHANNEL.to_string());
        let variant_column = optional(values, keys::TABLE_VARIANT_COLUMN)
            .unwrap_or_else(|| DEFAULT_VARIANT_COLUMN.to_string());

        Ok(Self {
            account,
            user,
            password,
            private_key,
            warehouse: optional(values, keys::WAREHOUSE),
            role: optional(values, keys::ROLE),
            client_name,
            channel_name,
            table,
            variant_column,
        })
    }

    /// Collect `FLOE_`-prefixed environment variables and validate them.
    pub fn from_env() -> Result<Self> {
        let values = std::env::vars()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PREFIX)
                    .map(|stripped| (stripped.to_string(), value))
            })
            .collect();

        Self::from_map(&values)
    }

    /// The service hostname derived from the account identifier.
    pub fn host(&self) -> String {
        format!("{}.{SERVICE_DOMAIN}", self.account)
    }

    /// The base URL of the ingest endpoint. TLS only, fixed port.
    pub fn ingest_url(&self) -> String {
        format!("https://{}:{INGEST_PORT}", self.host())
    }

    /// The credential material sent to the service.
    ///
    /// Password takes precedence when both credentials are configured.
    pub fn auth_secret(&self) -> &str {
        self.password
            .as_deref()
            .or(self.private_key.as_deref())
            .unwrap_or_default()
    }
}

fn required(values: &HashMap<String, String>, key: &'static str) -> Result<String> {
    optional(values, key).ok_or(ConfigError::MissingKey { key })
}

/// Empty values are treated as unset, matching how the hosting
/// environment clears settings without removing them.
fn optional(values: &HashMap<String, String>, key: &str) -> Option<String> {
    values
        .get(key)
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_values() -> HashMap<String, String> {
        [
            (keys::ACCOUNT, "acme-xy12345"),
            (keys::USER, "ingest_user"),
            (keys::PASSWORD, "hunter2"),
            (keys::DB_SCHEMA_TABLE, "analytics.events.raw"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_minimal_config() {
        let config = ConnectionConfig::from_map(&minimal_values()).unwrap();

        assert_eq!(config.account, "acme-xy12345");
        assert_eq!(config.table.database, "analytics");
        assert_eq!(config.table.schema, "events");
        assert_eq!(config.table.table, "raw");
        assert_eq!(config.client_name, "streamingClient");
        assert_eq!(config.channel_name, "streamingChannel");
        assert_eq!(config.variant_column, "jsonValue");
        assert!(config.warehouse.is_none());
        assert!(config.role.is_none());
    }

    #[test]
    fn test_derived_endpoint() {
        let config = ConnectionConfig::from_map(&minimal_values()).unwrap();

        assert_eq!(config.host(), "acme-xy12345.snowflakecomputing.com");
        assert_eq!(
            config.ingest_url(),
            "https://acme-xy12345.snowflakecomputing.com:443"
        );
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let mut values = minimal_values();
        values.insert(keys::STREAMING_CLIENT.to_string(), "pipe-a".to_string());
        values.insert(keys::STREAMING_CHANNEL.to_string(), "channel-a".to_string());
        values.insert(keys::TABLE_VARIANT_COLUMN.to_string(), "payload".to_string());
        values.insert(keys::WAREHOUSE.to_string(), "wh_small".to_string());
        values.insert(keys::ROLE.to_string(), "ingest_role".to_string());

        let config = ConnectionConfig::from_map(&values).unwrap();

        assert_eq!(config.client_name, "pipe-a");
        assert_eq!(config.channel_name, "channel-a");
        assert_eq!(config.variant_column, "payload");
        assert_eq!(config.warehouse.as_deref(), Some("wh_small"));
        assert_eq!(config.role.as_deref(), Some("ingest_role"));
    }

    #[test]
    fn test_missing_required_keys() {
        for key in [keys::ACCOUNT, keys::USER, keys::DB_SCHEMA_TABLE] {
            let mut values = minimal_values();
            values.remove(key);

            let error = ConnectionConfig::from_map(&values).unwrap_err();
            assert_eq!(error, ConfigError::MissingKey { key });
        }
    }

    #[test]
    fn test_missing_credential() {
        let mut values = minimal_values();
        values.remove(keys::PASSWORD);

        let error = ConnectionConfig::from_map(&values).unwrap_err();
        assert_eq!(error, ConfigError::MissingCredential);
    }

    #[test]
    fn test_private_key_is_sufficient() {
        let mut values = minimal_values();
        values.remove(keys::PASSWORD);
        values.insert(keys::PRIVATE_KEY.to_string(), "-----BEGIN...".to_string());

        let config = ConnectionConfig::from_map(&values).unwrap();
        assert_eq!(config.auth_secret(), "-----BEGIN...");
    }

    #[test]
    fn test_password_takes_precedence() {
        let mut values = minimal_values();
        values.insert(keys::PRIVATE_KEY.to_string(), "-----BEGIN...".to_string());

        let config = ConnectionConfig::from_map(&values).unwrap();
        assert_eq!(config.auth_secret(), "hunter2");
    }

    #[test]
    fn test_table_ident_rejects_wrong_segment_count() {
        for value in ["db.table", "a.b.c.d", "events", ""] {
            assert_eq!(
                TableIdent::parse(value).unwrap_err(),
                ConfigError::InvalidTableFormat {
                    value: value.to_string()
                }
            );
        }
    }

    #[test]
    fn test_table_ident_rejects_empty_segments() {
        for value in ["db..table", ".schema.table", "db.schema."] {
            assert!(TableIdent::parse(value).is_err());
        }
    }

    #[test]
    fn test_table_ident_display_round_trip() {
        let ident = TableIdent::parse("analytics.events.raw").unwrap();
        assert_eq!(ident.to_string(), "analytics.events.raw");
    }

    #[test]
    fn test_empty_value_is_unset() {
        let mut values = minimal_values();
        values.insert(keys::TABLE_VARIANT_COLUMN.to_string(), String::new());

        let config = ConnectionConfig::from_map(&values).unwrap();
        assert_eq!(config.variant_column, "jsonValue");
    }
}
