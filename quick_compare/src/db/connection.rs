//! Database connection handling
//!
//! This module opens SQL Server connections from ADO.NET style connection strings.

use std::time::Duration;

use tiberius::{AuthMethod, Client, Config as TdsConfig, Row, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::{Error, Result};
use crate::utils::quoting::mask_connection_string;

/// How to reach a live database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub connection_string: String,
    pub connect_timeout: Option<Duration>,
}

/// Login a connection string asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authentication {
    /// SQL Server login from `User Id`/`Password`
    SqlServer,
    /// Windows (SSPI) or Kerberos login of the current user
    Integrated,
}

impl ConnectionSettings {
    /// Settings for an explicit connection string
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            connect_timeout: None,
        }
    }

    /// Settings for a trusted connection to `database` on `server`
    pub fn trusted(server: &str, database: &str) -> Self {
        Self::new(format!(
            "Data Source={};Initial Catalog={};Persist Security Info=True;Trusted_Connection=True;",
            server, database
        ))
    }

    /// Give up connecting after `timeout`
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Login requested by the connection string
    ///
    /// `Trusted_Connection` or `Integrated Security` set to true, yes or sspi
    /// selects integrated login, unless a user name is given.
    pub fn authentication(&self) -> Authentication {
        let mut integrated = false;
        let mut has_user = false;

        for (key, value) in connection_values(&self.connection_string) {
            match key.as_str() {
                "trustedconnection" | "integratedsecurity" => {
                    integrated = matches!(
                        value.to_ascii_lowercase().as_str(),
                        "true" | "yes" | "sspi"
                    );
                }
                "userid" | "uid" | "user" | "username" => has_user = !value.is_empty(),
                _ => {}
            }
        }

        if integrated && !has_user {
            Authentication::Integrated
        } else {
            Authentication::SqlServer
        }
    }

    /// Client configuration for these settings
    pub fn tds_config(&self) -> Result<TdsConfig> {
        let mut config = TdsConfig::from_ado_string(&self.connection_string)?;
        if self.authentication() == Authentication::Integrated {
            config.authentication(integrated_login()?);
        }
        Ok(config)
    }
}

/// Key/value pairs with keys lowercased and stripped of spaces and underscores
fn connection_values(connection_string: &str) -> impl Iterator<Item = (String, &str)> {
    connection_string.split(';').filter_map(|part| {
        let (key, value) = part.split_once('=')?;
        let key = key
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        Some((key, value.trim()))
    })
}

#[cfg(any(windows, all(unix, feature = "integrated-auth")))]
fn integrated_login() -> Result<AuthMethod> {
    Ok(AuthMethod::Integrated)
}

#[cfg(not(any(windows, all(unix, feature = "integrated-auth"))))]
fn integrated_login() -> Result<AuthMethod> {
    Err(Error::ConfigError(
        "Trusted connections need integrated authentication; build with the `integrated-auth` feature or give a User Id and Password".to_string(),
    ))
}

/// An open SQL Server connection, closed when dropped
pub struct DatabaseConnection {
    client: Client<Compat<TcpStream>>,
}

impl DatabaseConnection {
    /// Open a connection, honouring the configured connect timeout
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let config = settings.tds_config()?;

        match settings.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, Self::open(config))
                .await
                .map_err(|_| {
                    Error::ConnectionError(format!(
                        "Timed out after {:?} connecting to {}",
                        timeout,
                        mask_connection_string(&settings.connection_string)
                    ))
                })?,
            None => Self::open(config).await,
        }
    }

    async fn open(config: TdsConfig) -> Result<Self> {
        let addr = config.get_addr();
        // Resolves `server\instance` through the SQL Server Browser, plain TCP otherwise
        let tcp = TcpStream::connect_named(&config)
            .await
            .map_err(|e| Error::ConnectionError(format!("Failed to reach {}: {}", addr, e)))?;
        tcp.set_nodelay(true)
            .map_err(|e| Error::ConnectionError(format!("Failed to configure socket: {}", e)))?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        tracing::debug!(addr = %addr, "Connected to database");

        Ok(Self { client })
    }

    /// Run a query and collect the rows of its first result set
    pub async fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let rows = self
            .client
            .simple_query(sql)
            .await?
            .into_first_result()
            .await?;

        Ok(rows)
    }

    /// Close the connection gracefully
    pub async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
