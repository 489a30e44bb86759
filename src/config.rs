//! Server configuration
//!
//! Defaults suit local development; the server binary maps its CLI
//! flags onto the builder.

/// Default TCP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7171";

/// Default connection cap
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

/// Runtime configuration for a ScopeKV server
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Socket read timeout in milliseconds, 0 disables it
    pub read_timeout_ms: u64,

    /// Socket write timeout in milliseconds, 0 disables it
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            // Idle clients may sit between commands indefinitely
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Start building a config from the defaults
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for [`Config`]
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Address the server listens on (host:port)
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Cap on concurrently served connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Socket read timeout in milliseconds (0 = none)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Socket write timeout in milliseconds (0 = none)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
