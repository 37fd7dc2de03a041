//! Gateway configuration.

use std::collections::HashMap;
use std::time::Duration;

use custodia_common::Address;

/// Main gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// The identity that constructs (and initially owns) the ledger.
    pub owner: Address,
    /// API key to caller-address mapping.
    pub api_keys: HashMap<String, Address>,
    /// Deadline for the outbound transfer; `None` disables the deadline.
    pub transfer_timeout: Option<Duration>,
    /// Maximum in-flight requests before the gateway applies backpressure.
    pub max_in_flight: usize,
    /// Log level.
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            owner: Address::new(""),
            api_keys: HashMap::new(),
            transfer_timeout: Some(Duration::from_secs(30)),
            max_in_flight: 256,
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("CUSTODIA_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("CUSTODIA_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(owner) = std::env::var("CUSTODIA_OWNER") {
            config.owner = Address::new(owner);
        }

        if let Ok(keys) = std::env::var("CUSTODIA_API_KEYS") {
            config.api_keys = parse_api_keys(&keys);
        }

        if let Ok(ms) = std::env::var("CUSTODIA_TRANSFER_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                config.transfer_timeout = if ms == 0 {
                    None
                } else {
                    Some(Duration::from_millis(ms))
                };
            }
        }

        if let Ok(limit) = std::env::var("CUSTODIA_MAX_IN_FLIGHT") {
            if let Ok(limit) = limit.parse() {
                config.max_in_flight = limit;
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if !self.owner.is_well_formed() {
            return Err("CUSTODIA_OWNER must be a well-formed address".to_string());
        }

        if self.max_in_flight == 0 {
            return Err("Max in-flight requests cannot be 0".to_string());
        }

        for (key, address) in &self.api_keys {
            if key.is_empty() {
                return Err("API keys cannot be empty".to_string());
            }
            if !address.is_well_formed() {
                return Err(format!(
                    "API key maps to a malformed address: {}",
                    address
                ));
            }
        }

        Ok(())
    }
}

/// Parse `key=address` pairs separated by commas.
fn parse_api_keys(raw: &str) -> HashMap<String, Address> {
    raw.split(',')
        .filter_map(|pair| {
            let (key, address) = pair.split_once('=')?;
            let key = key.trim();
            let address = address.trim();
            if key.is_empty() || address.is_empty() {
                return None;
            }
            Some((key.to_string(), Address::new(address)))
        })
        .collect()
}
