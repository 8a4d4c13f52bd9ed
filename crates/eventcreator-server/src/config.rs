//! Background service configuration.

/// Background service configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Commands that may queue before senders wait.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 16,
        }
    }
}

impl ServerConfig {
    /// Builder: set the command channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_capacity == 0 {
            return Err("channel capacity must be greater than zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.channel_capacity, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_zero_capacity() {
        let config = ServerConfig::default().with_channel_capacity(0);
        assert!(config.validate().is_err());
    }
}
