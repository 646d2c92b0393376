use crate::error::ConfigError;
use crate::identity::DEFAULT_UUID_API_URL;
use std::env;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.office365.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_RESTART_DELAY_SECS: u64 = 12;

/// Runtime settings. A missing sender credential is reported when mail is sent.
#[derive(Clone)]
pub struct Config {
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub uuid_api_url: String,
    pub restart_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let smtp_port = match non_empty("SMTP_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "SMTP_PORT".into(),
                value,
            })?,
            None => DEFAULT_SMTP_PORT,
        };
        let restart_delay_secs = match non_empty("RESTART_DELAY_SECS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: "RESTART_DELAY_SECS".into(),
                value,
            })?,
            None => DEFAULT_RESTART_DELAY_SECS,
        };

        Ok(Self {
            sender_email: non_empty("SENDER_EMAIL"),
            sender_password: non_empty("SENDER_PASSWORD"),
            smtp_server: non_empty("SMTP_SERVER").unwrap_or_else(|| DEFAULT_SMTP_SERVER.into()),
            smtp_port,
            uuid_api_url: non_empty("UUID_API_URL").unwrap_or_else(|| DEFAULT_UUID_API_URL.into()),
            restart_delay: Duration::from_secs(restart_delay_secs),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("sender_email", &self.sender_email)
            .field("sender_password", &self.sender_password.as_ref().map(|_| "<redacted>"))
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("uuid_api_url", &self.uuid_api_url)
            .field("restart_delay", &self.restart_delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.sender_email, None);
        assert_eq!(config.sender_password, None);
        assert_eq!(config.smtp_server, "smtp.office365.com");
        assert_eq!(config.smtp_port, 587);
        assert_eq!(config.uuid_api_url, DEFAULT_UUID_API_URL);
        assert_eq!(config.restart_delay, Duration::from_secs(12));
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = config_from(&[
            ("SENDER_EMAIL", "forms@example.com"),
            ("SENDER_PASSWORD", "hunter2"),
            ("SMTP_SERVER", "mail.example.com"),
            ("SMTP_PORT", "2525"),
            ("RESTART_DELAY_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(config.sender_email.as_deref(), Some("forms@example.com"));
        assert_eq!(config.smtp_server, "mail.example.com");
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.restart_delay, Duration::ZERO);
    }

    #[test]
    fn blank_secrets_count_as_missing() {
        let config = config_from(&[("SENDER_EMAIL", "  ")]).unwrap();
        assert_eq!(config.sender_email, None);
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = config_from(&[("SMTP_PORT", "smtp")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref name, .. } if name == "SMTP_PORT"));
    }

    #[test]
    fn debug_output_hides_password() {
        let config = config_from(&[("SENDER_PASSWORD", "hunter2")]).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }
}
