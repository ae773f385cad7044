use thiserror::Error;

use crate::config::{NotificationSettings, RegistrySettings, ServerSettings, Settings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_server(&settings.server) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_registry(&settings.registry) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_notifications(&settings.notifications) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(server: &ServerSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if server.host.trim().is_empty() {
            errors.push(ValidationError::MissingField("server.host".to_string()));
        }

        if server.port == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_registry(registry: &RegistrySettings) -> Result<(), Vec<ValidationError>> {
        match &registry.seed_dir {
            Some(dir) if !dir.is_dir() => Err(vec![ValidationError::InvalidValue {
                field: "registry.seed_dir".to_string(),
                reason: format!("{} is not a directory", dir.display()),
            }]),
            _ => Ok(()),
        }
    }

    fn validate_notifications(notifications: &NotificationSettings) -> Result<(), Vec<ValidationError>> {
        if notifications.capacity == 0 {
            return Err(vec![ValidationError::InvalidValue {
                field: "notifications.capacity".to_string(),
                reason: "Capacity must be greater than 0".to_string(),
            }]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings() -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            registry: RegistrySettings::default(),
            notifications: NotificationSettings::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(ConfigValidator::validate(&settings()).is_ok());
    }

    #[test]
    fn test_invalid_server() {
        let mut settings = settings();
        settings.server.host = String::new();
        settings.server.port = 0;

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_missing_seed_dir() {
        let mut settings = settings();
        settings.registry.seed_dir = Some(PathBuf::from("/definitely/not/here"));

        let errors = ConfigValidator::validate(&settings).unwrap_err();
        assert!(matches!(&errors[0], ValidationError::InvalidValue { field, .. } if field == "registry.seed_dir"));
    }

    #[test]
    fn test_zero_capacity() {
        let mut settings = settings();
        settings.notifications.capacity = 0;
        assert!(ConfigValidator::validate(&settings).is_err());
    }
}
