use crate::bootstrap::SlotState;
use crate::config::{BootstrapSettings, ConfigSource};
use crate::errors::CoreError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Where the default configuration came from
#[derive(Debug, Clone, Serialize)]
pub struct DefaultSourceReport {
    pub type_name: String,
    pub available: bool,
}

/// Where the custom configuration came from
#[derive(Debug, Clone, Serialize)]
pub struct CustomSourceReport {
    pub resource: String,
    pub resource_exists: bool,
    pub type_name: Option<String>,
    pub available: bool,
}

/// Serializable snapshot of a bootstrapped service layer
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub instance_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub version: String,
    pub settings: BootstrapSettings,
    pub setting_sources: BTreeMap<String, ConfigSource>,
    pub default_configuration: DefaultSourceReport,
    pub custom_configuration: CustomSourceReport,
    pub application_name: Option<String>,
    pub supported_locales: Option<Vec<String>>,
    /// Bound implementation per role, `None` when the role is unbound
    pub bindings: BTreeMap<String, Option<String>>,
    pub tracing: SlotState,
    pub startup_writers: Vec<String>,
    pub errors: Vec<String>,
}

impl BootstrapReport {
    /// Check if the configuration was analysed without errors
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_yaml(&self) -> Result<String, CoreError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
