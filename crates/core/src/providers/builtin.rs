//! Built-in implementations of every service of the layer.

use crate::services::{
    ConfigurationProvider, ConfigurationProviderFactory, DatatypeConverterRegistry,
    DatatypeConverterRegistryFactory, InfoProvider, InfoProviderFactory, LocaleProvider,
    LocaleProviderFactory, MessageRepository, MessageRepositoryFactory, PrincipalProvider,
    PrincipalProviderFactory, TraceProvider, TraceProviderFactory, Verifier, VerifierFactory,
};
use crate::trace::TracingTraceProvider;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

pub const TRACE_PROVIDER_FACTORY: &str = "wireup.builtin.TracingTraceProviderFactory";
pub const MESSAGE_REPOSITORY_FACTORY: &str = "wireup.builtin.InMemoryMessageRepositoryFactory";
pub const VERIFIER_FACTORY: &str = "wireup.builtin.RuleVerifierFactory";
pub const CONFIGURATION_PROVIDER_FACTORY: &str = "wireup.builtin.EnvConfigurationProviderFactory";
pub const LOCALE_PROVIDER_FACTORY: &str = "wireup.builtin.EnvLocaleProviderFactory";
pub const PRINCIPAL_PROVIDER_FACTORY: &str = "wireup.builtin.ProcessPrincipalProviderFactory";
pub const INFO_PROVIDER_FACTORY: &str = "wireup.builtin.RuntimeInfoProviderFactory";
pub const DATATYPE_CONVERTER_REGISTRY_FACTORY: &str =
    "wireup.builtin.StandardDatatypeConverterRegistryFactory";

#[derive(Debug, Default)]
pub struct TracingTraceProviderFactory;

impl TraceProviderFactory for TracingTraceProviderFactory {
    fn trace_provider(&self) -> Arc<dyn TraceProvider> {
        Arc::new(TracingTraceProvider)
    }
}

/// Messages held in memory, keyed by locale then key
#[derive(Debug, Default, Clone)]
pub struct InMemoryMessageRepository {
    messages: HashMap<String, HashMap<String, String>>,
}

impl InMemoryMessageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message
    pub fn with_message(mut self, locale: &str, key: &str, text: &str) -> Self {
        self.messages
            .entry(locale.to_string())
            .or_default()
            .insert(key.to_string(), text.to_string());
        self
    }
}

impl MessageRepository for InMemoryMessageRepository {
    fn message(&self, locale: &str, key: &str) -> Option<String> {
        // "de_CH" falls back to "de"
        let language = locale.split(['_', '-']).next().unwrap_or(locale);
        [locale, language]
            .iter()
            .find_map(|l| self.messages.get(*l).and_then(|m| m.get(key)))
            .cloned()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryMessageRepositoryFactory;

impl MessageRepositoryFactory for InMemoryMessageRepositoryFactory {
    fn message_repository(&self) -> Arc<dyn MessageRepository> {
        Arc::new(InMemoryMessageRepository::new())
    }
}

/// Verifies `required`, `numeric` and `max-length:N` rules
#[derive(Debug, Default)]
pub struct RuleVerifier;

impl Verifier for RuleVerifier {
    fn verify(&self, rule: &str, value: &str) -> Result<(), String> {
        match rule.split_once(':') {
            None if rule == "required" => {
                if value.trim().is_empty() {
                    Err("value is required".to_string())
                } else {
                    Ok(())
                }
            }
            None if rule == "numeric" => value
                .trim()
                .parse::<f64>()
                .map(|_| ())
                .map_err(|_| format!("'{}' is not numeric", value)),
            Some(("max-length", limit)) => {
                let limit: usize = limit
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid max-length limit '{}'", limit))?;
                if value.chars().count() > limit {
                    Err(format!("value longer than {} characters", limit))
                } else {
                    Ok(())
                }
            }
            _ => Err(format!("unknown rule '{}'", rule)),
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleVerifierFactory;

impl VerifierFactory for RuleVerifierFactory {
    fn verifier(&self) -> Arc<dyn Verifier> {
        Arc::new(RuleVerifier)
    }
}

/// Reads `app.key` as the environment variable `WIREUP_APP_APP_KEY`
#[derive(Debug, Clone)]
pub struct EnvConfigurationProvider {
    prefix: String,
}

impl EnvConfigurationProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable holding the key
    pub fn variable(&self, key: &str) -> String {
        let key: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}", self.prefix, key)
    }
}

impl ConfigurationProvider for EnvConfigurationProvider {
    fn value(&self, key: &str) -> Option<String> {
        env::var(self.variable(key)).ok()
    }
}

#[derive(Debug, Default)]
pub struct EnvConfigurationProviderFactory;

impl ConfigurationProviderFactory for EnvConfigurationProviderFactory {
    fn configuration_provider(&self) -> Arc<dyn ConfigurationProvider> {
        Arc::new(EnvConfigurationProvider::new("WIREUP_APP_"))
    }
}

/// Locale taken from `LC_ALL`, then `LANG`
#[derive(Debug, Default)]
pub struct EnvLocaleProvider;

impl EnvLocaleProvider {
    /// Strip encoding and modifier: `de_CH.UTF-8@euro` is `de_CH`
    pub fn normalize(raw: &str) -> Option<String> {
        let locale = raw.split(['.', '@']).next().unwrap_or_default().trim();
        match locale {
            "" | "C" | "POSIX" => None,
            locale => Some(locale.to_string()),
        }
    }
}

impl LocaleProvider for EnvLocaleProvider {
    fn locale(&self) -> String {
        ["LC_ALL", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find_map(|raw| Self::normalize(&raw))
            .unwrap_or_else(|| "en".to_string())
    }
}

#[derive(Debug, Default)]
pub struct EnvLocaleProviderFactory;

impl LocaleProviderFactory for EnvLocaleProviderFactory {
    fn locale_provider(&self) -> Arc<dyn LocaleProvider> {
        Arc::new(EnvLocaleProvider)
    }
}

/// The operating-system user running the process
#[derive(Debug, Default)]
pub struct ProcessPrincipalProvider;

impl PrincipalProvider for ProcessPrincipalProvider {
    fn principal(&self) -> Option<String> {
        env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .ok()
            .filter(|user| !user.is_empty())
    }
}

#[derive(Debug, Default)]
pub struct ProcessPrincipalProviderFactory;

impl PrincipalProviderFactory for ProcessPrincipalProviderFactory {
    fn principal_provider(&self) -> Arc<dyn PrincipalProvider> {
        Arc::new(ProcessPrincipalProvider)
    }
}

#[derive(Debug, Default)]
pub struct RuntimeInfoProvider;

impl InfoProvider for RuntimeInfoProvider {
    fn info(&self) -> Vec<(String, String)> {
        vec![
            ("wireup.version".to_string(), crate::VERSION.to_string()),
            ("os".to_string(), env::consts::OS.to_string()),
            ("arch".to_string(), env::consts::ARCH.to_string()),
            ("cpus".to_string(), num_cpus::get().to_string()),
            ("pid".to_string(), std::process::id().to_string()),
        ]
    }
}

#[derive(Debug, Default)]
pub struct RuntimeInfoProviderFactory;

impl InfoProviderFactory for RuntimeInfoProviderFactory {
    fn info_provider(&self) -> Arc<dyn InfoProvider> {
        Arc::new(RuntimeInfoProvider)
    }
}

/// Canonical forms for `string`, `boolean`, `integer` and `decimal`
#[derive(Debug, Default)]
pub struct StandardDatatypeConverterRegistry;

impl DatatypeConverterRegistry for StandardDatatypeConverterRegistry {
    fn datatypes(&self) -> Vec<String> {
        ["string", "boolean", "integer", "decimal"]
            .iter()
            .map(|d| d.to_string())
            .collect()
    }

    fn convert(&self, datatype: &str, value: &str) -> Result<String, String> {
        let trimmed = value.trim();
        match datatype {
            "string" => Ok(value.to_string()),
            "boolean" => match trimmed.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok("true".to_string()),
                "false" | "0" | "no" => Ok("false".to_string()),
                _ => Err(format!("'{}' is not a boolean", value)),
            },
            "integer" => trimmed
                .parse::<i64>()
                .map(|i| i.to_string())
                .map_err(|e| format!("'{}' is not an integer: {}", value, e)),
            "decimal" => trimmed
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite())
                .map(|d| d.to_string())
                .ok_or_else(|| format!("'{}' is not a decimal", value)),
            _ => Err(format!("unsupported datatype '{}'", datatype)),
        }
    }
}

#[derive(Debug, Default)]
pub struct StandardDatatypeConverterRegistryFactory;

impl DatatypeConverterRegistryFactory for StandardDatatypeConverterRegistryFactory {
    fn datatype_converter_registry(&self) -> Arc<dyn DatatypeConverterRegistry> {
        Arc::new(StandardDatatypeConverterRegistry)
    }
}
