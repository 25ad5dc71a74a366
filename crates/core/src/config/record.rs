use std::any::Any;
use std::fmt;

/// A declarative configuration record carried by a configuration-bearing type.
///
/// Type-reference fields hold either an implementation type or the sentinel
/// of their capability, which means "not configured".
pub trait ConfigurationRecord: Any + Send + Sync + Clone + fmt::Debug {
    /// A record whose type-reference fields all hold their sentinels and
    /// whose plain values are omitted
    fn unset() -> Self;
}

/// Describes one family of configuration records and how to check them.
///
/// Implementations play the part of a concrete resolver: they name the
/// default configuration-bearing type and validate supplied records.
pub trait ConfigurationSchema: Send + Sync {
    type Record: ConfigurationRecord;

    /// Name of the type carrying the built-in default record
    fn default_type_name(&self) -> &str;

    /// Diagnose a record, one message per problem
    fn validate(&self, record: &Self::Record) -> Vec<String>;
}
