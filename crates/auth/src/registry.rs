//! Privilege registry: the closed catalog of legal privileges and its
//! reconciliation against configuration.
//!
//! Both checks are pure. They are meant to run once, at startup or in a test
//! suite, never on the request path.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::config::SecurityConfig;
use crate::naming::{self, NamingError};
use crate::Privilege;

/// Configuration keys and declared privileges that failed to line up.
///
/// Each variant carries the complete, sorted list so configuration can be
/// fixed in one pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    /// Configured keys with no declared privilege.
    #[error("configured privilege keys not declared in registry: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    /// Declared privileges with no configuration key.
    #[error("declared privileges missing from configuration: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// Values declared by more than one entry, sorted.
    #[error("privilege values declared more than once: {}", .0.join(", "))]
    DuplicateValues(Vec<String>),

    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),
}

/// How strictly configuration must match the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconciliationMode {
    /// Configured keys must be declared privileges.
    #[default]
    Subset,
    /// Additionally, every declared privilege must be configured.
    Bijection,
}

/// Closed catalog of privileges.
///
/// Every declared entry is kept in declaration order, including entries that
/// repeat a value. Lookups by value resolve to the first declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivilegeRegistry {
    entries: Vec<Privilege>,
    by_value: BTreeMap<&'static str, usize>,
}

impl Default for PrivilegeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PrivilegeRegistry {
    /// Registry over [`Privilege::ALL`].
    pub fn builtin() -> Self {
        Self::from_privileges(Privilege::ALL.iter().copied())
    }

    /// Registry over an arbitrary table.
    pub fn from_privileges(privileges: impl IntoIterator<Item = Privilege>) -> Self {
        let entries: Vec<Privilege> = privileges.into_iter().collect();
        let mut by_value = BTreeMap::new();
        for (index, privilege) in entries.iter().enumerate() {
            by_value.entry(privilege.value()).or_insert(index);
        }
        Self { entries, by_value }
    }

    /// Number of declared entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every declared entry, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Privilege> + '_ {
        self.entries.iter().copied()
    }

    pub fn get(&self, value: &str) -> Option<Privilege> {
        self.by_value.get(value).map(|&index| self.entries[index])
    }

    /// Whether a configuration key names a declared privilege.
    pub fn contains_key(&self, key: &str) -> bool {
        self.by_value.contains_key(key)
    }

    /// Every declared identifier.
    pub fn list_identifiers(&self) -> BTreeSet<&'static str> {
        self.iter().map(|p| p.identifier()).collect()
    }

    /// Each value must be declared by exactly one entry.
    pub fn validate_unique_values(&self) -> Result<(), RegistryError> {
        let duplicates: Vec<String> = self
            .by_value
            .keys()
            .filter(|value| self.entries.iter().filter(|p| p.value() == **value).count() > 1)
            .map(|value| value.to_string())
            .collect();

        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::DuplicateValues(duplicates))
        }
    }

    /// Check one `(identifier, value)` pair.
    pub fn validate_naming(identifier: &str, value: &str) -> Result<(), NamingError> {
        naming::validate_naming(identifier, value)
    }

    /// Run the naming check over every declared entry, stopping at the first
    /// violation.
    pub fn validate_all_naming(&self) -> Result<(), NamingError> {
        self.iter()
            .try_for_each(|p| naming::validate_naming(p.identifier(), p.value()))
    }

    /// Every configured key must be a declared privilege.
    pub fn validate_against_config<I, S>(&self, configured_keys: I) -> Result<(), ReconciliationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unknown: BTreeSet<String> = configured_keys
            .into_iter()
            .map(|key| key.as_ref().to_string())
            .filter(|key| !self.contains_key(key))
            .collect();

        if unknown.is_empty() {
            Ok(())
        } else {
            Err(ReconciliationError::UnknownKeys(unknown.into_iter().collect()))
        }
    }

    /// Every declared privilege must have a configured key.
    pub fn validate_coverage<I, S>(&self, configured_keys: I) -> Result<(), ReconciliationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let configured: BTreeSet<String> = configured_keys
            .into_iter()
            .map(|key| key.as_ref().to_string())
            .collect();
        let missing: Vec<String> = self
            .by_value
            .keys()
            .filter(|value| !configured.contains(**value))
            .map(|value| value.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReconciliationError::MissingKeys(missing))
        }
    }

    /// Both directions. Unknown keys are reported before missing ones.
    pub fn reconcile<I, S>(&self, configured_keys: I) -> Result<(), ReconciliationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<S> = configured_keys.into_iter().collect();
        self.validate_against_config(keys.iter().map(AsRef::<str>::as_ref))?;
        self.validate_coverage(keys.iter().map(AsRef::<str>::as_ref))
    }

    /// Startup self-test: naming over the whole table, value uniqueness, then
    /// reconciliation against the loaded security section.
    pub fn self_check(
        &self,
        security: &SecurityConfig,
        mode: ReconciliationMode,
    ) -> Result<(), RegistryError> {
        let result = self.run_self_check(security, mode);
        match &result {
            Ok(()) => tracing::info!(
                privileges = self.len(),
                configured = security.privileges.len(),
                ?mode,
                "privilege registry self-check passed"
            ),
            Err(err) => tracing::error!(error = %err, ?mode, "privilege registry self-check failed"),
        }
        result
    }

    fn run_self_check(
        &self,
        security: &SecurityConfig,
        mode: ReconciliationMode,
    ) -> Result<(), RegistryError> {
        self.validate_all_naming()?;
        self.validate_unique_values()?;
        let keys = security.privilege_keys();
        match mode {
            ReconciliationMode::Subset => self.validate_against_config(&keys)?,
            ReconciliationMode::Bijection => self.reconcile(&keys)?,
        }
        Ok(())
    }
}
