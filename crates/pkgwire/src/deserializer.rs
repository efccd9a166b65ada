//! Configured entry points.
//!
//! A [`PackageDeserializer`] owns the two collaborators every decode needs:
//! the rule-class registry and the build-file resolver. Both are shared
//! read-only, so one deserializer can serve many threads at once.

use std::path::PathBuf;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::codec::{decode_package_message, deserialize_legacy_package, deserialize_package};
use crate::error::DecodeError;
use crate::event::EventCollector;
use crate::model::{BulkPackageLocator, LegacyPackage, Package, RuleClassRegistry};
use crate::wire;

/// Maps a package name to the path of its build file.
///
/// May block. Returning `None` means the package could not be located.
pub trait BuildFileResolver {
    fn build_file(&self, package: &str) -> Option<PathBuf>;
}

impl<F> BuildFileResolver for F
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn build_file(&self, package: &str) -> Option<PathBuf> {
        self(package)
    }
}

/// A fixed package name to build file table.
#[derive(Debug, Clone, Default)]
pub struct BuildFileMap {
    files: FxHashMap<String, PathBuf>,
}

impl BuildFileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: impl Into<String>, build_file: impl Into<PathBuf>) {
        self.files.insert(package.into(), build_file.into());
    }

    /// Adds an entry (builder style).
    pub fn with(mut self, package: impl Into<String>, build_file: impl Into<PathBuf>) -> Self {
        self.insert(package, build_file);
        self
    }
}

impl BuildFileResolver for BuildFileMap {
    fn build_file(&self, package: &str) -> Option<PathBuf> {
        self.files.get(package).cloned()
    }
}

/// Collaborators shared by every decode.
#[derive(Clone)]
pub struct DeserializerConfig {
    pub registry: Arc<dyn RuleClassRegistry + Send + Sync>,
    pub resolver: Arc<dyn BuildFileResolver + Send + Sync>,
}

impl DeserializerConfig {
    pub fn new(
        registry: impl RuleClassRegistry + Send + Sync + 'static,
        resolver: impl BuildFileResolver + Send + Sync + 'static,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            resolver: Arc::new(resolver),
        }
    }
}

impl std::fmt::Debug for DeserializerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeserializerConfig").finish_non_exhaustive()
    }
}

/// An assembled package and the diagnostics replayed while decoding it.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPackage<P> {
    pub package: P,
    pub events: EventCollector,
}

#[derive(Debug, Clone)]
pub struct PackageDeserializer {
    config: DeserializerConfig,
}

impl PackageDeserializer {
    pub fn new(config: DeserializerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeserializerConfig {
        &self.config
    }

    pub fn deserialize(
        &self,
        message: &wire::Package,
    ) -> Result<DecodedPackage<Package>, DecodeError> {
        deserialize_package(&*self.config.registry, &*self.config.resolver, message)
    }

    pub fn deserialize_legacy(
        &self,
        message: &wire::Package,
        locator: &dyn BulkPackageLocator,
    ) -> Result<DecodedPackage<LegacyPackage>, DecodeError> {
        deserialize_legacy_package(
            &*self.config.registry,
            &*self.config.resolver,
            locator,
            message,
        )
    }

    /// Decodes raw message bytes, then assembles the package.
    pub fn deserialize_bytes(&self, bytes: &[u8]) -> Result<DecodedPackage<Package>, DecodeError> {
        let message = decode_package_message(bytes)?;
        self.deserialize(&message)
    }
}
