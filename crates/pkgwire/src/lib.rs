//! pkgwire: typed build packages from their protocol-buffer wire form.
//!
//! A build-file parser serializes each evaluated package into a
//! [`wire::Package`] message. This crate turns such a message back into a
//! [`Package`] of rules, input files and package groups, validating every
//! label and attribute against a rule-class registry on the way.
//!
//! # Quick Start
//!
//! ```rust
//! use pkgwire::{AttributeType, BuildFileMap, DeserializerConfig, PackageDeserializer};
//! use pkgwire::model::{AttributeValue, RuleClass, RuleClassMap};
//! use pkgwire::wire;
//!
//! let registry = RuleClassMap::new()
//!     .with(RuleClass::new("genrule").attr("outs", AttributeType::OutputList));
//! let resolver = BuildFileMap::new().with("pkg", "ws/pkg/BUILD");
//! let deserializer = PackageDeserializer::new(DeserializerConfig::new(registry, resolver));
//!
//! let message = wire::Package {
//!     name: "pkg".to_string(),
//!     rule: vec![wire::Rule {
//!         name: "//pkg:a".to_string(),
//!         rule_class: "genrule".to_string(),
//!         attribute: vec![wire::Attribute {
//!             name: "outs".to_string(),
//!             r#type: wire::Discriminator::OutputList as i32,
//!             string_list_value: vec!["//pkg:out.txt".to_string()],
//!             ..Default::default()
//!         }],
//!         parseable_location: None,
//!     }],
//!     ..Default::default()
//! };
//!
//! let decoded = deserializer.deserialize(&message).unwrap();
//! let rule = decoded.package.rule("a").unwrap();
//! assert!(matches!(rule.value("outs"), Some(AttributeValue::LabelList(_))));
//! assert!(!decoded.package.contains_errors());
//! ```
//!
//! # Modules
//!
//! - [`wire`]: Protocol-buffer message definitions
//! - [`model`]: Decoded types (Label, Rule, Package) and package builders
//! - [`codec`]: Wire to model decoding and package assembly
//! - [`deserializer`]: Configured entry points and collaborator traits
//! - [`event`]: Diagnostic events carried by decoded packages
//! - [`error`]: Error types
//! - [`limits`]: Size limits for untrusted input
//!
//! # Failure model
//!
//! A decode either yields a whole package or fails with a [`DecodeError`];
//! partially assembled packages are never returned. Diagnostics the
//! producer recorded are not failures: they arrive in
//! [`DecodedPackage::events`].

pub mod codec;
pub mod deserializer;
pub mod error;
pub mod event;
pub mod limits;
pub mod model;
pub mod wire;

// Re-export commonly used types at crate root
pub use codec::{decode_package_message, deserialize_legacy_package, deserialize_package};
pub use deserializer::{
    BuildFileMap, BuildFileResolver, DecodedPackage, DeserializerConfig, PackageDeserializer,
};
pub use error::{DecodeError, ErrorKind, Interrupted, LabelError, LicenseParseError};
pub use event::{Event, EventCollector, EventHandler, EventKind};
pub use model::{
    AttributeType, AttributeValue, BulkPackageLocator, EMPTY_PACKAGE_LOCATOR, InputFile, Label,
    LegacyPackage, License, Location, Package, PackageGroup, Rule, RuleClass, RuleClassMap,
    RuleClassRegistry, RuleVisibility,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
