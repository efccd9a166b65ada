//! Decoded package model.
//!
//! This module contains the typed values the decoder produces:
//! - Labels and source locations
//! - Licenses and distribution sets
//! - Attribute values, rules and rule-class schemas
//! - Packages and the builders that assemble them

pub mod builder;
pub mod label;
pub mod license;
pub mod location;
pub mod package;
pub mod rule;
pub mod value;

pub use builder::{
    BulkPackageLocator, EMPTY_PACKAGE_LOCATOR, EmptyPackageLocator, LegacyPackage,
    LegacyPackageBuilder, PackageBuilder, SubpackageCrossing,
};
pub use label::{Label, parse_label, parse_labels};
pub use license::{DistributionType, EXCEPTION_PREFIX, License, LicenseType, parse_distributions};
pub use location::{LineAndColumn, Location};
pub use package::{
    InputFile, MakeBinding, MakeEnvironment, PRIVATE_VISIBILITY, PUBLIC_VISIBILITY, Package,
    PackageGroup, RuleVisibility, Subinclude,
};
pub use rule::{Rule, RuleClass, RuleClassMap, RuleClassRegistry};
pub use value::{
    AttributeType, AttributeValue, FilesetEntry, GlobCriteria, GlobList, ParsedAttribute,
    SymlinkBehavior, TriState,
};
