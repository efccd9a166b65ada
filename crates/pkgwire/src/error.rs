//! Error types for package decoding.

use thiserror::Error;

/// Classification of [`DecodeError`]s.
///
/// Every kind aborts the package being decoded. Only
/// [`ErrorKind::InternalConsistency`] marks a broken producer/decoder
/// contract rather than bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed identifier text.
    InvalidLabel,
    /// Rule references a class absent from the schema registry.
    UnknownRuleClass,
    /// Attribute not declared by its rule class.
    UnknownAttribute,
    /// Wire discriminant not recognized by this decoder version.
    UnknownAttributeEncoding,
    /// Malformed license or distribution tokens.
    LicenseParse,
    /// Tri-state string outside {yes, no, auto}.
    InvalidTriState,
    /// Duplicate target name, or a target outside the decoded package.
    NameConflict,
    /// The build-file resolver could not locate a package.
    UnresolvedBuildFile,
    /// The raw bytes are not a valid package message.
    MalformedMessage,
    /// A blocking collaborator was interrupted.
    Interrupted,
    /// An enumerated wire value outside its known set.
    InternalConsistency,
}

impl ErrorKind {
    /// Returns the stable short name of this kind (e.g. "invalid-label").
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidLabel => "invalid-label",
            ErrorKind::UnknownRuleClass => "unknown-rule-class",
            ErrorKind::UnknownAttribute => "unknown-attribute",
            ErrorKind::UnknownAttributeEncoding => "unknown-attribute-encoding",
            ErrorKind::LicenseParse => "license-parse",
            ErrorKind::InvalidTriState => "invalid-tristate",
            ErrorKind::NameConflict => "name-conflict",
            ErrorKind::UnresolvedBuildFile => "unresolved-build-file",
            ErrorKind::MalformedMessage => "malformed-message",
            ErrorKind::Interrupted => "interrupted",
            ErrorKind::InternalConsistency => "internal-consistency",
        }
    }

    /// Returns true for programming-contract violations.
    pub fn is_defect(&self) -> bool {
        matches!(self, ErrorKind::InternalConsistency)
    }
}

/// Label syntax error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid label '{label}': {reason}")]
pub struct LabelError {
    pub label: String,
    pub reason: &'static str,
}

impl LabelError {
    pub(crate) fn new(label: &str, reason: &'static str) -> Self {
        Self {
            label: label.to_string(),
            reason,
        }
    }
}

/// Error parsing license or distribution tokens.
///
/// Licenses and distribution sets share this one error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseParseError {
    #[error("invalid license type: '{token}'")]
    InvalidLicenseType { token: String },

    #[error("invalid license exception: {0}")]
    InvalidException(#[source] LabelError),

    #[error("invalid distribution type: '{token}'")]
    InvalidDistributionType { token: String },
}

/// A blocking collaborator gave up before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Error raised while decoding a package message.
///
/// Any of these aborts the whole package decode; no partially assembled
/// package is returned alongside it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error(transparent)]
    InvalidLabel(#[from] LabelError),

    #[error("invalid rule class '{rule_class}'")]
    UnknownRuleClass { rule_class: String },

    #[error("rule class '{rule_class}' has no attribute '{attribute}'")]
    UnknownAttribute {
        rule_class: String,
        attribute: String,
    },

    #[error("attribute '{attribute}' has unsupported wire discriminator {discriminator}")]
    UnknownAttributeEncoding {
        attribute: String,
        discriminator: i32,
    },

    #[error(transparent)]
    LicenseParse(#[from] LicenseParseError),

    #[error("invalid tristate value: '{value}'")]
    InvalidTriState { value: String },

    #[error("{kind} '{name}' conflicts with an existing target in package '{package}'")]
    NameConflict {
        package: String,
        name: String,
        kind: &'static str,
    },

    #[error("target '{label}' does not belong to package '{package}'")]
    RuleOutsidePackage { package: String, label: String },

    #[error("no build file found for sub-included package '{package}' (from '{label}')")]
    UnresolvedSubinclude { label: String, package: String },

    #[error("no build file found for package '{package}'")]
    BuildFileNotFound { package: String },

    #[error("package message length {len} exceeds maximum {max}")]
    MessageTooLarge { len: usize, max: usize },

    #[error("malformed package message: {0}")]
    MalformedMessage(String),

    #[error("interrupted while {context}")]
    Interrupted { context: &'static str },

    #[error("internal consistency failure: {context} (value {value})")]
    InternalConsistency { context: &'static str, value: i32 },
}

impl DecodeError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecodeError::InvalidLabel(_) => ErrorKind::InvalidLabel,
            DecodeError::UnknownRuleClass { .. } => ErrorKind::UnknownRuleClass,
            DecodeError::UnknownAttribute { .. } => ErrorKind::UnknownAttribute,
            DecodeError::UnknownAttributeEncoding { .. } => ErrorKind::UnknownAttributeEncoding,
            DecodeError::LicenseParse(_) => ErrorKind::LicenseParse,
            DecodeError::InvalidTriState { .. } => ErrorKind::InvalidTriState,
            DecodeError::NameConflict { .. } | DecodeError::RuleOutsidePackage { .. } => {
                ErrorKind::NameConflict
            }
            DecodeError::UnresolvedSubinclude { .. } | DecodeError::BuildFileNotFound { .. } => {
                ErrorKind::UnresolvedBuildFile
            }
            DecodeError::MessageTooLarge { .. } | DecodeError::MalformedMessage(_) => {
                ErrorKind::MalformedMessage
            }
            DecodeError::Interrupted { .. } => ErrorKind::Interrupted,
            DecodeError::InternalConsistency { .. } => ErrorKind::InternalConsistency,
        }
    }
}

impl From<prost::DecodeError> for DecodeError {
    fn from(e: prost::DecodeError) -> Self {
        DecodeError::MalformedMessage(e.to_string())
    }
}
