//! Licenses and distribution sets.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::LicenseParseError;
use crate::model::Label;

/// Prefix marking a license exception token.
pub const EXCEPTION_PREFIX: &str = "exception=";

/// License categories, from most to least restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LicenseType {
    ByExceptionOnly,
    Restricted,
    Reciprocal,
    Notice,
    Permissive,
    Unencumbered,
    None,
}

impl LicenseType {
    /// Parses a license type token (case-insensitive).
    pub fn from_token(token: &str) -> Option<LicenseType> {
        match token.to_ascii_lowercase().as_str() {
            "by_exception_only" => Some(LicenseType::ByExceptionOnly),
            "restricted" => Some(LicenseType::Restricted),
            "reciprocal" => Some(LicenseType::Reciprocal),
            "notice" => Some(LicenseType::Notice),
            "permissive" => Some(LicenseType::Permissive),
            "unencumbered" => Some(LicenseType::Unencumbered),
            "none" => Some(LicenseType::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseType::ByExceptionOnly => "by_exception_only",
            LicenseType::Restricted => "restricted",
            LicenseType::Reciprocal => "reciprocal",
            LicenseType::Notice => "notice",
            LicenseType::Permissive => "permissive",
            LicenseType::Unencumbered => "unencumbered",
            LicenseType::None => "none",
        }
    }
}

/// Where a target may be distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DistributionType {
    Internal,
    Web,
    Client,
    Embedded,
}

impl DistributionType {
    /// Parses a distribution token (case-insensitive).
    pub fn from_token(token: &str) -> Option<DistributionType> {
        match token.to_ascii_lowercase().as_str() {
            "internal" => Some(DistributionType::Internal),
            "web" => Some(DistributionType::Web),
            "client" => Some(DistributionType::Client),
            "embedded" => Some(DistributionType::Embedded),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionType::Internal => "internal",
            DistributionType::Web => "web",
            DistributionType::Client => "client",
            DistributionType::Embedded => "embedded",
        }
    }
}

/// A set of license types plus exception labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct License {
    types: BTreeSet<LicenseType>,
    exceptions: BTreeSet<Label>,
}

impl License {
    /// The license of targets that declare none.
    pub fn no_license() -> Self {
        Self {
            types: BTreeSet::from([LicenseType::None]),
            exceptions: BTreeSet::new(),
        }
    }

    /// Parses license tokens: type names and `exception=<label>` entries.
    ///
    /// An input with no type tokens is [`License::no_license`] plus any
    /// exceptions.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<License, LicenseParseError> {
        let mut types = BTreeSet::new();
        let mut exceptions = BTreeSet::new();

        for token in tokens {
            let token = token.as_ref();
            if let Some(exception) = token.strip_prefix(EXCEPTION_PREFIX) {
                let label = Label::parse(exception).map_err(LicenseParseError::InvalidException)?;
                exceptions.insert(label);
            } else {
                let license_type = LicenseType::from_token(token).ok_or_else(|| {
                    LicenseParseError::InvalidLicenseType {
                        token: token.to_string(),
                    }
                })?;
                types.insert(license_type);
            }
        }

        if types.is_empty() {
            types.insert(LicenseType::None);
        }

        Ok(License { types, exceptions })
    }

    pub fn types(&self) -> &BTreeSet<LicenseType> {
        &self.types
    }

    pub fn exceptions(&self) -> &BTreeSet<Label> {
        &self.exceptions
    }

    /// True if this is exactly the `none` license with no exceptions.
    pub fn is_no_license(&self) -> bool {
        self.exceptions.is_empty() && self.types.len() == 1 && self.types.contains(&LicenseType::None)
    }
}

impl Default for License {
    fn default() -> Self {
        Self::no_license()
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for t in &self.types {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            f.write_str(t.as_str())?;
        }
        for e in &self.exceptions {
            write!(f, ", {EXCEPTION_PREFIX}{e}")?;
        }
        Ok(())
    }
}

/// Parses distribution tokens into a set.
pub fn parse_distributions<S: AsRef<str>>(
    tokens: &[S],
) -> Result<BTreeSet<DistributionType>, LicenseParseError> {
    tokens
        .iter()
        .map(|token| {
            let token = token.as_ref();
            DistributionType::from_token(token).ok_or_else(|| {
                LicenseParseError::InvalidDistributionType {
                    token: token.to_string(),
                }
            })
        })
        .collect()
}
