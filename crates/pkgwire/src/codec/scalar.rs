//! Decoders for scalar-like wire payloads.

use std::collections::BTreeSet;

use crate::error::DecodeError;
use crate::model::{DistributionType, EXCEPTION_PREFIX, License, SymlinkBehavior, TriState};
use crate::wire;

/// Decodes a license from its type tokens and exception labels.
///
/// Exceptions arrive as bare labels and are rewritten to the
/// `exception=<label>` token form before parsing.
pub fn decode_license(license: &wire::License) -> Result<License, DecodeError> {
    let tokens: Vec<String> = license
        .license_type
        .iter()
        .cloned()
        .chain(
            license
                .exception
                .iter()
                .map(|e| format!("{EXCEPTION_PREFIX}{e}")),
        )
        .collect();
    Ok(License::parse(&tokens)?)
}

pub fn decode_distribs<S: AsRef<str>>(
    tokens: &[S],
) -> Result<BTreeSet<DistributionType>, DecodeError> {
    Ok(crate::model::parse_distributions(tokens)?)
}

pub fn decode_tristate(value: &str) -> Result<TriState, DecodeError> {
    match value {
        "yes" => Ok(TriState::Yes),
        "no" => Ok(TriState::No),
        "auto" => Ok(TriState::Auto),
        _ => Err(DecodeError::InvalidTriState {
            value: value.to_string(),
        }),
    }
}

/// Maps the wire symlink enumeration. An absent value means copy.
pub fn decode_symlink_behavior(value: Option<i32>) -> Result<SymlinkBehavior, DecodeError> {
    let Some(raw) = value else {
        return Ok(SymlinkBehavior::Copy);
    };
    match wire::SymlinkBehavior::try_from(raw) {
        Ok(wire::SymlinkBehavior::Copy) => Ok(SymlinkBehavior::Copy),
        Ok(wire::SymlinkBehavior::Dereference) => Ok(SymlinkBehavior::Dereference),
        Err(_) => Err(DecodeError::InternalConsistency {
            context: "symlink behavior",
            value: raw,
        }),
    }
}
