//! Decoding from the wire schema into the package model.

pub mod location;
pub mod package;
pub mod scalar;
pub mod value;

pub use location::reconstruct;
pub use package::{decode_package_message, deserialize_legacy_package, deserialize_package};
pub use scalar::{decode_distribs, decode_license, decode_symlink_behavior, decode_tristate};
pub use value::{decode_attribute, decode_attribute_value, decode_fileset_entries, decode_globs};
