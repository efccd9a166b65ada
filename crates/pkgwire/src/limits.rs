//! Limits applied before decoding untrusted input.

/// Largest serialized package message accepted (64 MiB).
pub const MAX_PACKAGE_MESSAGE_SIZE: usize = 64 * 1024 * 1024;
