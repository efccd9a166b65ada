//! Source location reconstruction.
//!
//! Wire locations may be partial. Offsets are kept only when both are
//! present, and line/column positions only when all four are; anything less
//! degrades to zeros. Reconstruction never fails.

use std::path::Path;

use crate::model::{LineAndColumn, Location};
use crate::wire;

pub fn reconstruct(path: &Path, location: Option<&wire::Location>) -> Location {
    let mut result = Location::for_file(path);
    let Some(location) = location else {
        return result;
    };

    if let (Some(start), Some(end)) = (location.start_offset, location.end_offset) {
        result.start_offset = start;
        result.end_offset = end;
    }

    if let (Some(start_line), Some(start_column), Some(end_line), Some(end_column)) = (
        location.start_line,
        location.start_column,
        location.end_line,
        location.end_column,
    ) {
        result.start = LineAndColumn::new(start_line, start_column);
        result.end = LineAndColumn::new(end_line, end_column);
    }

    result
}
