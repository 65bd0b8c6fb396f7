use std::collections::HashSet;

use smol_str::SmolStr;

use crate::constants::MAX_DEPTH;
use crate::error::{ArrayKind, Error};
use crate::Result;

pub(crate) fn validate_array_length(
    expected: usize,
    actual: usize,
    kind: ArrayKind,
) -> Result<()> {
    if expected != actual {
        return Err(Error::count_mismatch(expected, actual, kind));
    }
    Ok(())
}

pub(crate) fn validate_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::depth_exceeded(MAX_DEPTH));
    }
    Ok(())
}

pub(crate) fn validate_field_list(fields: &[SmolStr], line_no: usize) -> Result<()> {
    if fields.is_empty() {
        return Err(Error::syntax_at(line_no, "empty field list"));
    }
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(Error::syntax_at(
                line_no,
                format!("duplicate field name: '{field}'"),
            ));
        }
    }
    Ok(())
}
