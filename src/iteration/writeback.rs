//! Structural merge of per-fragment results into the original body.

use crate::core::body::{BodyError, Element};
use crate::selector::FragmentHandle;

/// Replace every handle's position in `original` with its result.
///
/// Handles must come from one selection over `original`, so they never
/// overlap and their paths stay valid regardless of replacement order.
pub fn merge(
    mut original: Element,
    handles: &[FragmentHandle],
    replacements: Vec<Element>,
) -> Result<Element, BodyError> {
    if handles.len() != replacements.len() {
        return Err(BodyError::ReplacementCount {
            expected: handles.len(),
            found: replacements.len(),
        });
    }
    for (handle, replacement) in handles.iter().zip(replacements) {
        original.replace_at(&handle.path, replacement)?;
    }
    Ok(original)
}
