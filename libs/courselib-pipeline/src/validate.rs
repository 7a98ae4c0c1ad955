//! Business-rule validation of bound models.

use crate::model_state::ModelState;

/// Types whose values can be checked after binding.
///
/// Rules record failures into the supplied state instead of returning early,
/// so a single request reports every violated rule.
pub trait Validate {
    fn validate(&self, state: &mut ModelState);
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self, state: &mut ModelState) {
        if let Some(inner) = self {
            inner.validate(state);
        }
    }
}

/// Fails when `value` is empty or whitespace only.
pub fn required_text(state: &mut ModelState, key: &str, value: &str, message: &str) -> bool {
    if value.trim().is_empty() {
        state.add_error(key, message);
        return false;
    }
    true
}

/// Fails when `value` is longer than `max` characters.
pub fn max_length(
    state: &mut ModelState,
    key: &str,
    value: &str,
    max: usize,
    message: &str,
) -> bool {
    if value.chars().count() > max {
        state.add_error(key, message);
        return false;
    }
    true
}
