//! Validation contract for values that cross a module boundary.
//!
//! Constructors enforce invariants up front, but serde builds values field by
//! field and never calls them. Anything decoded from a message is re-checked
//! through [`Validate`] before it is handed to a caller.

use crate::errors::CoreError;

/// Re-check every invariant a constructor would have enforced.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` naming the first offending field.
    fn validate(&self) -> Result<(), CoreError>;
}

impl<T: Validate> Validate for [T] {
    fn validate(&self) -> Result<(), CoreError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), CoreError> {
        self.as_slice().validate()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn validate(&self) -> Result<(), CoreError> {
        self.as_ref().map_or(Ok(()), Validate::validate)
    }
}

pub(crate) fn non_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::invalid(field, "can't be empty"));
    }
    Ok(())
}

pub(crate) fn optional_non_blank(field: &str, value: Option<&str>) -> Result<(), CoreError> {
    value.map_or(Ok(()), |v| non_blank(field, v))
}

pub(crate) fn at_least_one<T>(field: &str, value: T) -> Result<(), CoreError>
where
    T: PartialOrd + From<u8> + std::fmt::Display + Copy,
{
    if value < T::from(1) {
        return Err(CoreError::invalid(
            field,
            format!("must be a positive value, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn within(field: &str, value: f32, min: f32, max: f32) -> Result<(), CoreError> {
    // NaN fails both comparisons, so check containment instead of exclusion
    if !(min..=max).contains(&value) {
        return Err(CoreError::invalid(
            field,
            format!("value of {value} is not between {min} and {max} (inclusive)"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_rejects_whitespace() {
        assert!(non_blank("name", "  ").is_err());
        assert!(non_blank("name", "x").is_ok());
    }

    #[test]
    fn at_least_one_rejects_zero() {
        assert!(at_least_one("id", 0_u32).is_err());
        assert!(at_least_one("id", 1_u32).is_ok());
        assert!(at_least_one("time", -5_i64).is_err());
    }

    #[test]
    fn within_is_inclusive_and_rejects_nan() {
        assert!(within("c", 0.0, 0.0, 1.0).is_ok());
        assert!(within("c", 1.0, 0.0, 1.0).is_ok());
        assert!(within("c", 1.01, 0.0, 1.0).is_err());
        assert!(within("c", f32::NAN, 0.0, 1.0).is_err());
    }
}
