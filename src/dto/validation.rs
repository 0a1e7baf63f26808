//! Validation helpers for DTOs.

use validator::ValidationError;

/// Validates that a seek percentage is a finite number within `0..=100`.
///
/// NaN, infinities, and out-of-range values are all rejected up front so the
/// clock core never sees them.
pub fn validate_percentage(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        let mut err = ValidationError::new("percentage_not_finite");
        err.message = Some("Percentage must be a finite number".into());
        return Err(err);
    }

    if !(0.0..=100.0).contains(&value) {
        let mut err = ValidationError::new("percentage_range");
        err.message = Some(format!("Percentage must be within 0..=100 (got {value})").into());
        return Err(err);
    }

    Ok(())
}

/// Validates a single schedule entry: positive level number and duration.
pub fn validate_level_entry(level: u32, duration_minutes: u32) -> Result<(), ValidationError> {
    if level == 0 {
        let mut err = ValidationError::new("level_number");
        err.message = Some("Level numbers start at 1".into());
        return Err(err);
    }

    if duration_minutes == 0 {
        let mut err = ValidationError::new("level_duration");
        err.message = Some(format!("Level {level} must have a positive duration").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_percentage_valid() {
        assert!(validate_percentage(0.0).is_ok());
        assert!(validate_percentage(50.0).is_ok());
        assert!(validate_percentage(100.0).is_ok());
    }

    #[test]
    fn test_validate_percentage_invalid() {
        assert!(validate_percentage(-0.1).is_err());
        assert!(validate_percentage(100.1).is_err());
        assert!(validate_percentage(f64::NAN).is_err());
        assert!(validate_percentage(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn test_validate_level_entry() {
        assert!(validate_level_entry(1, 20).is_ok());
        assert!(validate_level_entry(0, 20).is_err());
        assert!(validate_level_entry(3, 0).is_err());
    }
}
