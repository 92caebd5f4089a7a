//! Validation helpers for DTOs.

use validator::ValidationError;

/// Rejects strings made only of whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Validates a kick-off time written as 24h `HH:MM`.
///
/// # Examples
///
/// ```ignore
/// validate_clock_time("18:30") // Ok
/// validate_clock_time("7:30")  // Err - missing leading zero
/// validate_clock_time("24:00") // Err - out of range
/// ```
pub fn validate_clock_time(value: &str) -> Result<(), ValidationError> {
    let Some((hours, minutes)) = value.split_once(':') else {
        let mut err = ValidationError::new("clock_time_format");
        err.message = Some(format!("Time must be formatted as HH:MM (got `{value}`)").into());
        return Err(err);
    };

    let two_digits = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        let mut err = ValidationError::new("clock_time_format");
        err.message = Some(format!("Time must be formatted as HH:MM (got `{value}`)").into());
        return Err(err);
    }

    let in_range = hours.parse::<u8>().is_ok_and(|h| h < 24)
        && minutes.parse::<u8>().is_ok_and(|m| m < 60);
    if !in_range {
        let mut err = ValidationError::new("clock_time_range");
        err.message = Some("Time must be between 00:00 and 23:59".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Rovers").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_validate_clock_time_valid() {
        assert!(validate_clock_time("00:00").is_ok());
        assert!(validate_clock_time("18:30").is_ok());
        assert!(validate_clock_time("23:59").is_ok());
    }

    #[test]
    fn test_validate_clock_time_invalid_format() {
        assert!(validate_clock_time("7:30").is_err()); // missing zero
        assert!(validate_clock_time("1830").is_err()); // no separator
        assert!(validate_clock_time("18:3a").is_err()); // not a digit
    }

    #[test]
    fn test_validate_clock_time_out_of_range() {
        assert!(validate_clock_time("24:00").is_err());
        assert!(validate_clock_time("12:60").is_err());
    }
}
