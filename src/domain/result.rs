//! Result type alias for the exporter
//!
//! This module provides a convenient Result type alias that uses BpaError
//! as the error type.

use super::errors::BpaError;

/// Result type alias for exporter operations
///
/// # Examples
///
/// ```
/// use bpa_export::domain::result::Result;
/// use bpa_export::domain::errors::BpaError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(BpaError::Write("destination is read-only".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, BpaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
