//! Result type alias for edgehr

use super::errors::EdgeError;

/// Result type alias for edgehr operations
///
/// # Examples
///
/// ```
/// use edgehr::domain::result::Result;
/// use edgehr::domain::errors::EdgeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(EdgeError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, EdgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::IdentityError;
    use crate::domain::ids::LocalId;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }

    #[test]
    fn test_identity_error_propagates() {
        fn inner() -> Result<()> {
            Err(IdentityError::NotFound(LocalId::new("x").unwrap()))?
        }
        assert!(inner().is_err());
    }
}
