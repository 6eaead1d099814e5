//! Result type alias for SessionFrame

use super::errors::SessionFrameError;

/// Result type alias for SessionFrame operations
///
/// # Examples
///
/// ```
/// use sessionframe::domain::result::Result;
/// use sessionframe::domain::errors::SessionFrameError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SessionFrameError::Input("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SessionFrameError>;
