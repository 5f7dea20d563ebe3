//! Result type aliases and the service result pattern

use crate::error::{SmError, ValidationErrors};

/// Standard Result type for Sew4Mi operations
pub type SmResult<T> = Result<T, SmError>;

/// Outcome of a service object call
///
/// Carries either a value or the validation errors that prevented producing one,
/// plus an optional human-readable message.
#[derive(Debug)]
pub struct ServiceResult<T> {
    success: bool,
    result: Option<T>,
    errors: ValidationErrors,
    message: Option<String>,
}

impl<T> ServiceResult<T> {
    /// Create a successful result
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            result: Some(result),
            errors: ValidationErrors::new(),
            message: None,
        }
    }

    /// Create a failed result with errors
    pub fn failure(errors: ValidationErrors) -> Self {
        Self {
            success: false,
            result: None,
            errors,
            message: None,
        }
    }

    /// Create a failed result with a single field error
    pub fn failure_with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        Self::failure(errors)
    }

    /// Create a failed result with a base error
    pub fn failure_with_base_error(message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add_base(message);
        Self::failure(errors)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }

    /// Get the result (if successful)
    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    /// Get the errors
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Map the result value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ServiceResult<U> {
        ServiceResult {
            success: self.success,
            result: self.result.map(f),
            errors: self.errors,
            message: self.message,
        }
    }

    /// Chain another service call
    pub fn and_then<U, F: FnOnce(T) -> ServiceResult<U>>(self, f: F) -> ServiceResult<U> {
        match (self.success, self.result) {
            (true, Some(result)) => f(result),
            _ => ServiceResult {
                success: false,
                result: None,
                errors: self.errors,
                message: self.message,
            },
        }
    }

    /// Convert to standard Result
    pub fn into_result(self) -> SmResult<T> {
        if self.success {
            self.result.ok_or_else(|| {
                SmError::Internal("ServiceResult success but no result value".into())
            })
        } else {
            Err(SmError::Validation(self.errors))
        }
    }
}

impl<T> From<SmResult<T>> for ServiceResult<T> {
    fn from(result: SmResult<T>) -> Self {
        match result {
            Ok(value) => ServiceResult::success(value),
            Err(SmError::Validation(errors)) => ServiceResult::failure(errors),
            Err(e) => ServiceResult::failure_with_base_error(e.to_string()),
        }
    }
}

impl<T> From<ServiceResult<T>> for SmResult<T> {
    fn from(result: ServiceResult<T>) -> Self {
        result.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = ServiceResult::success(42);
        assert!(result.is_success());
        assert_eq!(result.result(), Some(&42));
        assert_eq!(result.into_result().ok(), Some(42));
    }

    #[test]
    fn test_failure_into_result() {
        let result: ServiceResult<u8> = ServiceResult::failure_with_error("total", "must be positive");
        assert!(result.is_failure());
        assert!(result.errors().has_error("total"));
        assert!(matches!(result.into_result(), Err(SmError::Validation(_))));
    }

    #[test]
    fn test_and_then_short_circuits() {
        let failed: ServiceResult<u8> = ServiceResult::failure_with_base_error("nope");
        let chained = failed.and_then(|v| ServiceResult::success(v + 1));
        assert!(chained.is_failure());
        assert_eq!(chained.errors().base_errors, vec!["nope".to_string()]);

        let ok = ServiceResult::success(1u8).and_then(|v| ServiceResult::success(v + 1));
        assert_eq!(ok.result(), Some(&2));
    }

    #[test]
    fn test_from_sm_result() {
        let result: ServiceResult<u8> = SmResult::Err(SmError::Internal("boom".into())).into();
        assert!(result.is_failure());
        assert_eq!(result.errors().base_errors.len(), 1);
    }
}
