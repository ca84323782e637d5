//! Unit tests for JsError and ErrorKind

use core_types::{ErrorKind, JsError, JsResult};

#[cfg(test)]
mod error_kind_tests {
    use super::*;

    #[test]
    fn test_error_kind_type_error() {
        let kind = ErrorKind::TypeError;
        assert!(matches!(kind, ErrorKind::TypeError));
        assert_eq!(kind.name(), "TypeError");
    }

    #[test]
    fn test_error_kind_invalid_handler() {
        assert_eq!(ErrorKind::InvalidHandlerError.to_string(), "InvalidHandlerError");
    }

    #[test]
    fn test_error_kind_not_configurable() {
        assert_eq!(
            ErrorKind::NotConfigurableError.to_string(),
            "NotConfigurableError"
        );
    }

    #[test]
    fn test_error_kind_copy_and_eq() {
        let kind1 = ErrorKind::RangeError;
        let kind2 = kind1;
        assert_eq!(kind1, kind2);
        assert_ne!(kind1, ErrorKind::Error);
    }
}

#[cfg(test)]
mod js_error_tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert!(JsError::error("x").is(ErrorKind::Error));
        assert!(JsError::type_error("x").is(ErrorKind::TypeError));
        assert!(JsError::range_error("x").is(ErrorKind::RangeError));
        assert!(JsError::invalid_handler("x").is(ErrorKind::InvalidHandlerError));
        assert!(JsError::internal("x").is(ErrorKind::InternalError));
    }

    #[test]
    fn test_display_format() {
        let error = JsError::error("boom");
        assert_eq!(format!("{}", error), "Error: boom");
    }

    #[test]
    fn test_error_is_std_error() {
        fn takes_std_error(_: &dyn std::error::Error) {}
        takes_std_error(&JsError::type_error("x"));
    }

    #[test]
    fn test_question_mark_propagation() {
        fn inner() -> JsResult<u32> {
            Err(JsError::not_configurable("p"))
        }
        fn outer() -> JsResult<u32> {
            let v = inner()?;
            Ok(v + 1)
        }
        let err = outer().unwrap_err();
        assert_eq!(err, JsError::not_configurable("p"));
    }
}
