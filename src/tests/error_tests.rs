use crate::civic_error;
use crate::error::{CivicError, ErrorContext};

#[test]
fn test_error_context_on_result() {
    let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "file not found",
    ));

    let civic_result = result.context("Failed to read config file");

    match civic_result {
        Err(CivicError::Unknown(msg)) => {
            assert!(msg.contains("Failed to read config file"));
            assert!(msg.contains("file not found"));
        }
        _ => panic!("Expected CivicError::Unknown"),
    }
}

#[test]
fn test_error_context_on_option() {
    let option: Option<String> = None;

    match option.context("Issue ID is required") {
        Err(CivicError::Unknown(msg)) => assert_eq!(msg, "Issue ID is required"),
        _ => panic!("Expected CivicError::Unknown"),
    }
}

#[test]
fn test_error_context_with_closure() {
    let result: Result<i32, std::io::Error> = Err(std::io::Error::new(
        std::io::ErrorKind::PermissionDenied,
        "access denied",
    ));

    let civic_result = result.with_context(|| format!("Failed to read photo at {}", "/tmp/lamp.jpg"));

    match civic_result {
        Err(CivicError::Unknown(msg)) => {
            assert!(msg.contains("Failed to read photo at /tmp/lamp.jpg"));
            assert!(msg.contains("access denied"));
        }
        _ => panic!("Expected CivicError::Unknown"),
    }
}

#[test]
fn test_civic_error_macro() {
    let error = civic_error!(Network, "Request failed");
    match error {
        CivicError::Network(msg) => assert_eq!(msg, "Request failed"),
        _ => panic!("Expected CivicError::Network"),
    }

    let error = civic_error!(Validation, "Unknown status '{}'", "done");
    match error {
        CivicError::Validation(msg) => assert_eq!(msg, "Unknown status 'done'"),
        _ => panic!("Expected CivicError::Validation"),
    }
}

#[test]
fn test_user_message_passes_server_detail_through() {
    let error = CivicError::Http {
        status: 403,
        detail: "Only staff can change status".to_string(),
    };
    assert_eq!(error.user_message(), "Only staff can change status");
    assert!(error.is_network());

    let error = CivicError::Http {
        status: 502,
        detail: "  ".to_string(),
    };
    assert_eq!(error.user_message(), "Request failed with status 502");
}

#[test]
fn test_local_errors_are_not_network_errors() {
    assert!(!CivicError::Validation("bad".to_string()).is_network());
    assert!(!CivicError::Permission("no location".to_string()).is_network());
    assert!(CivicError::Network("offline".to_string()).is_network());
}
