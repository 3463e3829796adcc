use super::*;

#[test]
fn test_error_code_display() {
    assert_eq!(ErrorCode::E1001.to_string(), "E1001");
    assert_eq!(ErrorCode::E2021.as_str(), "E2021");
}

#[test]
fn test_error_code_ranges() {
    assert!(ErrorCode::E1003.is_name_error());
    assert!(!ErrorCode::E2001.is_name_error());
    assert!(ErrorCode::E9001.is_internal());
    assert!(!ErrorCode::E1001.is_internal());
}

#[test]
fn test_deprecation_is_warning() {
    assert!(ErrorCode::E2020.is_warning());
    assert!(!ErrorCode::E2015.is_warning());
}
