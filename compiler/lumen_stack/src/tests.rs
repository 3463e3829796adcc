use super::*;

/// Depth of a right-nested chain `((...)+1)+1`, computed recursively.
fn nesting_depth(remaining: u32) -> u32 {
    ensure_sufficient_stack(|| {
        if remaining == 0 {
            0
        } else {
            nesting_depth(remaining - 1) + 1
        }
    })
}

#[test]
fn test_shallow_nesting() {
    assert_eq!(nesting_depth(16), 16);
}

#[test]
fn test_deep_nesting_grows_stack() {
    assert_eq!(nesting_depth(100_000), 100_000);
}

#[test]
fn test_propagates_result() {
    let result: Result<u32, String> = ensure_sufficient_stack(|| Err("overflow".to_string()));
    assert_eq!(result, Err("overflow".to_string()));
}
