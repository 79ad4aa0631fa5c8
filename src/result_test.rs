use super::*;

#[test]
fn success_carries_data_and_no_error() {
    let result = OperationResult::success(7_u32);
    assert!(result.succeeded());
    assert_eq!(result.data(), Some(&7));
    assert!(result.error().is_none());
}

#[test]
fn fail_carries_error_and_no_data() {
    let result = OperationResult::<u32>::fail("boom");
    assert!(!result.succeeded());
    assert!(result.data().is_none());
    assert_eq!(result.error(), Some("boom"));
}

#[test]
fn empty_success_has_no_payload() {
    let result = OperationResult::empty();
    assert!(result.succeeded());
    assert!(result.data().is_none());
    assert!(result.error().is_none());
}

#[test]
fn from_err_uses_display_text() {
    let result: OperationResult<()> = Err(AuthError::MalformedToken("empty".into())).into();
    assert!(!result.succeeded());
    assert_eq!(result.error(), Some("Invalid token received."));
}

#[test]
fn into_result_maps_both_arms() {
    assert_eq!(OperationResult::success("x").into_result(), Ok(Some("x")));
    assert_eq!(OperationResult::<&str>::fail("nope").into_result(), Err("nope".to_owned()));
}

#[test]
fn serializes_camel_case_and_omits_absent_fields() {
    let json = serde_json::to_value(OperationResult::<u8>::fail("bad")).unwrap();
    assert_eq!(json, serde_json::json!({ "succeeded": false, "error": "bad" }));

    let json = serde_json::to_value(OperationResult::empty()).unwrap();
    assert_eq!(json, serde_json::json!({ "succeeded": true }));
}
