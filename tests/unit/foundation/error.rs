use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PlayoutError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        PlayoutError::precondition("x")
            .to_string()
            .contains("precondition violation:")
    );
    assert!(
        PlayoutError::inconsistent("x")
            .to_string()
            .contains("inconsistent state:")
    );
    assert!(
        PlayoutError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PlayoutError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: PlayoutError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, PlayoutError::Serde(_)));
    assert!(!err.is_precondition());
    assert!(PlayoutError::precondition("x").is_precondition());
}
