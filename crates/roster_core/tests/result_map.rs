use roster_core::{DataResult, TaskError};

#[test]
fn map_transforms_success_data() {
    let result = DataResult::Success(vec![1, 2, 3]);
    assert_eq!(result.map(|v| v.len()), DataResult::Success(3));
}

#[test]
fn map_preserves_non_success_variants() {
    let calls = std::cell::Cell::new(0);
    let f = |v: u32| {
        calls.set(calls.get() + 1);
        v.to_string()
    };

    assert_eq!(DataResult::<u32>::Empty.map(f), DataResult::<String>::Empty);
    assert_eq!(DataResult::<u32>::Pending.map(f), DataResult::<String>::Pending);
    assert_eq!(
        DataResult::<u32>::Error(TaskError::NotFound(9)).map(f),
        DataResult::<String>::Error(TaskError::NotFound(9))
    );
    assert_eq!(calls.get(), 0);
}

#[test]
fn empty_sequence_is_reported_as_empty() {
    assert_eq!(DataResult::<Vec<u8>>::from_items(Vec::new()), DataResult::Empty);
    assert_eq!(DataResult::from_items(vec![4u8]), DataResult::Success(vec![4]));
}

#[test]
fn default_is_empty_and_terminal_states_are_detected() {
    let result: DataResult<()> = DataResult::default();
    assert!(result.is_empty());
    assert!(!result.is_terminal());
    assert!(DataResult::Success(()).is_terminal());
    assert!(DataResult::<()>::Error(TaskError::Cancelled).is_terminal());
    assert!(!DataResult::<()>::Pending.is_terminal());
}

#[test]
fn converts_to_and_from_std_result() {
    let ok: DataResult<u8> = Ok(1).into();
    assert_eq!(ok.success(), Some(&1));

    let err: DataResult<u8> = Err(TaskError::msg("nope")).into();
    assert_eq!(err.error(), Some(&TaskError::msg("nope")));
    assert!(matches!(err.into_result(), Some(Err(_))));
    assert!(DataResult::<u8>::Pending.into_result().is_none());
}
