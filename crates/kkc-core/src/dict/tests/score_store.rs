use crate::dict::{DictError, Quantizer, ScoreStore};

#[test]
fn test_quantize_round_trip_within_one_step() {
    let q = Quantizer::default();
    let step = 7.0 / 255.0;
    for &score in &[-0.1, -0.5, -1.0, -3.33, -6.9, 0.0, -7.0] {
        let restored = q.dequantize(q.quantize(score));
        assert!(
            (restored - score).abs() <= step,
            "{score} round-tripped to {restored}"
        );
    }
}

#[test]
fn test_quantize_clamps_out_of_range() {
    let q = Quantizer::default();
    assert_eq!(q.quantize(1.0), 0);
    assert_eq!(q.dequantize(q.quantize(0.5)), 0.0);
    assert_eq!(q.quantize(-100.0), 255);
    assert_eq!(q.dequantize(q.quantize(-100.0)), -7.0);
}

#[test]
fn test_quantizer_two_byte_width() {
    let q = Quantizer::new(2, -20.0).unwrap();
    assert_eq!(q.record_size(), 4);
    let step = 20.0 / 65535.0;
    let restored = q.dequantize(q.quantize(-12.345));
    assert!((restored - (-12.345)).abs() <= step);
}

#[test]
fn test_quantizer_rejects_bad_parameters() {
    assert!(Quantizer::new(3, -7.0).is_err());
    assert!(Quantizer::new(1, 0.0).is_err());
    assert!(Quantizer::new(1, 1.0).is_err());
}

#[test]
fn test_write_then_read_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.scores");

    let mut store = ScoreStore::create(&path, Quantizer::default(), 4).unwrap();
    store.write(0, -1.0, -0.5).unwrap();
    store.write(3, -2.5, 0.0).unwrap();
    store.flush().unwrap();

    let step = 7.0 / 255.0;
    let (score, backoff) = store.read(0);
    assert!((score - (-1.0)).abs() <= step);
    assert!((backoff - (-0.5)).abs() <= step);

    // Untouched records read as zero.
    assert_eq!(store.read(1), (0.0, 0.0));

    drop(store);
    let reopened = ScoreStore::open(&path, Quantizer::default()).unwrap();
    assert_eq!(reopened.len(), 4);
    let (score, _) = reopened.read(3);
    assert!((score - (-2.5)).abs() <= step);
}

#[test]
fn test_create_with_zero_records_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.scores");
    assert!(matches!(
        ScoreStore::create(&path, Quantizer::default(), 0),
        Err(DictError::EmptyStore)
    ));
}

#[test]
fn test_write_to_read_only_store_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.scores");

    let mut store = ScoreStore::create(&path, Quantizer::default(), 2).unwrap();
    store.write(0, -1.0, 0.0).unwrap();
    drop(store);

    let mut reopened = ScoreStore::open(&path, Quantizer::default()).unwrap();
    assert!(matches!(
        reopened.write(1, -1.0, 0.0),
        Err(DictError::ReadOnlyStore)
    ));
}

#[test]
fn test_write_out_of_bounds_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.scores");
    let mut store = ScoreStore::create(&path, Quantizer::default(), 2).unwrap();
    assert!(matches!(
        store.write(2, -1.0, 0.0),
        Err(DictError::RecordOutOfBounds { id: 2, count: 2 })
    ));
}

#[test]
fn test_read_out_of_bounds_is_zero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.scores");
    let store = ScoreStore::create(&path, Quantizer::default(), 2).unwrap();
    assert_eq!(store.read(99), (0.0, 0.0));
}

#[test]
fn test_open_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.scores");
    assert!(matches!(
        ScoreStore::open(&path, Quantizer::default()),
        Err(DictError::MissingArtifact(_))
    ));
}

#[test]
fn test_open_truncated_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.scores");
    std::fs::write(&path, [0u8; 3]).unwrap();
    assert!(matches!(
        ScoreStore::open(&path, Quantizer::default()),
        Err(DictError::TruncatedStore { len: 3, .. })
    ));
}

#[test]
fn test_open_empty_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.scores");
    std::fs::write(&path, []).unwrap();
    assert!(ScoreStore::open(&path, Quantizer::default()).is_err());
}
