use crate::converter::convert;
use crate::converter::testutil::test_model;

#[test]
fn test_convert_bigram_path() {
    let m = test_model();
    let result = convert(&m.dict, &m.lm, "きょうはいいてんき");
    assert_eq!(result, "今日は良い天気");
}

#[test]
fn test_convert_empty() {
    let m = test_model();
    assert_eq!(convert(&m.dict, &m.lm, ""), "");
}

#[test]
fn test_convert_single_word() {
    let m = test_model();
    assert_eq!(convert(&m.dict, &m.lm, "きょう"), "今日");
}

#[test]
fn test_convert_unknown_chars() {
    let m = test_model();
    // "ぬ" has no dictionary entry; the fallback passes it through.
    assert_eq!(convert(&m.dict, &m.lm, "ぬ"), "ぬ");
}

#[test]
fn test_convert_unknown_between_words() {
    let m = test_model();
    assert_eq!(convert(&m.dict, &m.lm, "きょうぬ"), "今日ぬ");
}

#[test]
fn test_convert_deterministic() {
    let m = test_model();
    let first = convert(&m.dict, &m.lm, "きょうはいいてんき");
    for _ in 0..10 {
        assert_eq!(convert(&m.dict, &m.lm, "きょうはいいてんき"), first);
    }
}
