#![cfg(test)]

use tempfile::TempDir;

use crate::dict::{Dictionary, LanguageModel, Quantizer};

/// A dictionary and language model built from inline text, backed by
/// artifacts in a temporary directory.
pub struct TestModel {
    pub dict: Dictionary,
    pub lm: LanguageModel,
    _dir: TempDir,
}

/// Build and load a model from vocabulary and training text.
pub fn build_model(vocab: &str, training: &str, order: usize) -> TestModel {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("model").to_str().unwrap().to_string();

    let dict = Dictionary::from_vocab_text(vocab).unwrap();
    dict.save(&prefix).unwrap();
    LanguageModel::build_from_text(&prefix, training, Quantizer::default()).unwrap();

    let dict = Dictionary::load(&prefix).unwrap();
    let lm = LanguageModel::load(&prefix, order, Quantizer::default()).unwrap();
    TestModel {
        dict,
        lm,
        _dir: dir,
    }
}

/// Shared bigram test model covering a representative set of words used
/// across converter tests.
pub fn test_model() -> TestModel {
    let vocab = "きょう/今日\n\
                 きょう/京\n\
                 は/は\n\
                 いい/良い\n\
                 てんき/天気\n\
                 き/木\n\
                 い/胃\n\
                 てん/天\n";
    let training = "-1.0\t<s>\n\
                    -1.0\t</s>\n\
                    -2.0\tきょう/今日\n\
                    -4.0\tきょう/京\n\
                    -1.5\tは/は\n\
                    -2.5\tいい/良い\n\
                    -2.5\tてんき/天気\n\
                    -3.0\tき/木\n\
                    -3.5\tい/胃\n\
                    -3.0\tてん/天\n\
                    -5.0\tUNK\n\
                    -0.5\t<s> きょう/今日\t-0.2\n\
                    -0.5\tきょう/今日 は/は\n\
                    -0.8\tは/は いい/良い\n\
                    -0.8\tいい/良い てんき/天気\n\
                    -0.5\tてんき/天気 </s>\n";
    build_model(vocab, training, 2)
}
