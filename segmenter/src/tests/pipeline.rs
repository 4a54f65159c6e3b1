//! 分割パイプライン全体の不変条件に関するテスト
//!
//! 任意の入力に対して成り立つべき性質（被覆、決定性、冪等性、
//! 区切り文字の安全性）と、設定の組み合わせによる動作を検証します。

use std::sync::Arc;
use std::thread;

use crate::dictionary::builder::DictionaryBuilder;
use crate::normalizer::normalize;
use crate::{Dictionary, Segmenter, SegmenterConfig, DEFAULT_SEPARATOR};

fn build_dictionary() -> Dictionary {
    let words = [
        ("កងកម្លាំង", 2.0),
        ("កង", 3.0),
        ("រក្សា", 2.5),
        ("សន្តិសុខ", 2.0),
        ("ដុល្លារ", 2.0),
        ("និង", 2.5),
    ];
    let mut builder = DictionaryBuilder::new(6.0, 11.0);
    for (word, cost) in words {
        builder.insert(word, cost);
    }
    Dictionary::from_bytes(builder.build()).unwrap()
}

/// 不変条件の検証に使う入力の詰め合わせ
const INPUTS: &[&str] = &[
    "",
    " ",
    "កងកម្លាំងរក្សាសន្តិសុខ",
    "១ ០០០ ០០០ ដុល្លារ",
    "$10,000.00 និង ៛2000",
    "ស.ភ.ភ.ព. និង កង",
    "hello world",
    "ក\u{200B}ង\u{200B}កម្លាំង",
    "ក\u{17B6}\u{17D2}\u{178F}",
    "\u{17D2}ក",
    "\u{17B6}",
    "«កង» ។ ៕",
    "ក\u{17C1}\u{17B8}ត",
    "xកx1x។x",
];

#[test]
fn test_coverage_on_every_input() {
    let segmenter = Segmenter::new(build_dictionary());
    for input in INPUTS {
        let segments = segmenter.segment_to_vec(input);
        assert_eq!(segments.concat(), normalize(input), "input: {input:?}");
    }
}

#[test]
fn test_coverage_holds_under_any_config() {
    let toggles = [false, true];
    for normalization in toggles {
        for repair in toggles {
            for acronyms in toggles {
                for merging in toggles {
                    let config = SegmenterConfig {
                        enable_normalization: normalization,
                        enable_repair_mode: repair,
                        enable_acronym_detection: acronyms,
                        enable_unknown_merging: merging,
                        enable_frequency_costs: true,
                    };
                    let segmenter = Segmenter::new(build_dictionary()).config(config);
                    for input in INPUTS {
                        let expected = if normalization {
                            normalize(input)
                        } else {
                            (*input).to_string()
                        };
                        let segments = segmenter.segment_to_vec(input);
                        assert_eq!(
                            segments.concat(),
                            expected,
                            "input: {input:?}, config: {config:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn test_determinism_across_calls() {
    let segmenter = Segmenter::new(build_dictionary());
    for input in INPUTS {
        let first = segmenter.segment(input, DEFAULT_SEPARATOR);
        for _ in 0..3 {
            assert_eq!(segmenter.segment(input, DEFAULT_SEPARATOR), first);
        }
    }
}

#[test]
fn test_identical_output_from_64_threads() {
    let dict = Arc::new(build_dictionary());
    let segmenter = Segmenter::from_shared_dictionary(dict);

    let expected: Vec<String> = INPUTS
        .iter()
        .map(|input| segmenter.segment(input, DEFAULT_SEPARATOR))
        .collect();

    let handles: Vec<_> = (0..64)
        .map(|_| {
            let segmenter = segmenter.clone();
            thread::spawn(move || {
                let mut worker = segmenter.new_worker();
                INPUTS
                    .iter()
                    .map(|input| {
                        worker.reset_sentence(*input);
                        worker.segment();
                        worker.join(DEFAULT_SEPARATOR)
                    })
                    .collect::<Vec<String>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn test_normalization_is_idempotent_on_outputs() {
    let segmenter = Segmenter::new(build_dictionary());
    for input in INPUTS {
        for token in segmenter.segment_to_vec(input) {
            assert_eq!(normalize(&token), token, "token: {token:?}");
        }
    }
}

#[test]
fn test_output_splits_back_into_tokens() {
    let segmenter = Segmenter::new(build_dictionary());
    for input in INPUTS {
        let tokens = segmenter.segment_to_vec(input);
        if tokens.is_empty() {
            continue;
        }
        let joined = segmenter.segment(input, DEFAULT_SEPARATOR);
        let split: Vec<&str> = joined.split(DEFAULT_SEPARATOR).collect();
        assert_eq!(split, tokens, "input: {input:?}");
    }
}

#[test]
fn test_composite_vowel_matches_dictionary() {
    // A word stored with the composite vowel must be found even when the
    // input spells it as the split pair.
    let mut builder = DictionaryBuilder::new(6.0, 11.0);
    builder.insert("ក\u{17BE}ត", 1.5);
    let segmenter = Segmenter::new(Dictionary::from_bytes(builder.build()).unwrap());
    assert_eq!(
        segmenter.segment("ក\u{17C1}\u{17B8}ត", "|"),
        "ក\u{17BE}ត"
    );
}

#[test]
fn test_reordered_input_matches_dictionary() {
    // Dictionary entries are stored in canonical order; a visually-ordered
    // input (vowel before subscript) still matches after normalization.
    let canonical = "ក\u{17D2}\u{178F}\u{17B6}";
    let mut builder = DictionaryBuilder::new(6.0, 11.0);
    builder.insert(canonical, 1.5);
    let segmenter = Segmenter::new(Dictionary::from_bytes(builder.build()).unwrap());
    assert_eq!(segmenter.segment("ក\u{17B6}\u{17D2}\u{178F}", "|"), canonical);
}

#[test]
fn test_khmer_currency_starts_number_group() {
    let segmenter = Segmenter::new(build_dictionary());
    // ៛ followed by digits stays its own token ahead of the number.
    assert_eq!(segmenter.segment("៛2000", "|"), "៛|2000");
    // ៛ without a following digit is an ordinary separator.
    assert_eq!(segmenter.segment("កង៛", "|"), "កង|៛");
}
