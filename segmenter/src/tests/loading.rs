//! 辞書のコンパイルと読み込みに関するテスト
//!
//! 語リストからのコンパイル、ディスク経由の往復、頻度ソースの取り込みを
//! 検証します。

use std::fs;

use tempfile::tempdir;

use crate::dictionary::builder::DictionaryBuilder;
use crate::dictionary::frequencies::CostModel;
use crate::dictionary::lexicon::read_word_list;
use crate::errors::SegmenterError;
use crate::{Dictionary, Segmenter};

const WORD_LIST: &str = "កងកម្លាំង\nកង\nរក្សា\nសន្តិសុខ\nដុល្លារ\n";

fn compile_from_word_list(with_variants: bool) -> Vec<u8> {
    let words = read_word_list(WORD_LIST.as_bytes()).unwrap();
    let costs = CostModel::from_counts([
        ("កងកម្លាំង".to_string(), 120.0),
        ("កង".to_string(), 80.0),
        ("រក្សា".to_string(), 100.0),
        ("សន្តិសុខ".to_string(), 90.0),
        ("ដុល្លារ".to_string(), 60.0),
    ]);
    DictionaryBuilder::from_word_list(&words, &costs, with_variants).build()
}

#[test]
fn test_compile_load_segment() {
    let dict = Dictionary::from_bytes(compile_from_word_list(true)).unwrap();
    let segmenter = Segmenter::new(dict);
    assert_eq!(
        segmenter.segment("កងកម្លាំងរក្សាសន្តិសុខ", "|"),
        "កងកម្លាំង|រក្សា|សន្តិសុខ"
    );
}

#[test]
fn test_disk_round_trip_is_identical() {
    let blob = compile_from_word_list(true);

    let dir = tempdir().unwrap();
    let path = dir.path().join("khmer_dictionary.kdict");
    fs::write(&path, &blob).unwrap();

    let mapped = Dictionary::from_path(&path).unwrap();
    let owned = Dictionary::from_bytes(blob).unwrap();

    assert_eq!(mapped.num_entries(), owned.num_entries());
    assert_eq!(mapped.table_size(), owned.table_size());
    for word in ["កងកម្លាំង", "រក្សា", "អវត្តមាន"] {
        assert_eq!(mapped.lookup(word.as_bytes()), owned.lookup(word.as_bytes()));
    }
}

#[test]
fn test_from_path_rejects_directory() {
    let dir = tempdir().unwrap();
    let result = Dictionary::from_path(dir.path());
    assert!(matches!(result, Err(SegmenterError::InvalidArgument(_))));
}

#[test]
fn test_variants_share_costs() {
    let dict = Dictionary::from_bytes(compile_from_word_list(true)).unwrap();
    // សន្តិសុខ contains a Coeng-Ta, so its Coeng-Da spelling is baked in
    // with the same cost.
    let canonical = "សន\u{17D2}\u{178F}ិសុខ";
    let variant = "សន\u{17D2}\u{178A}ិសុខ";
    assert_eq!(
        dict.lookup(canonical.as_bytes()),
        dict.lookup(variant.as_bytes())
    );
    assert!(dict.lookup(variant.as_bytes()).is_some());
}

#[test]
fn test_without_variants_canonical_only() {
    let dict = Dictionary::from_bytes(compile_from_word_list(false)).unwrap();
    let canonical = "សន\u{17D2}\u{178F}ិសុខ";
    let variant = "សន\u{17D2}\u{178A}ិសុខ";
    assert!(dict.lookup(canonical.as_bytes()).is_some());
    assert!(dict.lookup(variant.as_bytes()).is_none());
}

#[test]
fn test_klib_costs_drive_segmentation() {
    let model = CostModel::from_counts([
        ("កង".to_string(), 500.0),
        ("រក្សា".to_string(), 300.0),
    ]);
    let mut klib = Vec::new();
    model.write_klib(&mut klib).unwrap();
    let reloaded = CostModel::read_klib(klib.as_slice()).unwrap();

    let words = read_word_list("កង\nរក្សា\n".as_bytes()).unwrap();
    let builder = DictionaryBuilder::from_word_list(&words, &reloaded, true);
    let dict = Dictionary::from_bytes(builder.build()).unwrap();

    let segmenter = Segmenter::new(dict);
    assert_eq!(segmenter.segment("កងរក្សា", "|"), "កង|រក្សា");
}

#[test]
fn test_header_fields_survive_round_trip() {
    let costs = CostModel::from_counts([("កង".to_string(), 100.0)]);
    let words = read_word_list("កង\n".as_bytes()).unwrap();
    let builder = DictionaryBuilder::from_word_list(&words, &costs, false);
    let dict = Dictionary::from_bytes(builder.build()).unwrap();

    assert_eq!(dict.default_cost(), costs.default_cost());
    assert_eq!(dict.unknown_cost(), costs.unknown_cost());
    assert_eq!(dict.max_word_length(), "កង".len() as u32);
}
