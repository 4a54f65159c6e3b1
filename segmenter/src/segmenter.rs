//! コスト最小化探索に基づく分かち書きエンジン
//!
//! このモジュールは、正規化済みバイト列上の動的計画法によって最小コストの
//! 分割を求めるメインエンジンを提供します。バイト位置ごとに5種類の遷移
//! （数値グループ、区切り文字、頭字語、辞書一致、未知クラスタ）を評価し、
//! 必要に応じて修復遷移で不正な入力から回復します。
//!
//! # 主要な構造体
//!
//! - [`Segmenter`]: 辞書と設定を保持するエンジン本体
//! - [`Worker`]: 実際の分割処理を行うワーカー。内部バッファを再利用します
//!
//! # 例
//!
//! ```no_run
//! use khmer_segmenter::{Dictionary, Segmenter};
//!
//! let dict = Dictionary::from_path("khmer_dictionary.kdict")?;
//! let segmenter = Segmenter::new(dict);
//! let output = segmenter.segment("កងកម្លាំងរក្សាសន្តិសុខ", "|");
//! println!("{output}");
//! # Ok::<(), khmer_segmenter::errors::SegmenterError>(())
//! ```
pub(crate) mod lattice;
pub mod worker;

use std::sync::Arc;

use crate::character::{
    acronym_length, is_acronym_start, is_base_consonant, is_currency_symbol, is_dep_vowel,
    is_digit, is_khmer, is_separator, is_valid_single_base, khmer_cluster_length, number_length,
};
use crate::dictionary::{djb2_step, Dictionary};
use crate::rules::RuleEngine;
use crate::segmenter::lattice::Lattice;
use crate::segmenter::worker::Worker;
use crate::utils::decode_codepoint;

/// 既定のセグメント区切り文字（ゼロ幅スペース U+200B）
///
/// 正規化がゼロ幅スペースを入力から取り除くため、この区切り文字が
/// 入力由来のセグメントに現れることはありません。したがって、出力を
/// この文字で分割すればセグメント列を正確に復元できます。
pub const DEFAULT_SEPARATOR: &str = "\u{200B}";

/// 下付き文字マーカー（U+17D2）のUTF-8バイト列
const COENG_BYTES: [u8; 3] = [0xE1, 0x9F, 0x92];

/// 探索エンジンの動作設定
///
/// すべてのフラグは既定で有効です。設定は初期化時に評価され、
/// 分割処理の途中で変更されることはありません。
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// 入力の正規化を行うかどうか
    ///
    /// 無効にすると、入力はそのままエンジンに渡されます。
    pub enable_normalization: bool,

    /// 修復モードを有効にするかどうか
    ///
    /// 孤立した下付き文字マーカーや単独の従属母音から回復します。
    pub enable_repair_mode: bool,

    /// 頭字語（クラスタ + `.`の繰り返し）の検出を行うかどうか
    pub enable_acronym_detection: bool,

    /// 連続する未知セグメントの統合を行うかどうか
    pub enable_unknown_merging: bool,

    /// 辞書一致に語ごとの頻度コストを使うかどうか
    ///
    /// 無効にすると、すべての辞書一致に既定コストが適用されます。
    pub enable_frequency_costs: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            enable_normalization: true,
            enable_repair_mode: true,
            enable_acronym_detection: true,
            enable_unknown_merging: true,
            enable_frequency_costs: true,
        }
    }
}

/// 分かち書きを行うエンジン
///
/// 辞書への共有参照と設定だけを保持し、呼び出し間で可変状態を持ちません。
/// 複製は安価であり、複製したインスタンスを複数スレッドへ渡して同一辞書上で
/// 並行に分割を実行できます。結果はスレッド数や呼び出し順序に依存しません。
#[derive(Clone)]
pub struct Segmenter {
    dict: Arc<Dictionary>,
    rules: RuleEngine,
    config: SegmenterConfig,
}

impl Segmenter {
    /// 新しいエンジンを既定の設定で作成します
    ///
    /// # 引数
    ///
    /// * `dict` - 使用する辞書。所有権はエンジンへ移動します
    pub fn new(dict: Dictionary) -> Self {
        Self {
            dict: Arc::new(dict),
            rules: RuleEngine::new(),
            config: SegmenterConfig::default(),
        }
    }

    /// 共有された辞書から新しいエンジンを作成します
    ///
    /// 複数のエンジンが同じ辞書データを読み込み直すことなく共有する
    /// マルチスレッドシナリオで便利です。
    ///
    /// # 引数
    ///
    /// * `dict` - 共有される辞書への`Arc`参照
    pub fn from_shared_dictionary(dict: Arc<Dictionary>) -> Self {
        Self {
            dict,
            rules: RuleEngine::new(),
            config: SegmenterConfig::default(),
        }
    }

    /// 設定を差し替えたエンジンを返します
    ///
    /// # 引数
    ///
    /// * `config` - 適用する設定
    ///
    /// # 戻り値
    ///
    /// 設定が適用された`Segmenter`インスタンス
    #[must_use]
    pub const fn config(mut self, config: SegmenterConfig) -> Self {
        self.config = config;
        self
    }

    /// 使用中の辞書への参照を返します
    #[inline(always)]
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    #[inline(always)]
    pub(crate) const fn config_ref(&self) -> &SegmenterConfig {
        &self.config
    }

    #[inline(always)]
    pub(crate) const fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// 新しいワーカーを作成します
    ///
    /// ワーカーは分割処理に使う内部バッファを保持し、呼び出し間で
    /// 再利用します。スレッドごとに1つのワーカーを使うことで、同じ辞書上で
    /// 複数の文を並行に分割できます。
    ///
    /// # 戻り値
    ///
    /// 新しい[`Worker`]インスタンス
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }

    /// テキストを分割し、区切り文字で結合した文字列を返します
    ///
    /// 空の入力には空の出力を返します。どのようなバイト列に対しても
    /// 必ず結果を返し、同一の（辞書・設定・入力）の組に対する出力は
    /// 常に同一です。
    ///
    /// # 引数
    ///
    /// * `text` - 分割する文字列
    /// * `separator` - セグメント間に挿入する区切り文字列
    ///
    /// # 戻り値
    ///
    /// 区切り文字で結合された分割結果
    pub fn segment(&self, text: &str, separator: &str) -> String {
        let mut worker = self.new_worker();
        worker.reset_sentence(text);
        worker.segment();
        worker.join(separator)
    }

    /// テキストを分割し、セグメントのベクタを返します
    ///
    /// # 引数
    ///
    /// * `text` - 分割する文字列
    ///
    /// # 戻り値
    ///
    /// セグメント文字列のベクタ
    pub fn segment_to_vec(&self, text: &str) -> Vec<String> {
        let mut worker = self.new_worker();
        worker.reset_sentence(text);
        worker.segment();
        worker.surfaces().map(str::to_string).collect()
    }

    /// 正規化済みバイト列に対して前向き探索を実行します
    ///
    /// 到達可能な各バイト位置でコードポイントを1つデコードし、その位置から
    /// 出るすべての遷移を評価して格子を緩和します。外側の走査は遷移長では
    /// なくコードポイント長で前進します。
    ///
    /// # 引数
    ///
    /// * `bytes` - 正規化済み入力のバイト列
    /// * `lattice` - 緩和対象の格子
    pub(crate) fn build_lattice(&self, bytes: &[u8], lattice: &mut Lattice) {
        let n = bytes.len();
        lattice.reset(n);

        let unknown_cost = self.dict.unknown_cost();
        let default_cost = self.dict.default_cost();
        let max_word_length = self.dict.max_word_length() as usize;

        let mut i = 0;
        while i < n {
            let (cp, char_len) = decode_codepoint(&bytes[i..]);
            if !lattice.is_reachable(i) {
                i += char_len;
                continue;
            }

            // Repair mode: an orphaned subscript marker or an isolated
            // dependent vowel forces a single penalized transition so the
            // search never stalls on malformed input.
            if self.config.enable_repair_mode {
                let orphaned_coeng =
                    is_base_consonant(cp) && i >= 3 && bytes[i - 3..i] == COENG_BYTES;
                if orphaned_coeng || is_dep_vowel(cp) {
                    lattice.relax(i, i + char_len, unknown_cost + 50.0);
                    i += char_len;
                    continue;
                }
            }

            // Number groups. A currency symbol followed by a digit enters
            // this branch with an empty run: no edge is added, but the
            // separator transition below is suppressed, so the symbol falls
            // through to the unknown transition and stays its own token.
            let digit = is_digit(cp);
            let currency_start = is_currency_symbol(cp) && i + char_len < n && {
                let (next_cp, _) = decode_codepoint(&bytes[i + char_len..]);
                is_digit(next_cp)
            };
            if digit || currency_start {
                let run = number_length(bytes, i);
                if run > 0 {
                    lattice.relax(i, i + run, 1.0);
                }
            } else if is_separator(cp) {
                lattice.relax(i, i + char_len, 0.1);
            }

            // Acronyms.
            if self.config.enable_acronym_detection && is_acronym_start(bytes, i) {
                lattice.relax(i, i + acronym_length(bytes, i), default_cost);
            }

            // Dictionary matches. The DJB2 hash is folded incrementally so
            // that all candidate prefixes share the hashing work.
            let mut hash: u32 = 5381;
            let mut j = i;
            while j < n {
                let (_, len) = decode_codepoint(&bytes[j..]);
                if j + len - i > max_word_length {
                    break;
                }
                for &b in &bytes[j..j + len] {
                    hash = djb2_step(hash, b);
                }
                j += len;
                if let Some(cost) = self.dict.probe(hash, &bytes[i..j]) {
                    let cost = if self.config.enable_frequency_costs {
                        cost
                    } else {
                        default_cost
                    };
                    lattice.relax(i, j, cost);
                }
            }

            // Unknown fallback: a whole orthographic cluster for Khmer
            // positions, a single codepoint otherwise.
            let cluster_len = if is_khmer(cp) {
                khmer_cluster_length(bytes, i)
            } else {
                char_len
            };
            let mut cost = unknown_cost;
            if cluster_len == char_len && is_khmer(cp) && !is_valid_single_base(cp) {
                cost += 10.0;
            }
            lattice.relax(i, i + cluster_len, cost);

            i += char_len;
        }
    }

    /// セグメントが既知のトークンかどうかを判定します
    ///
    /// 未知セグメント統合パスで使用されます。以下のいずれかを満たす
    /// セグメントが既知と見なされます:
    ///
    /// - 先頭コードポイントが区切り文字で、長さが4バイト以下
    /// - 先頭コードポイントが数字
    /// - バイト列がそのまま辞書に登録されている
    /// - 単独で語を構成できる1コードポイント
    /// - 2バイト以上でASCIIピリオドを含む（頭字語）
    pub(crate) fn is_known_segment(&self, seg: &str) -> bool {
        let bytes = seg.as_bytes();
        if bytes.is_empty() {
            return true;
        }
        let (first, first_len) = decode_codepoint(bytes);
        if is_separator(first) && bytes.len() <= 4 {
            return true;
        }
        if is_digit(first) {
            return true;
        }
        if self.dict.lookup(bytes).is_some() {
            return true;
        }
        if first_len == bytes.len() && is_valid_single_base(first) {
            return true;
        }
        bytes.len() >= 2 && bytes.contains(&b'.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::dictionary::builder::DictionaryBuilder;

    fn build_test_segmenter(words: &[(&str, f32)]) -> Segmenter {
        let mut builder = DictionaryBuilder::new(6.0, 11.0);
        for &(word, cost) in words {
            builder.insert(word, cost);
        }
        Segmenter::new(Dictionary::from_bytes(builder.build()).unwrap())
    }

    fn security_words() -> Vec<(&'static str, f32)> {
        vec![
            ("កងកម្លាំង", 2.0),
            ("កង", 3.0),
            ("រក្សា", 2.5),
            ("សន្តិសុខ", 2.0),
            ("ដុល្លារ", 2.0),
        ]
    }

    #[test]
    fn test_compound_words() {
        let segmenter = build_test_segmenter(&security_words());
        assert_eq!(
            segmenter.segment("កងកម្លាំងរក្សាសន្តិសុខ", "|"),
            "កងកម្លាំង|រក្សា|សន្តិសុខ"
        );
    }

    #[test]
    fn test_spaced_number_group() {
        let segmenter = build_test_segmenter(&security_words());
        assert_eq!(
            segmenter.segment("១ ០០០ ០០០ ដុល្លារ", "|"),
            "១ ០០០ ០០០| |ដុល្លារ"
        );
    }

    #[test]
    fn test_currency_and_decimal() {
        let segmenter = build_test_segmenter(&[]);
        assert_eq!(segmenter.segment("$10,000.00", "|"), "$|10,000.00");
    }

    #[test]
    fn test_acronym_single_token() {
        let segmenter = build_test_segmenter(&[]);
        assert_eq!(segmenter.segment("ស.ភ.ភ.ព.", "|"), "ស.ភ.ភ.ព.");
    }

    #[test]
    fn test_unknown_name_coalesced() {
        let segmenter = build_test_segmenter(&security_words());
        // A name absent from the dictionary decomposes into several unknown
        // clusters, which the merge pass joins back into one token.
        assert_eq!(segmenter.segment("សុវិចិត្រ", "|"), "សុវិចិត្រ");
    }

    #[test]
    fn test_unknown_clusters_without_merging() {
        let config = SegmenterConfig {
            enable_unknown_merging: false,
            ..Default::default()
        };
        let segmenter = build_test_segmenter(&security_words()).config(config);
        let output = segmenter.segment("សុវិចិត្រ", "|");
        assert!(output.contains('|'), "{output}");
        assert_eq!(output.replace('|', ""), "សុវិចិត្រ");
    }

    #[test]
    fn test_empty_input() {
        let segmenter = build_test_segmenter(&security_words());
        assert_eq!(segmenter.segment("", "|"), "");
    }

    #[test]
    fn test_separator_cost_beats_unknown() {
        let segmenter = build_test_segmenter(&security_words());
        assert_eq!(segmenter.segment("កង កង", "|"), "កង| |កង");
    }

    #[test]
    fn test_uniform_costs_toggle() {
        let config = SegmenterConfig {
            enable_frequency_costs: false,
            ..Default::default()
        };
        let segmenter = build_test_segmenter(&security_words()).config(config);
        let output = segmenter.segment("កងកម្លាំងរក្សាសន្តិសុខ", "|");
        assert_eq!(output.replace('|', ""), "កងកម្លាំងរក្សាសន្តិសុខ");
    }

    #[test]
    fn test_repair_isolated_vowel() {
        let segmenter = build_test_segmenter(&security_words());
        // An isolated dependent vowel cannot stall the search.
        let output = segmenter.segment("\u{17B6}\u{17B6}កង", "|");
        assert_eq!(output.replace('|', ""), "\u{17B6}\u{17B6}កង");
    }

    #[test]
    fn test_default_separator_is_zero_width_space() {
        assert_eq!(DEFAULT_SEPARATOR, "\u{200B}");
    }

    #[test]
    fn test_segment_to_vec() {
        let segmenter = build_test_segmenter(&security_words());
        assert_eq!(
            segmenter.segment_to_vec("កងកម្លាំងរក្សា"),
            vec!["កងកម្លាំង".to_string(), "រក្សា".to_string()]
        );
    }

    #[test]
    fn test_determinism_across_threads() {
        use std::thread;

        let segmenter = build_test_segmenter(&security_words());
        let input = "កងកម្លាំងរក្សាសន្តិសុខ $10,000.00 ស.ភ.ភ.ព. សុវិចិត្រ";
        let expected = segmenter.segment(input, "|");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let segmenter = segmenter.clone();
                let input = input.to_string();
                thread::spawn(move || segmenter.segment(&input, "|"))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_coverage_invariant() {
        let segmenter = build_test_segmenter(&security_words());
        let inputs = [
            "កងកម្លាំងរក្សាសន្តិសុខ",
            "១ ០០០ ០០០ ដុល្លារ",
            "$10,000.00 និង ១២៣",
            "hello កង world",
            "ស.ភ.ភ.ព. សុវិចិត្រ",
            "\u{17D2}កង",
            "ក\u{200B}ង",
        ];
        for input in inputs {
            let segments = segmenter.segment_to_vec(input);
            let normalized = crate::normalizer::normalize(input);
            assert_eq!(segments.concat(), normalized, "input: {input:?}");
        }
    }

    #[test]
    fn test_separator_safety() {
        let segmenter = build_test_segmenter(&security_words());
        // U+200B in the input is removed by normalization, so splitting the
        // default-separator output reconstructs the segment list exactly.
        let input = "កង\u{200B}កម្លាំងរក្សា";
        let joined = segmenter.segment(input, DEFAULT_SEPARATOR);
        let split: Vec<&str> = joined.split(DEFAULT_SEPARATOR).collect();
        assert_eq!(split, segmenter.segment_to_vec(input));
    }
}
