//! プレーンテキスト語リストの読み込みを提供するモジュール
//!
//! 1行1語のUTF-8テキストから辞書構築用の語リストを読み込みます。
//! 読み込み時に以下のフィルタが適用されます:
//!
//! - 空行の除去
//! - ゼロ幅制御文字（U+200B、U+200C、U+200D）の除去
//! - 有効な基底文字でない単一コードポイント語の除去
//! - 下付き文字マーカー（U+17D2）で始まる語の除去
//! - U+17F7を含む語の除去

use std::io::BufRead;

use hashbrown::HashSet;

use crate::character::is_valid_single_base;
use crate::errors::Result;

/// 選言の独立母音「ឬ」
const RYY: char = '\u{17AC}';

/// 語リストをリーダーから読み込みます
///
/// 行末のCR/LFは取り除かれ、フィルタに該当する行はスキップされます。
///
/// # 引数
///
/// * `rdr` - 語リストのリーダー
///
/// # 戻り値
///
/// フィルタ済みの語のベクタ（ファイル内の出現順）
///
/// # エラー
///
/// 読み込みに失敗した場合にI/Oエラーを返します。
///
/// # 例
///
/// ```
/// # use khmer_segmenter::dictionary::lexicon::read_word_list;
/// let data = "កង\nរក្សា\n\n\u{17D2}ក\n";
/// let words = read_word_list(data.as_bytes())?;
/// assert_eq!(words, vec!["កង".to_string(), "រក្សា".to_string()]);
/// # Ok::<(), khmer_segmenter::errors::SegmenterError>(())
/// ```
pub fn read_word_list<R>(rdr: R) -> Result<Vec<String>>
where
    R: BufRead,
{
    let mut words = Vec::new();
    let mut skipped = 0usize;
    for line in rdr.lines() {
        let line = line?;
        let word: String = line
            .trim()
            .chars()
            .filter(|c| !matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}'))
            .collect();
        if word.is_empty() {
            continue;
        }
        if !keep_word(&word) {
            skipped += 1;
            continue;
        }
        words.push(word);
    }
    if skipped > 0 {
        log::warn!("Skipped {skipped} unusable entries in the word list");
    }
    Ok(words)
}

/// 語がフィルタを通過するかどうかを判定します
fn keep_word(word: &str) -> bool {
    let mut chars = word.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if chars.next().is_none() && !is_valid_single_base(u32::from(first)) {
        return false;
    }
    if first == '\u{17D2}' {
        return false;
    }
    if word.contains('\u{17F7}') {
        return false;
    }
    true
}

/// 分割可能な「ឬ」複合語を語集合から取り除きます
///
/// 「ឬ」（または）を含む複合語は、「ឬ」で分割した各部分がすべて語として
/// 集合に存在する場合に取り除かれます。これにより探索エンジンは
/// 常に分割された形を選びます。
///
/// # 引数
///
/// * `words` - 対象の語集合（破壊的に更新されます）
///
/// # 戻り値
///
/// 取り除かれた語数
pub fn prune_disjunctive_compounds(words: &mut HashSet<String>) -> usize {
    let mut to_remove: Vec<String> = Vec::new();
    for word in words.iter() {
        if !word.contains(RYY) || word.chars().count() <= 1 {
            continue;
        }
        let removable = if let Some(rest) = word.strip_prefix(RYY) {
            words.contains(rest)
        } else if let Some(rest) = word.strip_suffix(RYY) {
            words.contains(rest)
        } else {
            word.split(RYY).all(|part| part.is_empty() || words.contains(part))
        };
        if removable {
            to_remove.push(word.clone());
        }
    }
    for word in &to_remove {
        words.remove(word);
    }
    to_remove.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_single_non_base() {
        // A lone sign codepoint is not a word; a lone base consonant is.
        let data = "ក\n\u{17B6}\n\u{17D4}\n";
        let words = read_word_list(data.as_bytes()).unwrap();
        assert_eq!(words, vec!["ក".to_string()]);
    }

    #[test]
    fn test_filters_leading_coeng() {
        let data = "\u{17D2}កង\nកង\n";
        let words = read_word_list(data.as_bytes()).unwrap();
        assert_eq!(words, vec!["កង".to_string()]);
    }

    #[test]
    fn test_filters_symbol_codepoint() {
        let data = "កង\u{17F7}\nកង\n";
        let words = read_word_list(data.as_bytes()).unwrap();
        assert_eq!(words, vec!["កង".to_string()]);
    }

    #[test]
    fn test_strips_zero_width_and_crlf() {
        let data = "កង\u{200B}\r\n រក្សា \r\n";
        let words = read_word_list(data.as_bytes()).unwrap();
        assert_eq!(words, vec!["កង".to_string(), "រក្សា".to_string()]);
    }

    #[test]
    fn test_prune_disjunctive_compounds() {
        let mut words: HashSet<String> = ["កង", "សុខ", "កងឬសុខ", "ឬកង", "កងឬទេ"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let removed = prune_disjunctive_compounds(&mut words);
        // "កងឬសុខ" splits into two known words; "ឬកង" strips to a known
        // word; "កងឬទេ" keeps its unknown tail.
        assert_eq!(removed, 2);
        assert!(!words.contains("កងឬសុខ"));
        assert!(!words.contains("ឬកង"));
        assert!(words.contains("កងឬទេ"));
        assert!(words.contains("កង"));
    }
}
