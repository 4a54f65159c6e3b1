//! ルールベース後処理のモジュール
//!
//! 頻度コストだけでは表現できないクメール正書法の制約を、少数の固定
//! ルールとして符号化します。ルールは探索エンジンのバックトラック後に
//! セグメント列へ適用され、隣接セグメントの結合のみを行います。
//! セグメントのバイト内容が書き換えられることはありません。
//!
//! ルールはインデックス付き走査で適用されます。左結合が起きた場合は
//! インデックスを1つ戻し、右結合が起きた場合はその場に留まり、
//! いずれの場合も結合後のセグメントに対してルール評価をやり直します。

use crate::character::{is_base_consonant, is_digit, is_separator, is_valid_single_base};
use crate::utils::decode_codepoint;

/// セグメント列に正書法ルールを適用するエンジン
///
/// 状態を持たず、同一入力に対して常に同一の結果を返します。
#[derive(Clone, Default)]
pub struct RuleEngine;

impl RuleEngine {
    /// 新しいインスタンスを作成します
    pub const fn new() -> Self {
        Self
    }

    /// セグメント列へルールを適用します
    ///
    /// セグメントは正規化済みテキストの連続するバイト範囲として表現され、
    /// ルールはこの範囲を結合することだけを行います。適用後も範囲の連結が
    /// テキスト全体を覆う性質は保たれます。
    ///
    /// # 引数
    ///
    /// * `text` - 正規化済みテキスト
    /// * `segments` - 探索エンジンが生成したバイト範囲の列
    pub fn apply(&self, text: &str, segments: &mut Vec<(usize, usize)>) {
        let mut i = 0;
        while i < segments.len() {
            let (start, end) = segments[i];
            let seg = &text[start..end];

            // Rule 1: keep "ក៏" and "ដ៏" intact.
            if seg == "ក\u{17CF}" || seg == "ដ\u{17CF}" {
                i += 1;
                continue;
            }

            // Rule 2: an orphan "អ" attaches to the following segment unless
            // that segment starts with a separator.
            if seg == "អ" && i + 1 < segments.len() {
                let (next_start, next_end) = segments[i + 1];
                if !starts_with_separator(&text[next_start..next_end]) {
                    segments[i].1 = next_end;
                    segments.remove(i + 1);
                    continue;
                }
            }

            // Rules 3 and 4: a bare consonant carrying one of the attaching
            // signs merges into a neighbour.
            if let Some(sign) = consonant_sign_suffix(seg) {
                match sign {
                    // Yuukaleapintu, Robat, Kakabat, Ahsda merge left.
                    0x17CB | 0x17CC | 0x17CE | 0x17CF if i > 0 => {
                        segments[i - 1].1 = end;
                        segments.remove(i);
                        i -= 1;
                        continue;
                    }
                    // Samyok Sannya merges right.
                    0x17D0 if i + 1 < segments.len() => {
                        segments[i].1 = segments[i + 1].1;
                        segments.remove(i + 1);
                        continue;
                    }
                    _ => {}
                }
            }

            // Rule 5: an invalid lone Khmer codepoint is glued to the
            // previous segment when that segment is not a separator.
            if is_invalid_single(seg) && i > 0 {
                let (prev_start, prev_end) = segments[i - 1];
                if !starts_with_separator(&text[prev_start..prev_end]) {
                    segments[i - 1].1 = end;
                    segments.remove(i);
                    i -= 1;
                    continue;
                }
            }

            i += 1;
        }
    }
}

/// セグメントが（基底子音 + 結合記号）のちょうど2コードポイントである場合、
/// 記号のコードポイントを返します
fn consonant_sign_suffix(seg: &str) -> Option<u32> {
    let mut chars = seg.chars();
    let first = chars.next()?;
    let second = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if !is_base_consonant(u32::from(first)) {
        return None;
    }
    let sign = u32::from(second);
    matches!(sign, 0x17CB | 0x17CC | 0x17CE | 0x17CF | 0x17D0).then_some(sign)
}

/// セグメントの先頭コードポイントが区切り文字かどうかを判定します
fn starts_with_separator(seg: &str) -> bool {
    let (cp, _) = decode_codepoint(seg.as_bytes());
    is_separator(cp)
}

/// セグメントが単独では語を構成できない1コードポイントかどうかを判定します
fn is_invalid_single(seg: &str) -> bool {
    let mut chars = seg.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if chars.next().is_some() {
        return false;
    }
    let cp = u32::from(first);
    !is_valid_single_base(cp) && !is_digit(cp) && !is_separator(cp)
}
