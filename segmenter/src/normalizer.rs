//! クメール文字列の正規化を提供するモジュール
//!
//! 表示順で入力されたクメール文字列を、辞書照合がバイト単位の等価比較で
//! 行えるよう、格納順（基底文字 → 下付き文字 → レジスタ記号 → 従属母音 →
//! 記号）へ並べ替えます。処理は2段階からなります:
//!
//! 1. 線形の前処理: ゼロ幅制御文字の削除と分離母音の合成
//! 2. クラスタ単位の並べ替え: 各正書法クラスタ内の安定ソート
//!
//! 正規化は冪等です。すなわち `normalize(normalize(x)) == normalize(x)` が
//! 常に成り立ちます。

use crate::character::{COENG, RO};

/// クラスタに保持できる部品数の上限
///
/// 実在するクメール語のクラスタはせいぜい数部品なので、この上限を超えた
/// クラスタはそのまま書き出して仕切り直します。
const MAX_CLUSTER_PARTS: usize = 64;

/// クラスタを構成する1部品
///
/// 部品は単独のコードポイント、または（Coeng + 基底子音）の対です。
#[derive(Clone, Copy)]
struct ClusterPart {
    c1: char,
    c2: Option<char>,
    kind: PartKind,
}

/// クラスタ部品の種別
#[derive(Clone, Copy, PartialEq, Eq)]
enum PartKind {
    Base,
    Coeng,
    Register,
    Vowel,
    Sign,
}

/// コードポイントを正規化用の部品種別に分類します
///
/// # 引数
///
/// * `c` - 分類対象の文字
///
/// # 戻り値
///
/// 部品種別。クラスタに属さない文字の場合は`None`
fn part_kind(c: char) -> Option<PartKind> {
    let cp = u32::from(c);
    match cp {
        0x1780..=0x17B3 => Some(PartKind::Base),
        COENG => Some(PartKind::Coeng),
        0x17C9 | 0x17CA => Some(PartKind::Register),
        0x17B6..=0x17C5 => Some(PartKind::Vowel),
        0x17C6..=0x17D1 | 0x17D3 | 0x17DD => Some(PartKind::Sign),
        _ => None,
    }
}

/// 部品の並べ替え優先度を返します
///
/// 優先度が小さい部品ほどクラスタ内で前方に置かれます。
/// 同一優先度の部品同士は出現順が保持されます（安定ソート）。
fn priority(part: &ClusterPart) -> u32 {
    match part.kind {
        PartKind::Coeng => match part.c2 {
            // Subscript Ro is written after other subscripts.
            Some(sub) if u32::from(sub) == RO => 20,
            _ => 10,
        },
        PartKind::Register => 30,
        PartKind::Vowel => 40,
        PartKind::Sign => 50,
        PartKind::Base => 0,
    }
}

/// クメール文字列を正規化します
///
/// ゼロ幅制御文字（U+200B、U+200C、U+200D）を削除し、分離して入力された
/// 合成母音（U+17C1 + U+17B8 → U+17BE、U+17C1 + U+17B6 → U+17C4）を
/// 1文字に置き換えた上で、各正書法クラスタの部品を格納順に並べ替えます。
///
/// # 引数
///
/// * `text` - 正規化対象の文字列
///
/// # 戻り値
///
/// 正規化された新しい文字列
///
/// # 例
///
/// ```
/// # use khmer_segmenter::normalizer::normalize;
/// // A dependent vowel typed before a subscript is reordered after it.
/// let visual = "ក\u{17B6}\u{17D2}\u{179F}";
/// let stored = "ក\u{17D2}\u{179F}\u{17B6}";
/// assert_eq!(normalize(visual), stored);
/// assert_eq!(normalize(stored), stored);
/// ```
pub fn normalize(text: &str) -> String {
    // Pass 1: drop zero-width controls and merge split composite vowels.
    let mut pre = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}') {
            continue;
        }
        if c == '\u{17C1}' {
            match chars.peek() {
                Some('\u{17B8}') => {
                    pre.push('\u{17BE}');
                    chars.next();
                    continue;
                }
                Some('\u{17B6}') => {
                    pre.push('\u{17C4}');
                    chars.next();
                    continue;
                }
                _ => {}
            }
        }
        pre.push(c);
    }

    // Pass 2: group codepoints into clusters and reorder each one.
    let mut out = String::with_capacity(pre.len());
    let mut cluster: Vec<ClusterPart> = Vec::with_capacity(8);

    let mut iter = pre.chars().peekable();
    while let Some(c) = iter.next() {
        if cluster.len() >= MAX_CLUSTER_PARTS {
            flush_cluster(&mut out, &mut cluster);
        }
        match part_kind(c) {
            Some(PartKind::Base) => {
                flush_cluster(&mut out, &mut cluster);
                cluster.push(ClusterPart {
                    c1: c,
                    c2: None,
                    kind: PartKind::Base,
                });
            }
            Some(PartKind::Coeng) => {
                let mut c2 = None;
                if let Some(&next) = iter.peek() {
                    if part_kind(next) == Some(PartKind::Base) {
                        iter.next();
                        c2 = Some(next);
                    }
                }
                cluster.push(ClusterPart {
                    c1: c,
                    c2,
                    kind: PartKind::Coeng,
                });
            }
            Some(kind) => {
                if cluster.is_empty() {
                    // An isolated modifier does not start a cluster.
                    out.push(c);
                } else {
                    cluster.push(ClusterPart { c1: c, c2: None, kind });
                }
            }
            None => {
                flush_cluster(&mut out, &mut cluster);
                out.push(c);
            }
        }
    }
    flush_cluster(&mut out, &mut cluster);
    out
}

/// クラスタを並べ替えて出力に書き出します
///
/// 先頭の部品は位置を保ち、残りの部品を優先度で安定ソートします。
fn flush_cluster(out: &mut String, cluster: &mut Vec<ClusterPart>) {
    if cluster.is_empty() {
        return;
    }
    if cluster.len() > 2 {
        cluster[1..].sort_by_key(priority);
    }
    for part in cluster.iter() {
        out.push(part.c1);
        if let Some(c2) = part.c2 {
            out.push(c2);
        }
    }
    cluster.clear();
}
