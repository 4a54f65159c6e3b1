//! クメール文字の分類と走査を提供するモジュール
//!
//! このモジュールは、コードポイント単位の文字分類（基底文字、数字、
//! 区切り文字など）と、バイト位置を基準にした走査関数（正書法クラスタ、
//! 数値グループ、頭字語）を提供します。すべての走査関数はバイト長を返し、
//! バイトインデックスで動作する探索エンジンから直接利用されます。

use crate::utils::decode_codepoint_at;

/// 従属母音の範囲の先頭（U+17B6）
pub(crate) const DEP_VOWEL_FIRST: u32 = 0x17B6;

/// 従属母音の範囲の末尾（U+17C5）
pub(crate) const DEP_VOWEL_LAST: u32 = 0x17C5;

/// 下付き文字マーカー Coeng（U+17D2）
pub(crate) const COENG: u32 = 0x17D2;

/// 下付き文字 Ro（U+179A）
pub(crate) const RO: u32 = 0x179A;

/// コードポイントがクメール文字ブロックに属するかどうかを判定します
///
/// クメール基本ブロック（U+1780..=U+17FF）とクメール記号ブロック
/// （U+19E0..=U+19FF）の両方を対象とします。
///
/// # 引数
///
/// * `cp` - 判定対象のコードポイント
///
/// # 戻り値
///
/// クメール文字の場合は`true`
#[inline(always)]
pub const fn is_khmer(cp: u32) -> bool {
    matches!(cp, 0x1780..=0x17FF | 0x19E0..=0x19FF)
}

/// コードポイントが基底子音（U+1780..=U+17A2）かどうかを判定します
#[inline(always)]
pub const fn is_base_consonant(cp: u32) -> bool {
    matches!(cp, 0x1780..=0x17A2)
}

/// コードポイントが単独で語を構成できる基底文字かどうかを判定します
///
/// 基底子音（U+1780..=U+17A2）と独立母音（U+17A3..=U+17B3）が
/// これに該当します。
///
/// # 引数
///
/// * `cp` - 判定対象のコードポイント
///
/// # 戻り値
///
/// 有効な基底文字の場合は`true`
#[inline(always)]
pub const fn is_valid_single_base(cp: u32) -> bool {
    matches!(cp, 0x1780..=0x17B3)
}

/// コードポイントが数字かどうかを判定します
///
/// ASCII数字（U+0030..=U+0039）とクメール数字（U+17E0..=U+17E9）の
/// 両方を対象とします。
#[inline(always)]
pub const fn is_digit(cp: u32) -> bool {
    matches!(cp, 0x30..=0x39 | 0x17E0..=0x17E9)
}

/// コードポイントが従属母音（U+17B6..=U+17C5）かどうかを判定します
#[inline(always)]
pub const fn is_dep_vowel(cp: u32) -> bool {
    matches!(cp, DEP_VOWEL_FIRST..=DEP_VOWEL_LAST)
}

/// コードポイントが区切り文字かどうかを判定します
///
/// 以下をすべて区切り文字として扱います:
///
/// - クメール句読点（U+17D4..=U+17DA）とクメール通貨記号（U+17DB）
/// - ASCII句読点と空白類
/// - ノーブレークスペース（U+00A0）とダブルアキュート（U+02DD）
/// - ギュメ（U+00AB、U+00BB）とラテン1通貨記号（U+00A3、U+00A5）
/// - 一般句読点ブロック（U+2000..=U+206F）
/// - 通貨記号ブロック（U+20A0..=U+20CF）
///
/// # 引数
///
/// * `cp` - 判定対象のコードポイント
///
/// # 戻り値
///
/// 区切り文字の場合は`true`
#[inline(always)]
pub const fn is_separator(cp: u32) -> bool {
    if matches!(cp, 0x17D4..=0x17DB) {
        return true;
    }
    if cp < 0x80 {
        // ASCII punctuation and whitespace
        return matches!(cp, 0x21..=0x2F | 0x3A..=0x40 | 0x5B..=0x60 | 0x7B..=0x7E)
            || matches!(cp, 0x20 | 0x09..=0x0D);
    }
    matches!(
        cp,
        0xA0 | 0x2DD | 0xAB | 0xBB | 0xA3 | 0xA5 | 0x2000..=0x206F | 0x20A0..=0x20CF
    )
}

/// コードポイントが数値グループを開始し得る通貨記号かどうかを判定します
///
/// `$`、U+17DB（リエル）、U+20AC（ユーロ）、U+00A3（ポンド）、
/// U+00A5（円）が対象です。直後に数字が続く場合のみ意味を持ちます。
#[inline(always)]
pub const fn is_currency_symbol(cp: u32) -> bool {
    matches!(cp, 0x24 | 0x17DB | 0x20AC | 0xA3 | 0xA5)
}

/// 指定位置から始まるクメール正書法クラスタのバイト長を返します
///
/// クラスタは基底文字（基底子音または独立母音）で始まり、
/// 後続の（Coeng + 基底子音）の対と従属母音・記号類を取り込みます。
/// 先頭が基底文字でない場合は、その1コードポイント分の長さを返します。
/// 後続の基底子音を伴わないCoengはクラスタに含めず、その位置で打ち切ります。
///
/// # 引数
///
/// * `bytes` - 走査対象のバイト列
/// * `start` - クラスタの開始バイト位置
///
/// # 戻り値
///
/// クラスタのバイト長
pub fn khmer_cluster_length(bytes: &[u8], start: usize) -> usize {
    let n = bytes.len();
    let (first, first_len) = decode_codepoint_at(bytes, start);
    if !is_valid_single_base(first) {
        return first_len;
    }

    let mut i = start + first_len;
    while i < n {
        let (cp, len) = decode_codepoint_at(bytes, i);

        if cp == COENG {
            if i + len < n {
                let (sub, sub_len) = decode_codepoint_at(bytes, i + len);
                if is_base_consonant(sub) {
                    i += len + sub_len;
                    continue;
                }
            }
            // Trailing coeng, or coeng followed by a non-consonant.
            break;
        }

        // Dependent vowels and signs.
        if matches!(cp, 0x17B6..=0x17D1 | 0x17D3 | 0x17DD) {
            i += len;
            continue;
        }

        break;
    }

    i - start
}

/// 指定位置から始まる数値グループのバイト長を返します
///
/// 数値グループは数字で始まり、数字の並びと、直後に数字が続く場合に限り
/// 内部区切り文字（`,`、`.`、空白）を1つずつ取り込みます。
/// 先頭が数字でない場合は`0`を返します。
///
/// # 引数
///
/// * `bytes` - 走査対象のバイト列
/// * `start` - 数値グループの開始バイト位置
///
/// # 戻り値
///
/// 数値グループのバイト長（数字で始まらない場合は`0`）
pub fn number_length(bytes: &[u8], start: usize) -> usize {
    let n = bytes.len();
    let (first, first_len) = decode_codepoint_at(bytes, start);
    if !is_digit(first) {
        return 0;
    }

    let mut i = start + first_len;
    while i < n {
        let (cp, len) = decode_codepoint_at(bytes, i);

        if is_digit(cp) {
            i += len;
            continue;
        }

        // An interior thousands/decimal separator must be followed by a digit.
        if matches!(cp, 0x2C | 0x2E | 0x20) && i + len < n {
            let (follow, follow_len) = decode_codepoint_at(bytes, i + len);
            if is_digit(follow) {
                i += len + follow_len;
                continue;
            }
        }

        break;
    }

    i - start
}

/// 指定位置が頭字語の開始位置かどうかを判定します
///
/// 基底文字で始まるクラスタの直後にASCIIピリオドが続く場合に`true`を
/// 返します。
///
/// # 引数
///
/// * `bytes` - 走査対象のバイト列
/// * `start` - 判定対象のバイト位置
///
/// # 戻り値
///
/// 頭字語の開始位置の場合は`true`
pub fn is_acronym_start(bytes: &[u8], start: usize) -> bool {
    let n = bytes.len();
    if start + 1 >= n {
        return false;
    }
    let (cp, _) = decode_codepoint_at(bytes, start);
    if !is_valid_single_base(cp) {
        return false;
    }
    let cluster_len = khmer_cluster_length(bytes, start);
    let dot = start + cluster_len;
    dot < n && bytes[dot] == b'.'
}

/// 指定位置から始まる頭字語の最大バイト長を返します
///
/// （クラスタ + `.`）の繰り返しを可能な限り取り込みます。
/// 頭字語が始まらない位置では`0`を返します。
///
/// # 引数
///
/// * `bytes` - 走査対象のバイト列
/// * `start` - 頭字語の開始バイト位置
///
/// # 戻り値
///
/// 頭字語のバイト長
pub fn acronym_length(bytes: &[u8], start: usize) -> usize {
    let n = bytes.len();
    let mut i = start;
    while i < n {
        let (cp, _) = decode_codepoint_at(bytes, i);
        if !is_valid_single_base(cp) {
            break;
        }
        let cluster_len = khmer_cluster_length(bytes, i);
        let dot = i + cluster_len;
        if dot < n && bytes[dot] == b'.' {
            i = dot + 1;
        } else {
            break;
        }
    }
    i - start
}
