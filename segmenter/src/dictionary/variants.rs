//! 正書法バリアントの生成を提供するモジュール
//!
//! クメール語の綴りには、発音上交換可能な下付きTa（U+17D2 U+178F）と
//! 下付きDa（U+17D2 U+178A）の揺れ、および隣接する下付き文字の並び順の
//! 揺れ（下付きRoの位置）が存在します。このモジュールは、辞書構築時に
//! それらのバリアントを登録語として展開します。これにより実行時の照合は
//! 正規化を伴わない単一の完全一致プローブで済みます。

const COENG: char = '\u{17D2}';
const RO: char = '\u{179A}';
const COENG_TA: &str = "\u{17D2}\u{178F}";
const COENG_DA: &str = "\u{17D2}\u{178A}";

/// 語の正書法バリアントを生成します
///
/// Ta↔Daの置換（両方向）と、隣接する2つの下付き文字のうち一方が下付きRo
/// である場合の並び替え（両方向）を適用します。3段以上の下付き文字の
/// 並び替えは行いません。戻り値に元の語は含まれず、語のソート順で
/// 返されるため決定的です。
///
/// # 引数
///
/// * `word` - バリアント展開の対象となる語
///
/// # 戻り値
///
/// 生成されたバリアントのソート済みベクタ
///
/// # 例
///
/// ```
/// # use khmer_segmenter::dictionary::variants::generate_variants;
/// let variants = generate_variants("ប\u{17D2}\u{178F}ូរ");
/// assert_eq!(variants, vec!["ប\u{17D2}\u{178A}ូរ".to_string()]);
/// ```
pub fn generate_variants(word: &str) -> Vec<String> {
    let mut base_set: Vec<String> = vec![word.to_string()];
    if word.contains(COENG_TA) {
        base_set.push(word.replace(COENG_TA, COENG_DA));
    }
    if word.contains(COENG_DA) {
        base_set.push(word.replace(COENG_DA, COENG_TA));
    }

    let mut variants: Vec<String> = Vec::new();
    let mut push = |v: String, variants: &mut Vec<String>| {
        if v != word && !variants.contains(&v) {
            variants.push(v);
        }
    };

    for w in &base_set {
        if w != word {
            push(w.clone(), &mut variants);
        }
        if let Some(swapped) = swap_subscript_pairs(w, true) {
            push(swapped, &mut variants);
        }
        if let Some(swapped) = swap_subscript_pairs(w, false) {
            push(swapped, &mut variants);
        }
    }

    variants.sort_unstable();
    variants
}

/// 隣接する下付き文字の対を入れ替えます
///
/// `ro_first`が`true`の場合は（下付きRo, 下付き非Ro）の対を、`false`の
/// 場合は（下付き非Ro, 下付きRo）の対を、左から右へ重複なく走査して
/// すべて入れ替えます。
///
/// # 引数
///
/// * `word` - 対象の語
/// * `ro_first` - 入れ替え対象の対の並び順
///
/// # 戻り値
///
/// 1箇所以上入れ替えた場合は`Some(結果)`、対が存在しない場合は`None`
fn swap_subscript_pairs(word: &str, ro_first: bool) -> Option<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut changed = false;

    let mut i = 0;
    while i < chars.len() {
        if i + 3 < chars.len() && chars[i] == COENG && chars[i + 2] == COENG {
            let first_sub = chars[i + 1];
            let second_sub = chars[i + 3];
            let matched = if ro_first {
                first_sub == RO && second_sub != RO
            } else {
                first_sub != RO && second_sub == RO
            };
            if matched {
                out.extend([chars[i + 2], chars[i + 3], chars[i], chars[i + 1]]);
                i += 4;
                changed = true;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    changed.then(|| out.into_iter().collect())
}
