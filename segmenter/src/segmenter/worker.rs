//! 分割処理のためのルーチンを提供するモジュール
//!
//! このモジュールは、分割パイプライン全体（正規化 → 前向き探索 →
//! バックトラック → ルール適用 → 未知セグメント統合 → 結合）を実行する
//! ワーカー構造体を提供します。ワーカーは内部バッファを保持し、呼び出し間で
//! 再利用することで不要なメモリアロケーションを避けます。バッファの再利用が
//! 出力に影響することはありません。

use crate::normalizer::normalize;
use crate::segmenter::lattice::Lattice;
use crate::segmenter::Segmenter;

/// 分割処理のためのルーチンを提供する構造体
///
/// 分割に使用される内部バッファ（正規化済みテキスト、動的計画法の格子、
/// セグメント範囲）を保持し、それらを再利用します。各ワーカーは独立した
/// バッファを持つため、スレッドごとに1つのワーカーを使って複数の文を
/// 並行に処理できます。
///
/// # 例
///
/// ```no_run
/// use khmer_segmenter::{Dictionary, Segmenter};
///
/// let dict = Dictionary::from_path("khmer_dictionary.kdict")?;
/// let segmenter = Segmenter::new(dict);
/// let mut worker = segmenter.new_worker();
///
/// worker.reset_sentence("កងកម្លាំងរក្សាសន្តិសុខ");
/// worker.segment();
/// for surface in worker.surfaces() {
///     println!("{surface}");
/// }
/// # Ok::<(), khmer_segmenter::errors::SegmenterError>(())
/// ```
pub struct Worker {
    segmenter: Segmenter,
    text: String,
    lattice: Lattice,
    segments: Vec<(usize, usize)>,
    merged: Vec<(usize, usize)>,
}

impl Worker {
    /// 新しいインスタンスを作成します
    ///
    /// # 引数
    ///
    /// * `segmenter` - 使用するエンジン
    pub(crate) fn new(segmenter: Segmenter) -> Self {
        Self {
            segmenter,
            text: String::new(),
            lattice: Lattice::default(),
            segments: Vec::new(),
            merged: Vec::new(),
        }
    }

    /// 分割する入力文をリセットします
    ///
    /// 正規化が有効な場合は入力を正規化して内部バッファへ格納し、
    /// 無効な場合はそのまま格納します。以前の分割結果はクリアされます。
    ///
    /// # 引数
    ///
    /// * `input` - 分割する入力文字列
    pub fn reset_sentence<S>(&mut self, input: S)
    where
        S: AsRef<str>,
    {
        let input = input.as_ref();
        self.segments.clear();
        self.merged.clear();
        if self.segmenter.config_ref().enable_normalization {
            self.text = normalize(input);
        } else {
            self.text.clear();
            self.text.push_str(input);
        }
    }

    /// 設定された入力文を分割します
    ///
    /// 分割結果は内部状態に保存され、[`num_segments`](Self::num_segments)、
    /// [`surface`](Self::surface)、[`surfaces`](Self::surfaces)、
    /// [`join`](Self::join)でアクセスできます。空の文が設定されている場合は
    /// 何も行いません。
    pub fn segment(&mut self) {
        self.segments.clear();
        self.merged.clear();

        let n = self.text.len();
        if n == 0 {
            return;
        }

        self.segmenter
            .build_lattice(self.text.as_bytes(), &mut self.lattice);
        // Every scanned position proposes at least one forward transition,
        // so the end of a non-empty input is reachable.
        debug_assert!(self.lattice.final_cost().is_finite());
        if !self.lattice.backtrack(&mut self.segments) {
            // The end of the input is unreachable only under a pathological
            // configuration; fall back to a single token.
            self.segments.push((0, n));
            return;
        }

        self.segmenter.rules().apply(&self.text, &mut self.segments);

        if self.segmenter.config_ref().enable_unknown_merging {
            self.merge_unknowns();
            std::mem::swap(&mut self.segments, &mut self.merged);
        }
    }

    /// 隣接する未知セグメントを1つに統合します
    ///
    /// 結果は`self.merged`に構築されます。セグメント範囲は連続している
    /// ため、統合は範囲の境界をまとめるだけで行えます。
    fn merge_unknowns(&mut self) {
        self.merged.clear();
        let mut pending: Option<(usize, usize)> = None;

        for k in 0..self.segments.len() {
            let (start, end) = self.segments[k];
            if self.segmenter.is_known_segment(&self.text[start..end]) {
                if let Some(run) = pending.take() {
                    self.merged.push(run);
                }
                self.merged.push((start, end));
            } else {
                pending = Some(match pending {
                    Some((run_start, _)) => (run_start, end),
                    None => (start, end),
                });
            }
        }
        if let Some(run) = pending {
            self.merged.push(run);
        }
    }

    /// 正規化済みの入力文を返します
    #[inline(always)]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 分割結果のセグメント数を返します
    #[inline(always)]
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// `i`番目のセグメントの表層文字列を返します
    ///
    /// # 引数
    ///
    /// * `i` - セグメントのインデックス（0から始まる）
    ///
    /// # 戻り値
    ///
    /// セグメントの表層文字列
    #[inline(always)]
    pub fn surface(&self, i: usize) -> &str {
        let (start, end) = self.segments[i];
        &self.text[start..end]
    }

    /// 分割結果のセグメントを順に返すイテレータを作成します
    ///
    /// # 戻り値
    ///
    /// 表層文字列のイテレータ
    pub fn surfaces(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .map(move |&(start, end)| &self.text[start..end])
    }

    /// 分割結果を区切り文字で結合した文字列を返します
    ///
    /// # 引数
    ///
    /// * `separator` - セグメント間に挿入する区切り文字列
    ///
    /// # 戻り値
    ///
    /// 結合された文字列
    pub fn join(&self, separator: &str) -> String {
        let total = self.text.len() + separator.len() * self.segments.len().saturating_sub(1);
        let mut out = String::with_capacity(total);
        for (k, surface) in self.surfaces().enumerate() {
            if k > 0 {
                out.push_str(separator);
            }
            out.push_str(surface);
        }
        out
    }
}
