//! 頻度情報とコストモデルのモジュール
//!
//! このモジュールは、コーパスから数え上げた語の出現回数を加算的コストへ
//! 変換するコストモデルと、レガシーのバイナリ頻度フォーマット（KLIB）の
//! 読み書きを提供します。いずれもオフラインの辞書構築用であり、
//! 実行時には焼き込み済み辞書に保存されたコストだけが使われます。

use std::io::{Read, Write};

use hashbrown::HashMap;

use crate::errors::{Result, SegmenterError};

/// 頻度フロア
///
/// これ未満の出現回数はこの値に引き上げられます。出現回数の極端に少ない
/// 語が過大なコストを持たないようにするためのものです。
const MIN_FREQ_FLOOR: f64 = 5.0;

/// レガシー頻度バイナリを識別するマジックバイト
pub const KLIB_MAGIC: &[u8; 4] = b"KLIB";

/// レガシー頻度バイナリのフォーマットバージョン
pub const KLIB_VERSION: u32 = 1;

/// 語のコストモデル
///
/// 出現回数`c`の語のコストは `-log10(max(c, floor) / total)` で定義されます。
/// 頻度を持たない登録語には`default_cost`が、未知クラスタには
/// `unknown_cost = default_cost + 5`が適用されます。
pub struct CostModel {
    costs: HashMap<String, f32>,
    default_cost: f32,
    unknown_cost: f32,
}

impl CostModel {
    /// 出現回数の集合からコストモデルを導出します
    ///
    /// # 引数
    ///
    /// * `counts` - `(語, 出現回数)`のイテレータ
    ///
    /// # 戻り値
    ///
    /// 導出されたコストモデル
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        let mut effective: Vec<(String, f64)> = counts
            .into_iter()
            .map(|(word, count)| (word, count.max(MIN_FREQ_FLOOR)))
            .collect();
        let mut total: f64 = effective.iter().map(|(_, c)| c).sum();
        if total == 0.0 {
            total = 1.0;
        }

        let mut costs = HashMap::with_capacity(effective.len());
        for (word, count) in effective.drain(..) {
            costs.insert(word, -(count / total).log10() as f32);
        }

        let default_cost = -(MIN_FREQ_FLOOR / total).log10() as f32;
        Self {
            costs,
            default_cost,
            unknown_cost: default_cost + 5.0,
        }
    }

    /// 頻度情報なしの一様なコストモデルを作成します
    ///
    /// すべての登録語が`default_cost`を持ちます。
    ///
    /// # 引数
    ///
    /// * `default_cost` - 登録語のコスト
    /// * `unknown_cost` - 未知クラスタのコスト
    pub fn uniform(default_cost: f32, unknown_cost: f32) -> Self {
        Self {
            costs: HashMap::new(),
            default_cost,
            unknown_cost,
        }
    }

    /// レガシーのKLIBバイナリからコストモデルを読み込みます
    ///
    /// フォーマット: マジック`"KLIB"`、`u32`バージョン、`f32`デフォルト
    /// コスト、`f32`未知コスト、`u32`エントリ数、続いて各エントリが
    /// `u16`語長、語バイト列、`f32`コスト。整数はリトルエンディアンです。
    ///
    /// # 引数
    ///
    /// * `rdr` - 読み込み元のリーダー
    ///
    /// # エラー
    ///
    /// マジックやバージョンが一致しない場合、またはファイルが途中で
    /// 切れている場合にエラーを返します。
    pub fn read_klib<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut magic = [0u8; 4];
        rdr.read_exact(&mut magic)?;
        if &magic != KLIB_MAGIC {
            return Err(SegmenterError::invalid_format(
                "klib",
                "The magic number of the input frequency file mismatches.",
            ));
        }
        let version = read_u32(&mut rdr)?;
        if version != KLIB_VERSION {
            return Err(SegmenterError::invalid_format(
                "klib",
                format!("Unsupported frequency file version: {version}"),
            ));
        }

        let default_cost = read_f32(&mut rdr)?;
        let unknown_cost = read_f32(&mut rdr)?;
        let num_entries = read_u32(&mut rdr)?;

        let mut costs = HashMap::with_capacity(num_entries as usize);
        let mut word_buf = Vec::new();
        for _ in 0..num_entries {
            let mut len_buf = [0u8; 2];
            rdr.read_exact(&mut len_buf)?;
            let word_len = usize::from(u16::from_le_bytes(len_buf));

            word_buf.resize(word_len, 0);
            rdr.read_exact(&mut word_buf)?;
            let word = std::str::from_utf8(&word_buf)?.to_string();

            let cost = read_f32(&mut rdr)?;
            costs.insert(word, cost);
        }

        Ok(Self {
            costs,
            default_cost,
            unknown_cost,
        })
    }

    /// コストモデルをレガシーのKLIBバイナリとして書き出します
    ///
    /// エントリは語のソート順に書き出され、出力は決定的です。
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合にI/Oエラーを返します。
    pub fn write_klib<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(KLIB_MAGIC)?;
        wtr.write_all(&KLIB_VERSION.to_le_bytes())?;
        wtr.write_all(&self.default_cost.to_le_bytes())?;
        wtr.write_all(&self.unknown_cost.to_le_bytes())?;
        wtr.write_all(&(self.costs.len() as u32).to_le_bytes())?;

        let mut sorted: Vec<(&String, f32)> = self.costs.iter().map(|(w, &c)| (w, c)).collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
        for (word, cost) in sorted {
            let bytes = word.as_bytes();
            wtr.write_all(&(bytes.len() as u16).to_le_bytes())?;
            wtr.write_all(bytes)?;
            wtr.write_all(&cost.to_le_bytes())?;
        }
        Ok(())
    }

    /// 語のコストを返します
    ///
    /// # 引数
    ///
    /// * `word` - 検索する語
    ///
    /// # 戻り値
    ///
    /// 頻度情報がある場合は`Some(コスト)`、ない場合は`None`
    #[inline]
    pub fn cost(&self, word: &str) -> Option<f32> {
        self.costs.get(word).copied()
    }

    /// 頻度情報を持たない登録語のコストを返します
    #[inline]
    pub fn default_cost(&self) -> f32 {
        self.default_cost
    }

    /// 未知クラスタのコストを返します
    #[inline]
    pub fn unknown_cost(&self) -> f32 {
        self.unknown_cost
    }
}

fn read_u32<R: Read>(rdr: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    rdr.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_f32<R: Read>(rdr: &mut R) -> Result<f32> {
    let mut buf = [0u8; 4];
    rdr.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}
