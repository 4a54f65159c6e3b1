//! 辞書バイナリ構築のためのビルダー
//!
//! このモジュールは、語とコストの集合から焼き込み済み辞書ブロブを
//! 構築するビルダーを提供します。構築はオフライン処理であり、
//! 実行時のホットパスには含まれません。
//!
//! 出力は決定的です。同じ入力集合からは常にビット単位で同一のブロブが
//! 生成されます。

use std::io::Write;

use hashbrown::{HashMap, HashSet};

use crate::dictionary::frequencies::CostModel;
use crate::dictionary::lexicon::prune_disjunctive_compounds;
use crate::dictionary::variants::generate_variants;
use crate::dictionary::{djb2, ENTRY_LEN, HEADER_LEN, KDICT_MAGIC, KDICT_VERSION};
use crate::errors::Result;

/// ハッシュテーブルの目標充填率
///
/// 線形プロービングの衝突チェーンを短く保つため、スロット数は
/// `語数 / LOAD_FACTOR` 以上の最小の2のべき乗に丸められます。
const LOAD_FACTOR: f64 = 0.70;

/// 焼き込み済み辞書ブロブを構築するビルダー
///
/// # 例
///
/// ```
/// use khmer_segmenter::dictionary::builder::DictionaryBuilder;
/// use khmer_segmenter::Dictionary;
///
/// let mut builder = DictionaryBuilder::new(6.0, 11.0);
/// builder.insert("កង", 2.5);
/// let dict = Dictionary::from_bytes(builder.build())?;
/// assert_eq!(dict.lookup("កង".as_bytes()), Some(2.5));
/// # Ok::<(), khmer_segmenter::errors::SegmenterError>(())
/// ```
pub struct DictionaryBuilder {
    entries: HashMap<String, f32>,
    default_cost: f32,
    unknown_cost: f32,
}

impl DictionaryBuilder {
    /// 新しいビルダーを作成します
    ///
    /// # 引数
    ///
    /// * `default_cost` - 頻度情報を持たない語に適用されるコスト
    /// * `unknown_cost` - 未知クラスタに適用されるコスト
    pub fn new(default_cost: f32, unknown_cost: f32) -> Self {
        Self {
            entries: HashMap::new(),
            default_cost,
            unknown_cost,
        }
    }

    /// 語をコスト付きで登録します
    ///
    /// 同じ語が複数回登録された場合、最初のコストが保持されます。
    ///
    /// # 引数
    ///
    /// * `word` - 登録する語
    /// * `cost` - 語のコスト（小さいほど優先されます）
    pub fn insert(&mut self, word: &str, cost: f32) {
        self.entries.entry_ref(word).or_insert(cost);
    }

    /// フィルタ済みの語リストとコストモデルからビルダーを構築します
    ///
    /// `with_variants`が有効な場合、各語の正書法バリアント
    /// （Ta↔Daの置換と隣接する下付きRoの並び替え）も同時に登録されます。
    /// バリアント自体に頻度がない場合は元の語のコストを引き継ぎます。
    /// 登録後、"ឬ"を含む複合語のうち分割しても全部分が語として存在する
    /// ものは取り除かれます。
    ///
    /// # 引数
    ///
    /// * `words` - 登録する語のイテレータ
    /// * `costs` - コストモデル
    /// * `with_variants` - バリアント生成を行うかどうか
    ///
    /// # 戻り値
    ///
    /// 構築済みのビルダー
    pub fn from_word_list<I, S>(words: I, costs: &CostModel, with_variants: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: HashSet<String> = HashSet::new();
        let mut variant_to_primary: HashMap<String, String> = HashMap::new();

        for word in words {
            let word = word.as_ref();
            set.insert(word.to_string());
            if with_variants {
                for variant in generate_variants(word) {
                    if !set.contains(&variant) {
                        variant_to_primary.insert(variant.clone(), word.to_string());
                        set.insert(variant);
                    }
                }
            }
        }

        let removed = prune_disjunctive_compounds(&mut set);
        if removed > 0 {
            log::info!("Removed {removed} disjunctive compounds to enforce splits");
        }

        let mut builder = Self::new(costs.default_cost(), costs.unknown_cost());
        for word in &set {
            let cost = costs
                .cost(word)
                .or_else(|| {
                    variant_to_primary
                        .get(word)
                        .and_then(|primary| costs.cost(primary))
                })
                .unwrap_or(costs.default_cost());
            builder.insert(word, cost);
        }
        builder
    }

    /// 登録済みの語数を返します
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 語が1つも登録されていない場合に`true`を返します
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 辞書ブロブをバイト列として構築します
    ///
    /// テーブルサイズは目標充填率を満たす最小の2のべき乗に決定され、
    /// 語はソート順に文字列プールへ配置・テーブルへ挿入されます。
    ///
    /// # 戻り値
    ///
    /// 構築された辞書ブロブ
    pub fn build(&self) -> Vec<u8> {
        let num_entries = self.entries.len();

        let min_slots = (num_entries as f64 / LOAD_FACTOR) as usize;
        let mut table_size = min_slots.next_power_of_two();
        // Probing relies on at least one empty slot.
        if table_size <= num_entries {
            table_size *= 2;
        }

        let mut sorted: Vec<(&String, f32)> =
            self.entries.iter().map(|(w, &c)| (w, c)).collect();
        sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

        // The pool starts with a NUL so that offset 0 never names a word.
        let mut pool: Vec<u8> = vec![0];
        let mut table: Vec<(u32, f32)> = vec![(0, 0.0); table_size];
        let mask = table_size as u32 - 1;
        let mut max_word_length = 0u32;

        for (word, cost) in sorted {
            let bytes = word.as_bytes();
            max_word_length = max_word_length.max(bytes.len() as u32);

            let name_offset = pool.len() as u32;
            pool.extend_from_slice(bytes);
            pool.push(0);

            let mut idx = djb2(bytes) & mask;
            while table[idx as usize].0 != 0 {
                idx = (idx + 1) & mask;
            }
            table[idx as usize] = (name_offset, cost);
        }

        let mut blob = Vec::with_capacity(HEADER_LEN + table_size * ENTRY_LEN + pool.len());
        blob.extend_from_slice(KDICT_MAGIC);
        blob.extend_from_slice(&KDICT_VERSION.to_le_bytes());
        blob.extend_from_slice(&(num_entries as u32).to_le_bytes());
        blob.extend_from_slice(&(table_size as u32).to_le_bytes());
        blob.extend_from_slice(&self.default_cost.to_le_bytes());
        blob.extend_from_slice(&self.unknown_cost.to_le_bytes());
        blob.extend_from_slice(&max_word_length.to_le_bytes());
        blob.extend_from_slice(&0u32.to_le_bytes());
        for (name_offset, cost) in table {
            blob.extend_from_slice(&name_offset.to_le_bytes());
            blob.extend_from_slice(&cost.to_le_bytes());
        }
        blob.extend_from_slice(&pool);
        blob
    }

    /// 辞書ブロブをライターへ書き出します
    ///
    /// # 引数
    ///
    /// * `wtr` - 書き込み先
    ///
    /// # エラー
    ///
    /// 書き込みに失敗した場合にI/Oエラーを返します。
    pub fn write<W>(&self, mut wtr: W) -> Result<()>
    where
        W: Write,
    {
        wtr.write_all(&self.build())?;
        Ok(())
    }
}
