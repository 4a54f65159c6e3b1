//! 焼き込み済み辞書（KDICバイナリ）のモジュール
//!
//! このモジュールは、単一の連続バイナリブロブとしてレイアウトされた
//! オープンアドレス法ハッシュテーブル辞書の読み込み、検証、参照を行います。
//! ブロブはメモリマップまたは所有バッファとして保持され、テーブルと
//! 文字列プールにはコピーなしで直接アクセスします。
//!
//! # バイナリレイアウト
//!
//! すべての整数はリトルエンディアンです。
//!
//! ```text
//! [0]   magic: 4バイト = "KDIC"
//! [4]   version: u32 (現在は1)
//! [8]   num_entries: u32
//! [12]  table_size: u32 (2のべき乗)
//! [16]  default_cost: f32
//! [20]  unknown_cost: f32
//! [24]  max_word_length: u32 (バイト単位)
//! [28]  padding: 4バイト
//! [32]  table: table_size × 8バイト (name_offset: u32, cost: f32)
//! [...] string_pool: NUL終端UTF-8語の連結
//! ```
//!
//! `name_offset`は文字列プール内へのバイトオフセットで、`0`は空スロットを
//! 示します（プールの先頭バイトは常にNULであり、オフセット0が語を指すことは
//! ありません）。語の配置は、語のバイト列のDJB2ハッシュを`table_size - 1`で
//! マスクした位置からの線形プロービングで行われます。
//!
//! 読み込み後の辞書は不変であり、ロックなしで複数スレッドから同時に
//! 参照できます。

pub mod builder;
pub mod frequencies;
pub mod lexicon;
pub mod variants;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use memmap2::Mmap;

use crate::errors::{Result, SegmenterError};

/// 辞書バイナリを識別するマジックバイト
pub const KDICT_MAGIC: &[u8; 4] = b"KDIC";

/// 辞書バイナリのフォーマットバージョン
pub const KDICT_VERSION: u32 = 1;

/// ヘッダのバイト長
pub(crate) const HEADER_LEN: usize = 32;

/// テーブルエントリのバイト長
pub(crate) const ENTRY_LEN: usize = 8;

/// 語のバイト列のDJB2ハッシュを計算します
///
/// # 引数
///
/// * `bytes` - ハッシュ対象のバイト列
///
/// # 戻り値
///
/// 32ビットのハッシュ値
#[inline]
pub(crate) fn djb2(bytes: &[u8]) -> u32 {
    let mut hash: u32 = 5381;
    for &b in bytes {
        hash = djb2_step(hash, b);
    }
    hash
}

/// DJB2ハッシュを1バイト分進めます
///
/// 探索エンジンのホットパスでは、辞書候補の接頭辞ごとにハッシュを
/// 計算し直す代わりに、この関数でインクリメンタルに畳み込みます。
#[inline(always)]
pub(crate) const fn djb2_step(hash: u32, byte: u8) -> u32 {
    hash.wrapping_shl(5)
        .wrapping_add(hash)
        .wrapping_add(byte as u32)
}

#[inline(always)]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline(always)]
fn read_f32_le(bytes: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// 辞書ブロブを保持するメモリバッファ（mmapまたはヒープ）
enum DictBuffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl DictBuffer {
    #[inline(always)]
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Mmap(m) => m,
            Self::Owned(v) => v,
        }
    }
}

/// 参照専用の焼き込み済み辞書
///
/// 構築時にブロブの構造検証をすべて行うため、構築に成功した辞書の参照は
/// 常に安全です。内部状態は不変であり、複数スレッドから同時に参照できます。
///
/// # 例
///
/// ```no_run
/// use khmer_segmenter::Dictionary;
///
/// let dict = Dictionary::from_path("khmer_dictionary.kdict")?;
/// assert!(dict.num_entries() > 0);
/// # Ok::<(), khmer_segmenter::errors::SegmenterError>(())
/// ```
pub struct Dictionary {
    buffer: DictBuffer,
    num_entries: u32,
    table_size: u32,
    table_mask: u32,
    default_cost: f32,
    unknown_cost: f32,
    max_word_length: u32,
    pool_start: usize,
}

impl Dictionary {
    /// メモリマッピングを使用してファイルパスから辞書を読み込みます
    ///
    /// ブロブはコピーされず、ファイルの内容がそのまま参照されます。
    /// ファイルは辞書の生存期間中、置き換えられてはなりません。
    ///
    /// # 引数
    ///
    /// * `path` - 辞書ファイル（`.kdict`）のパス
    ///
    /// # 戻り値
    ///
    /// 検証済みの`Dictionary`インスタンス
    ///
    /// # エラー
    ///
    /// ファイルが開けない場合、またはブロブの構造検証に失敗した場合に
    /// エラーを返します。
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if path.is_dir() {
            return Err(SegmenterError::invalid_argument(
                "path",
                format!(
                    "The path '{}' is a directory, but a file was expected.",
                    path.display()
                ),
            ));
        }
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and kept alive by the returned
        // dictionary; the caller must not truncate the underlying file.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_buffer(DictBuffer::Mmap(mmap))
    }

    /// リーダーから辞書を読み込みます
    ///
    /// すべての内容をヒープ上のバッファに読み込むため、`from_path`よりも
    /// メモリ効率は低くなりますが、ファイルパスが利用できない場合の
    /// フォールバックとして使用できます。
    ///
    /// # 引数
    ///
    /// * `rdr` - `std::io::Read`を実装するリーダー
    ///
    /// # エラー
    ///
    /// 読み込みに失敗した場合、またはブロブの構造検証に失敗した場合に
    /// エラーを返します。
    pub fn read<R>(mut rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut buffer = Vec::new();
        rdr.read_to_end(&mut buffer)?;
        Self::from_bytes(buffer)
    }

    /// 所有バイト列から辞書を構築します
    ///
    /// # 引数
    ///
    /// * `bytes` - 辞書ブロブのバイト列
    ///
    /// # エラー
    ///
    /// ブロブの構造検証に失敗した場合にエラーを返します。
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_buffer(DictBuffer::Owned(bytes))
    }

    fn from_buffer(buffer: DictBuffer) -> Result<Self> {
        let blob = buffer.bytes();
        if blob.len() < HEADER_LEN {
            return Err(SegmenterError::invalid_format(
                "kdict",
                "The file is smaller than the dictionary header.",
            ));
        }
        if &blob[..4] != KDICT_MAGIC {
            return Err(SegmenterError::invalid_format(
                "kdict",
                "The magic number of the input dictionary mismatches.",
            ));
        }
        let version = read_u32_le(blob, 4);
        if version != KDICT_VERSION {
            return Err(SegmenterError::invalid_format(
                "kdict",
                format!("Unsupported dictionary version: {version}"),
            ));
        }

        let num_entries = read_u32_le(blob, 8);
        let table_size = read_u32_le(blob, 12);
        let default_cost = read_f32_le(blob, 16);
        let unknown_cost = read_f32_le(blob, 20);
        let max_word_length = read_u32_le(blob, 24);

        if table_size == 0 || !table_size.is_power_of_two() {
            return Err(SegmenterError::invalid_format(
                "kdict",
                format!("table_size must be a positive power of two: {table_size}"),
            ));
        }

        let pool_start = HEADER_LEN + table_size as usize * ENTRY_LEN;
        if pool_start > blob.len() {
            return Err(SegmenterError::invalid_format(
                "kdict",
                "The file is truncated inside the hash table.",
            ));
        }
        let pool_len = blob.len() - pool_start;
        if pool_len == 0 || blob[pool_start] != 0 {
            return Err(SegmenterError::invalid_format(
                "kdict",
                "The string pool must start with a NUL byte.",
            ));
        }
        if blob[blob.len() - 1] != 0 {
            return Err(SegmenterError::invalid_format(
                "kdict",
                "The string pool is not NUL-terminated.",
            ));
        }

        // Every occupied slot must point inside the pool, and at least one
        // slot must be empty so that probing terminates.
        let mut occupied = 0u32;
        for idx in 0..table_size {
            let offset = HEADER_LEN + idx as usize * ENTRY_LEN;
            let name_offset = read_u32_le(blob, offset);
            if name_offset != 0 {
                occupied += 1;
                if name_offset as usize >= pool_len {
                    return Err(SegmenterError::invalid_format(
                        "kdict",
                        format!("Entry {idx} points outside the string pool."),
                    ));
                }
            }
        }
        if occupied == table_size {
            return Err(SegmenterError::invalid_format(
                "kdict",
                "The hash table has no empty slot.",
            ));
        }

        log::info!(
            "Loaded baked dictionary: {} words, {} table slots, {} bytes",
            num_entries,
            table_size,
            blob.len(),
        );

        Ok(Self {
            num_entries,
            table_size,
            table_mask: table_size - 1,
            default_cost,
            unknown_cost,
            max_word_length,
            pool_start,
            buffer,
        })
    }

    #[inline(always)]
    fn blob(&self) -> &[u8] {
        self.buffer.bytes()
    }

    #[inline(always)]
    fn pool(&self) -> &[u8] {
        &self.blob()[self.pool_start..]
    }

    /// テーブルスロットを読み取ります
    #[inline(always)]
    fn entry(&self, idx: u32) -> (u32, f32) {
        let offset = HEADER_LEN + idx as usize * ENTRY_LEN;
        let blob = self.blob();
        (read_u32_le(blob, offset), read_f32_le(blob, offset + 4))
    }

    /// 事前計算済みハッシュで語を照合します
    ///
    /// ホットパス用のエントリポイントです。ハッシュ位置から線形に
    /// プロービングし、空スロットに到達した時点で不一致と判定します。
    ///
    /// # 引数
    ///
    /// * `hash` - `word`のDJB2ハッシュ
    /// * `word` - 照合対象の語のバイト列（空であってはなりません）
    ///
    /// # 戻り値
    ///
    /// 一致した場合は`Some(コスト)`、見つからない場合は`None`
    #[inline]
    pub(crate) fn probe(&self, hash: u32, word: &[u8]) -> Option<f32> {
        let pool = self.pool();
        let len = word.len();
        let mut idx = hash & self.table_mask;
        loop {
            let (name_offset, cost) = self.entry(idx);
            if name_offset == 0 {
                return None;
            }
            let stored = &pool[name_offset as usize..];
            // First-byte fast path, then a bounded prefix compare, then the
            // NUL sentinel that proves the stored word is not longer.
            if stored.len() > len
                && stored[0] == word[0]
                && &stored[..len] == word
                && stored[len] == 0
            {
                return Some(cost);
            }
            idx = (idx + 1) & self.table_mask;
        }
    }

    /// 語を検索し、登録されていればコストを返します
    ///
    /// # 引数
    ///
    /// * `word` - 検索する語のバイト列
    ///
    /// # 戻り値
    ///
    /// 登録されている場合は`Some(コスト)`、未登録の場合は`None`
    #[inline]
    pub fn lookup(&self, word: &[u8]) -> Option<f32> {
        if word.is_empty() {
            return None;
        }
        self.probe(djb2(word), word)
    }

    /// 登録語数を返します
    #[inline(always)]
    pub const fn num_entries(&self) -> u32 {
        self.num_entries
    }

    /// ハッシュテーブルのスロット数を返します
    #[inline(always)]
    pub const fn table_size(&self) -> u32 {
        self.table_size
    }

    /// 頻度情報を持たない登録語に適用されるコストを返します
    #[inline(always)]
    pub const fn default_cost(&self) -> f32 {
        self.default_cost
    }

    /// 未知クラスタに適用されるコストを返します
    #[inline(always)]
    pub const fn unknown_cost(&self) -> f32 {
        self.unknown_cost
    }

    /// 登録語の最大バイト長を返します
    ///
    /// 辞書照合の窓幅の上限として使用されます。
    #[inline(always)]
    pub const fn max_word_length(&self) -> u32 {
        self.max_word_length
    }
}

#[cfg(test)]
mod tests {
    use super::builder::DictionaryBuilder;
    use super::*;

    use std::io::Write;

    fn build_test_blob() -> Vec<u8> {
        let mut builder = DictionaryBuilder::new(6.0, 11.0);
        builder.insert("កង", 2.5);
        builder.insert("កងកម្លាំង", 1.0);
        builder.insert("រក្សា", 3.0);
        builder.build()
    }

    #[test]
    fn test_round_trip_lookup() {
        let dict = Dictionary::from_bytes(build_test_blob()).unwrap();
        assert_eq!(dict.num_entries(), 3);
        assert_eq!(dict.lookup("កង".as_bytes()), Some(2.5));
        assert_eq!(dict.lookup("កងកម្លាំង".as_bytes()), Some(1.0));
        assert_eq!(dict.lookup("រក្សា".as_bytes()), Some(3.0));
        assert_eq!(dict.lookup("សា".as_bytes()), None);
        assert_eq!(dict.lookup(b""), None);
        // A prefix of a stored word is not a member.
        assert_eq!(dict.lookup("កងក".as_bytes()), None);
    }

    #[test]
    fn test_costs_and_window() {
        let dict = Dictionary::from_bytes(build_test_blob()).unwrap();
        assert_eq!(dict.default_cost(), 6.0);
        assert_eq!(dict.unknown_cost(), 11.0);
        assert_eq!(dict.max_word_length(), "កងកម្លាំង".len() as u32);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&build_test_blob()).unwrap();
        file.flush().unwrap();

        let dict = Dictionary::from_path(file.path()).unwrap();
        assert_eq!(dict.lookup("កង".as_bytes()), Some(2.5));
    }

    #[test]
    fn test_read() {
        let blob = build_test_blob();
        let dict = Dictionary::read(blob.as_slice()).unwrap();
        assert_eq!(dict.num_entries(), 3);
    }

    #[test]
    fn test_reject_bad_magic() {
        let mut blob = build_test_blob();
        blob[0] = b'X';
        assert!(Dictionary::from_bytes(blob).is_err());
    }

    #[test]
    fn test_reject_bad_version() {
        let mut blob = build_test_blob();
        blob[4] = 9;
        assert!(Dictionary::from_bytes(blob).is_err());
    }

    #[test]
    fn test_reject_non_power_of_two_table() {
        let mut blob = build_test_blob();
        blob[12..16].copy_from_slice(&3u32.to_le_bytes());
        assert!(Dictionary::from_bytes(blob).is_err());
    }

    #[test]
    fn test_reject_truncated() {
        let blob = build_test_blob();
        assert!(Dictionary::from_bytes(blob[..16].to_vec()).is_err());
        assert!(Dictionary::from_bytes(blob[..HEADER_LEN + 4].to_vec()).is_err());
    }

    #[test]
    fn test_reject_unterminated_pool() {
        let mut blob = build_test_blob();
        let last = blob.len() - 1;
        blob[last] = b'x';
        assert!(Dictionary::from_bytes(blob).is_err());
    }

    #[test]
    fn test_djb2() {
        // h0 = 5381; h(n+1) = h(n) * 33 + byte
        assert_eq!(djb2(b""), 5381);
        assert_eq!(djb2(b"a"), 5381u32.wrapping_mul(33) + u32::from(b'a'));
    }
}
