//! # khmer-segmenter
//!
//! クメール語テキストを言語的に意味のあるトークンへ分割する、高速で
//! 再現性のある分かち書きエンジンです。
//!
//! ## 概要
//!
//! このライブラリは、正規化済み入力のバイト列上でコスト最小化の動的計画法を
//! 実行し、焼き込み済み辞書（単一の連続バイナリブロブとしてレイアウトされた
//! オープンアドレス法ハッシュテーブル）を参照して最適な分割を求めます。
//! 探索の後には、頻度コストでは表現できない正書法の制約を符号化した
//! 決定的なルールパスが適用されます。
//!
//! ## 主な機能
//!
//! - **コスト最小化探索**: バイト位置ごとに5種類の遷移（数値グループ、
//!   区切り文字、頭字語、辞書一致、未知クラスタ）を評価
//! - **ゼロコピー辞書**: メモリマップしたブロブへの直接アクセスと
//!   インクリメンタルハッシュによる照合
//! - **クラスタ正規化**: 表示順の入力を格納順へ並べ替え、辞書照合を
//!   バイト等価比較に還元
//! - **完全な決定性**: 同一の（辞書・設定・入力）の組は常に同一の
//!   出力バイト列を生成
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use khmer_segmenter::dictionary::builder::DictionaryBuilder;
//! use khmer_segmenter::{Dictionary, Segmenter};
//!
//! let mut builder = DictionaryBuilder::new(6.0, 11.0);
//! builder.insert("កងកម្លាំង", 2.0);
//! builder.insert("រក្សា", 2.5);
//!
//! let dict = Dictionary::from_bytes(builder.build())?;
//! let segmenter = Segmenter::new(dict);
//!
//! assert_eq!(
//!     segmenter.segment("កងកម្លាំងរក្សា", "|"),
//!     "កងកម្លាំង|រក្សា",
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## 並行性
//!
//! 読み込み後の辞書は不変であり、[`Segmenter`]は呼び出し間で可変状態を
//! 持ちません。エンジンを複製して複数スレッドへ渡し、同一辞書上で並行に
//! 分割を実行できます。ホットパスでは[`Segmenter::new_worker`]で作成した
//! ワーカーをスレッドごとに再利用してください。

/// クメール文字の分類と走査
pub mod character;

/// 焼き込み済み辞書の読み込み、検証、構築
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// クラスタ並べ替えによる正規化
pub mod normalizer;

/// ルールベースの後処理
pub mod rules;

/// 分かち書きエンジン本体
pub mod segmenter;

/// 内部ユーティリティ関数
pub mod utils;


// Re-exports
pub use dictionary::Dictionary;
pub use normalizer::normalize;
pub use segmenter::worker::Worker;
pub use segmenter::{Segmenter, SegmenterConfig, DEFAULT_SEPARATOR};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
