//! 焼き込み済み辞書をコンパイルするユーティリティ
//!
//! このバイナリは、1行1語のプレーンテキスト語リストと頻度ソース
//! （JSON形式の出現回数、またはレガシーのKLIBバイナリ）から、
//! 実行時に使用される焼き込み済み辞書（`.kdict`）を生成します。
//! 同じ入力からは常にビット単位で同一の辞書が生成されます。

use std::collections::BTreeMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use clap::Parser;

use khmer_segmenter::dictionary::builder::DictionaryBuilder;
use khmer_segmenter::dictionary::frequencies::CostModel;
use khmer_segmenter::dictionary::lexicon::read_word_list;

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "compiler", about = "Compiles a baked dictionary")]
struct Args {
    /// Word list, one word per line.
    #[clap(short = 'w', long)]
    words: PathBuf,

    /// Word frequency counts in JSON (word -> raw count).
    #[clap(short = 'F', long)]
    frequencies: Option<PathBuf>,

    /// Legacy binary frequency file (KLIB).
    #[clap(short = 'L', long, conflicts_with = "frequencies")]
    legacy_frequencies: Option<PathBuf>,

    /// Output dictionary path.
    #[clap(short = 'o', long, default_value = "khmer_dictionary.kdict")]
    output: PathBuf,

    /// Also exports the cost model as a legacy KLIB binary.
    #[clap(long)]
    export_legacy: Option<PathBuf>,

    /// Disables orthographic variant generation.
    #[clap(long)]
    no_variants: bool,

    /// Cost for dictionary words, used when no frequency source is given.
    #[clap(long, default_value_t = 6.0)]
    default_cost: f32,

    /// Cost for unknown clusters. Defaults to the default cost plus five.
    #[clap(long)]
    unknown_cost: Option<f32>,
}

/// メイン関数
///
/// 語リストと頻度ソースを読み込み、辞書バイナリを書き出します。
///
/// # 戻り値
///
/// 実行が成功した場合は`Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Reading the word list...");
    let words = read_word_list(BufReader::new(File::open(&args.words)?))?;
    eprintln!("Read {} words", words.len());

    let costs = if let Some(path) = &args.frequencies {
        eprintln!("Deriving costs from frequency counts...");
        // A sorted map keeps the floating-point summation order, and with it
        // the output, independent of the JSON key order.
        let counts: BTreeMap<String, f64> =
            serde_json::from_reader(BufReader::new(File::open(path)?))?;
        CostModel::from_counts(counts)
    } else if let Some(path) = &args.legacy_frequencies {
        eprintln!("Reading legacy binary frequencies...");
        CostModel::read_klib(BufReader::new(File::open(path)?))?
    } else {
        let default_cost = args.default_cost;
        CostModel::uniform(
            default_cost,
            args.unknown_cost.unwrap_or(default_cost + 5.0),
        )
    };

    let builder = DictionaryBuilder::from_word_list(&words, &costs, !args.no_variants);
    eprintln!(
        "Compiling {} entries (variants {})...",
        builder.len(),
        if args.no_variants { "off" } else { "on" },
    );

    builder.write(BufWriter::new(File::create(&args.output)?))?;
    let size = std::fs::metadata(&args.output)?.len();
    eprintln!(
        "Wrote {} ({:.2} KB)",
        args.output.display(),
        size as f64 / 1024.0
    );

    if let Some(path) = &args.export_legacy {
        costs.write_klib(BufWriter::new(File::create(path)?))?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}
