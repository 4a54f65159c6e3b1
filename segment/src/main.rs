//! 分かち書きを実行するユーティリティ
//!
//! このバイナリは、焼き込み済み辞書を読み込み、標準入力から読み込んだ
//! テキストを1行ずつ分割して標準出力へ書き出します。入力ファイルを
//! 指定した場合は、行順を保ったまま全行を並列に処理します。

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rayon::prelude::*;

use khmer_segmenter::{Dictionary, Segmenter, SegmenterConfig, DEFAULT_SEPARATOR};

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "segment", about = "Segments Khmer text into words")]
struct Args {
    /// Baked dictionary (.kdict).
    #[clap(short = 'i', long)]
    dict: PathBuf,

    /// Input file processed in parallel. Reads stdin line by line when omitted.
    #[clap(short = 'f', long)]
    input: Option<PathBuf>,

    /// Output file. Writes to stdout when omitted.
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    /// Separator inserted between tokens. Defaults to U+200B.
    #[clap(short = 's', long)]
    separator: Option<String>,

    /// Disables input normalization.
    #[clap(long)]
    no_normalization: bool,

    /// Disables repair transitions for malformed input.
    #[clap(long)]
    no_repair: bool,

    /// Disables acronym detection.
    #[clap(long)]
    no_acronyms: bool,

    /// Disables merging of adjacent unknown segments.
    #[clap(long)]
    no_unknown_merging: bool,

    /// Scores every dictionary match with the default cost.
    #[clap(long)]
    uniform_costs: bool,
}

/// メイン関数
///
/// 辞書をロードし、入力を分割して指定された出力先へ書き出します。
///
/// # 戻り値
///
/// 実行が成功した場合は`Ok(())`、エラーが発生した場合はエラー情報
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let start_load = Instant::now();
    let dict = Dictionary::from_path(&args.dict)?;
    eprintln!(
        "Loaded {} words in {:.2}s",
        dict.num_entries(),
        start_load.elapsed().as_secs_f32()
    );

    let config = SegmenterConfig {
        enable_normalization: !args.no_normalization,
        enable_repair_mode: !args.no_repair,
        enable_acronym_detection: !args.no_acronyms,
        enable_unknown_merging: !args.no_unknown_merging,
        enable_frequency_costs: !args.uniform_costs,
    };
    let segmenter = Segmenter::new(dict).config(config);
    let separator = args.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);

    let mut out: BufWriter<Box<dyn Write>> = BufWriter::new(match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    });

    match &args.input {
        Some(path) => {
            let lines: Vec<String> = BufReader::new(File::open(path)?)
                .lines()
                .collect::<io::Result<_>>()?;
            eprintln!("Processing {} lines...", lines.len());

            let start_process = Instant::now();
            // Collecting into a Vec keeps the output in input order and the
            // I/O out of the parallel section.
            let results: Vec<String> = lines
                .par_iter()
                .map_init(
                    || segmenter.new_worker(),
                    |worker, line| {
                        worker.reset_sentence(line);
                        worker.segment();
                        worker.join(separator)
                    },
                )
                .collect();
            let duration = start_process.elapsed();

            for result in &results {
                out.write_all(result.as_bytes())?;
                out.write_all(b"\n")?;
            }
            out.flush()?;

            eprintln!(
                "Done in {:.2}s ({:.2} lines/sec)",
                duration.as_secs_f32(),
                lines.len() as f32 / duration.as_secs_f32()
            );
        }
        None => {
            eprintln!("Ready to segment");
            let mut worker = segmenter.new_worker();
            for line in io::stdin().lock().lines() {
                let line = line?;
                worker.reset_sentence(&line);
                worker.segment();
                out.write_all(worker.join(separator).as_bytes())?;
                out.write_all(b"\n")?;
                out.flush()?;
            }
        }
    }

    Ok(())
}
