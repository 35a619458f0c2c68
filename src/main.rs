use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use matchflag::{check_file, cli, config, error, export, match_files, naming, report, scanner};
use matchflag_common::checker::{CheckOutcome, CheckReport, CheckerKind};
use rayon::prelude::*;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use std::path::PathBuf;

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_target(false)
        .init();
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let style = ProgressStyle::with_template("  {bar:30} {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Check { inputs, output, only, no_export } => {
            println!("🔎 matchflag - 참조 정합성 검사\n");

            // 1. 파일 탐색
            println!("[1/3] 엑셀 파일 탐색 중...");
            let files = scanner::collect_inputs(&inputs)?;
            println!("✔ {}개 파일\n", files.len());

            // 2. 검사
            let kinds: Vec<CheckerKind> = if only.is_empty() {
                CheckerKind::ALL.to_vec()
            } else {
                only
            };
            let check_config = config.check_config();

            println!("[2/3] 검사 중... ({})", kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(","));
            let pb = progress_bar(files.len());
            let results: Vec<(PathBuf, Result<Vec<CheckOutcome>>)> = files
                .par_iter()
                .map(|path| {
                    let result = check_file(path, &kinds, &check_config);
                    pb.set_message(naming::source_tail(path));
                    pb.inc(1);
                    (path.clone(), result)
                })
                .collect();
            pb.finish_and_clear();
            println!("✔ 검사 완료\n");

            // 3. 요약·저장
            println!("[3/3] 결과 정리 중...");
            let output_root = output
                .or_else(|| config.output_dir.clone())
                .unwrap_or_else(|| PathBuf::from("."));
            let mut failed_files = 0usize;

            for (path, result) in results {
                println!("\n■ {}", path.display());
                let outcomes = match result {
                    Ok(outcomes) => outcomes,
                    Err(e) => {
                        failed_files += 1;
                        println!("  ✖ {}", e);
                        continue;
                    }
                };

                for line in report::summary_lines(&outcomes) {
                    println!("  {}", line);
                }

                let reports: Vec<CheckReport> = outcomes.into_iter().filter_map(|o| o.result.ok()).collect();
                let details = report::mismatch_lines(&reports, report::MISMATCH_DETAIL_LIMIT);
                if !details.is_empty() {
                    println!("  불일치 상세:");
                    for line in details {
                        println!("    {}", line);
                    }
                }

                if !no_export {
                    let written = export::export_check_reports(&reports, &path, &output_root)?;
                    if let Some(first) = written.first() {
                        let dir = first.parent().map(|p| p.display().to_string()).unwrap_or_default();
                        println!("  ✔ 결과 {}개 저장: {}", written.len(), dir);
                    }
                }
            }

            if failed_files > 0 {
                println!("\n⚠ {}개 파일을 읽지 못했습니다", failed_files);
            }
            println!("\n✅ 검사 완료");
        }

        Commands::Match { left, right, output, threshold } => {
            println!("🔗 matchflag - 단가대비표 매칭\n");

            let mut options = config.match_options();
            if let Some(t) = threshold {
                options.threshold = t;
            }

            println!("[1/2] 매칭 중... (기준 {}%)", options.threshold);
            let records = match_files(&left, &right, &options)?;
            println!("✔ {}건 매칭\n", records.len());

            println!("[2/2] 결과 저장 중...");
            let (left_label, right_label) = naming::match_labels(&left, &right);
            let output = output.unwrap_or_else(|| naming::default_match_output(&left, &right));
            let saved = export::export_matches(&records, &left_label, &right_label, &output)?;
            println!("✔ 저장 완료: {}", saved.display());

            println!("\n✅ 매칭 완료");
        }

        Commands::Config { show, init } => {
            if init {
                Config::default().save_to(&config_path)?;
                println!("✔ 기본 설정을 저장했습니다: {}", config_path.display());
            }

            if show || !init {
                println!("설정 ({}):", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}
