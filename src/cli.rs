use clap::{Parser, Subcommand};
use matchflag_common::CheckerKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "matchflag")]
#[command(about = "내역서 참조 정합성 검사·단가대비표 매칭 도구", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 상세 로그 출력
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 설정 파일 (기본: ~/.config/matchflag/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 워크북 참조 정합성 검사 (A~E)
    Check {
        /// 엑셀 파일 또는 폴더 (여러 개 가능)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 결과 폴더 (기본: 설정값, 없으면 현재 폴더)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 실행할 검사만 (예: A,C)
        #[arg(long, value_delimiter = ',')]
        only: Vec<CheckerKind>,

        /// 결과 파일을 쓰지 않고 요약만 출력
        #[arg(long)]
        no_export: bool,
    },

    /// 두 내역서의 단가대비표 품목 매칭
    Match {
        /// 왼쪽 엑셀 파일
        #[arg(required = true)]
        left: PathBuf,

        /// 오른쪽 엑셀 파일
        #[arg(required = true)]
        right: PathBuf,

        /// 출력 파일 (기본: 단가대비표매칭결과/<왼쪽>_vs_<오른쪽>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 가중 유사도 기준 (0~100)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// 설정 표시/초기화
    Config {
        /// 설정 표시
        #[arg(long)]
        show: bool,

        /// 기본 설정 파일 작성
        #[arg(long)]
        init: bool,
    },
}
