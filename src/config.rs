use crate::error::{MatchflagError, Result};
use matchflag_common::{CheckConfig, LabelAliases, MatchOptions, ScanWindow, SubtotalRule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub header_scan_rows: u32,
    pub header_scan_cols: u32,
    /// 공종별집계표 헤더 탐색 행 수
    pub summary_scan_rows: u32,
    /// 단가대비표 매칭용 헤더 탐색 행 수
    pub match_scan_rows: u32,
    pub match_threshold: f64,
    /// 기본 별칭에 더할 라벨 별칭 (라벨 → 다른 표기들)
    pub label_aliases: LabelAliases,
    /// 합계행 판정 토큰 (비우면 기본값)
    pub subtotal_tokens: Vec<String>,
    pub output_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let window = ScanWindow::default();
        Self {
            header_scan_rows: window.rows,
            header_scan_cols: window.cols,
            summary_scan_rows: ScanWindow::summary().rows,
            match_scan_rows: 10,
            match_threshold: 30.0,
            label_aliases: LabelAliases::default(),
            subtotal_tokens: Vec::new(),
            output_dir: None,
        }
    }
}

impl Config {
    /// 파일이 없으면 기본값
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| MatchflagError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("matchflag").join("config.json"))
    }

    fn validate(&self) -> Result<()> {
        let rows = [self.header_scan_rows, self.summary_scan_rows, self.match_scan_rows];
        if self.header_scan_cols == 0 || rows.contains(&0) {
            return Err(MatchflagError::Config("탐색 범위는 1 이상이어야 합니다".into()));
        }
        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(MatchflagError::Config(format!(
                "매칭 기준은 0~100이어야 합니다: {}",
                self.match_threshold
            )));
        }
        Ok(())
    }

    fn aliases(&self) -> LabelAliases {
        let mut aliases = LabelAliases::builtin();
        aliases.merge(&self.label_aliases);
        aliases
    }

    /// 검사 엔진 설정
    pub fn check_config(&self) -> CheckConfig {
        let mut subtotal = SubtotalRule::default();
        if !self.subtotal_tokens.is_empty() {
            subtotal.tokens = self.subtotal_tokens.clone();
        }
        CheckConfig {
            aliases: self.aliases(),
            header_window: ScanWindow {
                rows: self.header_scan_rows,
                cols: self.header_scan_cols,
            },
            summary_window: ScanWindow {
                rows: self.summary_scan_rows,
                cols: self.header_scan_cols,
            },
            subtotal,
        }
    }

    /// 매칭 옵션
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            threshold: self.match_threshold,
            header_window: ScanWindow {
                rows: self.match_scan_rows,
                cols: self.header_scan_cols,
            },
            aliases: self.aliases(),
        }
    }
}
