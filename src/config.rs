use crate::error::{RosterError, Result};
use roster_cal_common::holiday::{normalize_rgb, DEFAULT_HOLIDAY_FILL};
use roster_cal_common::{AbbreviationTable, ConversionOptions, HolidayPolicy, SpreadsheetLayout};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub holiday_policy: HolidayPolicy,
    pub holiday_fill_colors: Vec<String>,
    pub layout: SpreadsheetLayout,
    pub abbreviations: AbbreviationTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            holiday_policy: HolidayPolicy::default(),
            holiday_fill_colors: vec![DEFAULT_HOLIDAY_FILL.to_string()],
            layout: SpreadsheetLayout::default(),
            abbreviations: AbbreviationTable::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RosterError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("roster-cal").join("config.json"))
    }

    /// 假日の塗りつぶし色を追加（RRGGBB / AARRGGBB / #RRGGBB）
    pub fn add_holiday_fill(&mut self, color: &str) -> Result<()> {
        let rgb = normalize_rgb(color)
            .ok_or_else(|| RosterError::Config(format!("不正な色コード: {}", color)))?;
        if !self.holiday_fill_colors.iter().any(|c| normalize_rgb(c).as_deref() == Some(rgb.as_str())) {
            self.holiday_fill_colors.push(rgb);
        }
        Ok(())
    }

    pub fn reset_holiday_fills(&mut self) {
        self.holiday_fill_colors = vec![DEFAULT_HOLIDAY_FILL.to_string()];
    }

    /// 変換オプションを作成（縮寫表ファイルの指定があれば差し替え）
    pub fn conversion_options(&self, abbreviations: Option<AbbreviationTable>) -> ConversionOptions {
        ConversionOptions {
            layout: self.layout.clone(),
            abbreviations: abbreviations.unwrap_or_else(|| self.abbreviations.clone()),
            holiday_policy: self.holiday_policy,
            holiday_fills: self.holiday_fill_colors.clone(),
            ..Default::default()
        }
    }
}

/// 縮寫表JSONファイルを読み込み
pub fn load_abbreviations(path: &Path) -> Result<AbbreviationTable> {
    if !path.exists() {
        return Err(RosterError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(AbbreviationTable::from_json(&content)?)
}
