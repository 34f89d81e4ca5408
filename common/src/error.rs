//! エラー型定義

use thiserror::Error;

/// 変換エンジン共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("タイトルから年月を取得できません（例: 113年4月班表）: {0}")]
    TitleFormat(String),

    #[error("班表代號が空です")]
    EmptyStaffCode,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
