use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("Excel読み込みエラー: {0}")]
    Spreadsheet(String),

    #[error("書式情報の読み込みエラー: {0}")]
    Style(String),

    #[error("{0}")]
    Conversion(#[from] roster_cal_common::Error),

    #[error("代號「{0}」の班表が見つかりません。代號が正しいか、当月に排班があるか確認してください")]
    EmptyResult(String),

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("CSV出力エラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RosterError>;
