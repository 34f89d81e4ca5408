use clap::{Args, Parser, Subcommand};
use roster_cal_common::HolidayPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster-cal")]
#[command(about = "班表Excel → 個人行事曆CSV 変換ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 班表を変換してCSVを出力
    Convert {
        #[command(flatten)]
        args: ConvertArgs,

        /// 出力CSVファイル/ディレクトリ（デフォルト: 入力ファイルと同じフォルダ）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 変換結果を表示のみ（ファイルは書き出さない）
    Preview {
        #[command(flatten)]
        args: ConvertArgs,
    },

    /// 縮寫表の編集
    Abbrev {
        /// 縮寫表を表示
        #[arg(long)]
        show: bool,

        /// 縮寫を追加・更新（原始=簡化後）
        #[arg(long, value_name = "KEY=VALUE", value_parser = parse_key_value)]
        add: Vec<(String, String)>,

        /// 縮寫を削除（原始關鍵字）
        #[arg(long, value_name = "KEY")]
        remove: Vec<String>,

        /// 既定の縮寫表に戻す
        #[arg(long)]
        reset: bool,

        /// 縮寫表をJSONファイルに書き出し
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },

    /// 設定を表示・変更
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 假日の判定方式 (fill/weekday)
        #[arg(long)]
        policy: Option<HolidayPolicy>,

        /// 假日とみなす塗りつぶし色を追加（例: D8D8D8）
        #[arg(long, value_name = "RGB")]
        add_gray: Vec<String>,

        /// 假日の塗りつぶし色を既定（D9D9D9）に戻す
        #[arg(long)]
        reset_gray: bool,
    },
}

/// convert / preview 共通の引数
#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// 班表Excelファイル（.xlsx）
    #[arg(required = true)]
    pub input: PathBuf,

    /// 班表代號（省略時は入力を求める）
    #[arg(short, long)]
    pub code: Option<String>,

    /// 縮寫表JSONファイル（省略時は設定の縮寫表）
    #[arg(short, long)]
    pub abbrev: Option<PathBuf>,

    /// 假日の判定方式 (fill/weekday)
    #[arg(short, long)]
    pub policy: Option<HolidayPolicy>,

    /// 假日とみなす塗りつぶし色（指定時は設定を上書き）
    #[arg(short, long, value_name = "RGB")]
    pub gray: Vec<String>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("KEY=VALUE 形式で指定してください: {}", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("原始關鍵字が空です: {}", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
