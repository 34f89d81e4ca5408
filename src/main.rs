use anyhow::Context;
use clap::Parser;
use roster_cal::{cli, config, error, export, prompt, reader};
use roster_cal_common::{convert, AbbreviationTable, Conversion, HolidayPolicy};
use cli::{Cli, Commands, ConvertArgs};
use config::Config;
use error::RosterError;

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run_conversion(config: &Config, args: &ConvertArgs, total_steps: u8) -> anyhow::Result<Conversion> {
    let abbreviations = args
        .abbrev
        .as_deref()
        .map(config::load_abbreviations)
        .transpose()
        .context("縮寫表の読み込みに失敗しました")?;

    let mut options = config.conversion_options(abbreviations);
    if let Some(policy) = args.policy {
        options.holiday_policy = policy;
    }
    if !args.gray.is_empty() {
        options.holiday_fills = args.gray.clone();
    }

    let staff_code = prompt::resolve_staff_code(args.code.clone())?;

    // 1. 読み込み
    println!("[1/{}] 班表を読み込み中...", total_steps);
    let sheet = reader::load_roster(&args.input)
        .with_context(|| format!("班表を読み込めません: {}", args.input.display()))?;
    println!("✔ {}行を読み込み\n", sheet.row_count());

    // 2. 変換
    println!("[2/{}] 代號「{}」を検索中...", total_steps, staff_code);
    let conversion = convert(&sheet, &staff_code, &options).map_err(RosterError::from)?;
    println!(
        "✔ {}年{}月: {}件（追加 {}件, 時刻なし {}件）",
        conversion.title.era_year(),
        conversion.title.month,
        conversion.records.len(),
        conversion.derived_count(),
        conversion.untimed_count()
    );
    if conversion.holiday_policy == HolidayPolicy::FillColor {
        let holidays: Vec<String> = conversion.holidays.holiday_columns().map(|c| c.to_string()).collect();
        println!("  假日列: {}", if holidays.is_empty() { "なし".to_string() } else { holidays.join(", ") });
    } else {
        println!("  假日判定: 星期（六・日）");
    }
    println!();

    Ok(conversion)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Convert { args, output } => {
            println!("📅 roster-cal - 班表変換\n");

            let conversion = run_conversion(&config, &args, 4)?;

            println!("[3/4] 変換結果");
            if conversion.is_empty() {
                println!("⚠ {}", RosterError::EmptyResult(conversion.staff_code.clone()));
                return Ok(());
            }
            export::print_preview(&conversion);
            println!();

            println!("[4/4] CSVを出力中...");
            export::export_conversion(&conversion, output.as_deref(), &args.input)?;

            println!("\n✅ 変換完了");
        }

        Commands::Preview { args } => {
            println!("📅 roster-cal - プレビュー\n");

            let conversion = run_conversion(&config, &args, 2)?;
            if conversion.is_empty() {
                println!("⚠ {}", RosterError::EmptyResult(conversion.staff_code.clone()));
                return Ok(());
            }
            export::print_preview(&conversion);
            println!("\n出力予定ファイル名: {}", conversion.file_name());
        }

        Commands::Abbrev { show, add, remove, reset, export } => {
            let mut config = config;
            let mut changed = false;

            if reset {
                config.abbreviations = AbbreviationTable::default();
                println!("✔ 縮寫表を既定に戻しました");
                changed = true;
            }

            for (keyword, replacement) in add {
                println!("✔ 縮寫を設定: {} → {}", keyword, replacement);
                config.abbreviations.upsert(keyword, replacement);
                changed = true;
            }

            for keyword in remove {
                if config.abbreviations.remove(&keyword) {
                    println!("✔ 縮寫を削除: {}", keyword);
                    changed = true;
                } else {
                    println!("縮寫が見つかりません: {}", keyword);
                }
            }

            if changed {
                config.save()?;
            }

            if let Some(path) = export {
                std::fs::write(&path, config.abbreviations.to_json().map_err(RosterError::from)?)
                    .with_context(|| format!("書き出しに失敗しました: {}", path.display()))?;
                println!("✔ 縮寫表を書き出し: {}", path.display());
            }

            if show || !changed {
                println!("縮寫表（上から順に適用）:");
                for (i, rule) in config.abbreviations.rules().iter().enumerate() {
                    println!(
                        "  {:>2}. {} → {}",
                        i + 1,
                        rule.keyword.as_deref().unwrap_or("(空)"),
                        rule.replacement.as_deref().unwrap_or("(空)")
                    );
                }
            }
        }

        Commands::Config { show, policy, add_gray, reset_gray } => {
            let mut config = config;
            let mut changed = false;

            if let Some(policy) = policy {
                config.holiday_policy = policy;
                println!("✔ 假日の判定方式: {}", policy);
                changed = true;
            }

            if reset_gray {
                config.reset_holiday_fills();
                println!("✔ 假日の塗りつぶし色を既定に戻しました");
                changed = true;
            }

            for color in add_gray {
                config.add_holiday_fill(&color)?;
                println!("✔ 假日の塗りつぶし色を追加: {}", color);
                changed = true;
            }

            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!("  假日の判定方式: {}", config.holiday_policy);
                println!("  假日の塗りつぶし色: {}", config.holiday_fill_colors.join(", "));
                println!("  縮寫: {}件", config.abbreviations.len());
                println!(
                    "  レイアウト: タイトル R{}C{} / 日付行 {} / 星期行 {} / データ開始行 {}",
                    config.layout.title_row,
                    config.layout.title_column,
                    config.layout.day_row,
                    config.layout.weekday_row,
                    config.layout.first_data_row
                );
            }
        }
    }

    Ok(())
}
