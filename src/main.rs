// ==========================================
// 买方成本分解表校验 - 命令行入口
// ==========================================
// 用法:
//   bcbd-validator --brand <name> [--config <file>] [--json] <files...>
//   bcbd-validator --list-brands [--config <file>]
//
// 报表输出到 stdout，日志输出到 stderr（RUST_LOG 控制级别，BCBD_LOG_FORMAT=json 输出 JSON 日志）
// 退出码: 0 全部通过；1 存在 INVALID / 未找到区段 / 文件失败；2 参数或品牌错误
// ==========================================

use bcbd_validator::config::{ConfigManager, ValidatorConfigReader};
use bcbd_validator::{i18n, logging, report, ValidationApi};
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE: &str = "\
usage: bcbd-validator --brand <name> [--config <file>] [--json] <files...>
       bcbd-validator --list-brands [--config <file>]";

#[derive(Debug, Default)]
struct CliArgs {
    brand: Option<String>,
    config: Option<PathBuf>,
    json: bool,
    list_brands: bool,
    files: Vec<PathBuf>,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--brand" | "-b" => {
                cli.brand = Some(args.next().ok_or("--brand 需要品牌名称")?);
            }
            "--config" | "-c" => {
                cli.config = Some(PathBuf::from(args.next().ok_or("--config 需要文件路径")?));
            }
            "--json" => cli.json = true,
            "--list-brands" => cli.list_brands = true,
            "--help" | "-h" => return Err(USAGE.to_string()),
            flag if flag.starts_with('-') => return Err(format!("未知参数: {}\n{}", flag, USAGE)),
            file => cli.files.push(PathBuf::from(file)),
        }
    }

    if !cli.list_brands && (cli.brand.is_none() || cli.files.is_empty()) {
        return Err(USAGE.to_string());
    }
    Ok(cli)
}

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var("BCBD_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        logging::init_json();
    } else {
        logging::init();
    }

    let cli = match parse_args() {
        Ok(cli) => cli,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "校验终止");
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: CliArgs) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new(),
    };
    i18n::set_locale(&config.get_locale().await?);
    let locale = i18n::current_locale();

    tracing::info!(version = bcbd_validator::VERSION, "{}", bcbd_validator::APP_NAME);
    let api = ValidationApi::from_config(&config).await?;

    if cli.list_brands {
        for brand in api.brands() {
            match brand.reason {
                Some(reason) => {
                    println!("{}\t{}\t{}", brand.name, i18n::t("brands.unavailable"), reason)
                }
                None => println!("{}\t{}", brand.name, i18n::t("brands.available")),
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    let brand = cli.brand.unwrap_or_default();
    let batch = api.validate_paths(&brand, &cli.files).await?;

    if cli.json {
        println!("{}", report::to_json(&batch)?);
    } else {
        print!("{}", report::render_text(&batch, &locale));
    }

    let passed = batch.totals.failed == 0
        && batch
            .outcomes
            .iter()
            .filter_map(|o| o.run())
            .all(|run| run.summary.passed());
    Ok(if passed { ExitCode::SUCCESS } else { ExitCode::from(1) })
}
