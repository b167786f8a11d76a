// ==========================================
// 节点折扣结算引擎 - 命令行入口
// ==========================================
// 用法:
//   settlement-engine <目录> <销售台账> <终端销售台账> <价格表>
//                     <SI/SO> <节点> <折扣类型> <年> <月> [配置.json]
// 输出: 结算结果 JSON (stdout); 日志写 stderr
// ==========================================

use anyhow::{bail, Context};
use settlement_engine::config::EngineConfig;
use settlement_engine::domain::{DiscountType, Liquidation, SettlementOutcome, SettlementRequest};
use settlement_engine::engine::SettlementEngine;
use settlement_engine::importer::SnapshotLoader;
use settlement_engine::logging;

const USAGE: &str = "用法: settlement-engine <目录> <销售台账> <终端销售台账> <价格表> \
<SI/SO> <节点> <折扣类型> <年> <月> [配置.json]";

fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 9 {
        bail!("参数不足\n{}", USAGE);
    }

    let config = match args.get(9) {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("加载配置失败: {}", path))?,
        None => EngineConfig::default(),
    };

    let liquidation = Liquidation::from_label(&args[4])
        .with_context(|| format!("无法识别结算方向: {}", args[4]))?;
    let discount_type = DiscountType::from_label(&args[6]);
    let year: i32 = args[7]
        .parse()
        .with_context(|| format!("年份无效: {}", args[7]))?;
    let month: u32 = args[8]
        .parse()
        .with_context(|| format!("月份无效: {}", args[8]))?;
    let request = SettlementRequest::new(liquidation, args[5].clone(), discount_type, year, month);

    tracing::info!(version = settlement_engine::VERSION, "{}", settlement_engine::APP_NAME);

    let loader = SnapshotLoader::new(&config);
    let snapshot = loader
        .load_snapshot(&args[0], &args[1], &args[2], &args[3])
        .context("加载输入快照失败")?;

    let engine = SettlementEngine::new(config);
    match engine.run(&snapshot, &request)? {
        SettlementOutcome::Generated(output) => {
            let rendered = serde_json::to_string_pretty(&output.to_tables())?;
            println!("{}", rendered);
        }
        SettlementOutcome::Empty(reason) => {
            println!("{}", reason);
        }
    }

    Ok(())
}
