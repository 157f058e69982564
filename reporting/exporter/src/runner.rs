//! 完整分析流程.

use std::path::PathBuf;

use ept_berry::prelude::*;
use log::{error, info};
use utils::loader;

use crate::export;

/// 运行配置.
pub struct RunArgs {
    /// I/O 所在的工作目录.
    pub working_dir: PathBuf,

    /// 重建结果归档名, 不含扩展名.
    pub input_stem: String,

    /// 数据集名, 决定参考数据目录.
    pub dataset_name: String,
}

/// 从进程参数解析运行配置.
///
/// 用法: `exporter <input_stem> <dataset_name> [working_dir]`.
/// 省略 `working_dir` 时由 `$EPT_WORKING_DIR` 或当前目录决定.
pub fn parse_args() -> Option<RunArgs> {
    let mut args = std::env::args().skip(1);
    let input_stem = args.next()?;
    let dataset_name = args.next()?;
    let working_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(loader::working_dir_from_env_or_cwd);

    Some(RunArgs {
        working_dir,
        input_stem,
        dataset_name,
    })
}

/// 实际运行: 加载重建结果与参考数据, 对每个存在的物理量执行分段
/// 分析与全图评估, 打印结果表并导出 CSV/JSON/对比图.
///
/// 单个物理量的失败 (如形状不一致) 只跳过该物理量, 不影响其余分析.
pub fn run(args: &RunArgs) {
    let results = loader::open_results(&args.working_dir, &args.input_stem)
        .unwrap_or_else(|e| panic!("打开重建结果失败: {e:?}"));
    let reference = loader::open_reference_by_name(&args.dataset_name)
        .unwrap_or_else(|e| panic!("打开参考数据失败: {e:?}"));

    let quantities = results.quantities();
    if quantities.is_empty() {
        // 显式报告 "无可分析数据", 而不是静默成功.
        error!("--- No results available for the analysis! ---");
        error!("--- The input archive must hold a `cond` and/or `perm` member! ---");
        std::process::exit(2);
    }

    let config = AnalysisConfig::default();
    for quantity in quantities {
        let map = results.get(quantity).unwrap();
        if map.shape() != reference.segmentation().shape() {
            error!(
                "{} 重建图形状 {:?} 与分段标注 {:?} 不一致, 跳过该物理量",
                quantity.key(),
                map.shape(),
                reference.segmentation().shape()
            );
            continue;
        }

        let tables = par_perform_analysis(map, &reference, quantity, &config);

        println!("\n--- Analysis Results for {} ---", quantity.key().to_uppercase());
        for table in &tables {
            println!("\nTissue: {}\n", table.tissue);
            println!("{table}");
        }

        let global = evaluate_global_metrics(map, &reference, quantity);
        info!(
            "{}: Global NRMSE: {:.2} % - 99-th NRMSE: {:.2} %",
            quantity.title(),
            global.nrmse * 100.0,
            global.nrmse_best99 * 100.0
        );

        export::write_csv_tables(&args.working_dir, &args.input_stem, quantity, &tables)
            .unwrap_or_else(|e| panic!("导出 CSV 失败: {e:?}"));
        export::write_global_json(&args.working_dir, &args.input_stem, quantity, &global)
            .unwrap_or_else(|e| panic!("导出全图评分失败: {e:?}"));
        export::save_figure(&args.working_dir, &args.input_stem, quantity, map, &reference)
            .unwrap_or_else(|e| panic!("导出对比图失败: {e:?}"));

        utils::sep();
    }
}
