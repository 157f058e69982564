//! 分段统计分析.
//!
//! 对每个分段标签和每个配置的腐蚀级别提取样本并应用全部指标,
//! 汇总成按标签升序排列的结果表序列. 全图误差评估见 [`global`] 子模块
//! 的再导出项.

use log::debug;

use crate::consts::{Quantity, DEFAULT_EROSION_LEVELS};
use crate::data::{DatasetReference, PropertyMap, SegmentMask};
use crate::metrics::{Metric, UnknownMetricError};

mod global;
mod table;

pub use global::{evaluate_global_metrics, GlobalError};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 分析配置: 指标集合与腐蚀级别序列.
///
/// 配置显式传入分析入口, 而不是作为模块级全局量存在; 同一核心因此
/// 可以在不同的指标集或腐蚀方案下复用, 无需修改任何全局状态.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// 报表列指标, 按列顺序排列.
    pub metrics: Vec<Metric>,

    /// 腐蚀级别序列 (体素半径), 应当按升序排列.
    pub erosion_levels: Vec<usize>,
}

impl AnalysisConfig {
    /// 按指标注册名构建配置.
    ///
    /// 任何一个未注册的名字都会使构建立即失败, 不会被悄悄跳过.
    pub fn from_names<'a, I>(
        names: I,
        erosion_levels: Vec<usize>,
    ) -> Result<Self, UnknownMetricError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let metrics = names
            .into_iter()
            .map(Metric::from_name)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            metrics,
            erosion_levels,
        })
    }
}

impl Default for AnalysisConfig {
    /// 默认配置: 全部指标, 腐蚀级别 `[0, 2, 4]`.
    fn default() -> Self {
        Self {
            metrics: Metric::ALL.to_vec(),
            erosion_levels: DEFAULT_EROSION_LEVELS.to_vec(),
        }
    }
}

/// 结果表中的一行: 一个腐蚀级别下全部指标的取值.
///
/// `values` 的顺序与配置的指标列顺序一致. 样本不足导致的无定义
/// 结果以 NaN 形式保留在行内.
#[derive(Debug, Clone)]
pub struct TableRow {
    /// 腐蚀级别 (体素半径).
    pub erosion_level: usize,

    /// 各指标取值, 按配置列顺序.
    pub values: Vec<f64>,
}

/// 单个分段、单个物理量的分析结果表.
///
/// 行按腐蚀级别升序排列 (与配置顺序一致).
#[derive(Debug, Clone)]
pub struct SegmentTable {
    /// 分段的展示名称.
    pub tissue: String,

    /// 分段标签.
    pub label: u8,

    /// 列指标序列.
    pub metrics: Vec<Metric>,

    /// 数据行, 每个腐蚀级别一行.
    pub rows: Vec<TableRow>,
}

/// 提取 (可能腐蚀过的) 分段样本.
///
/// 腐蚀级别为 0 时直接使用原掩膜; 否则先以该半径做球形腐蚀.
/// 返回重建图在掩膜真位置上的值, 按行优先顺序. 腐蚀级别超过分段
/// 自身尺度时样本可以为空.
pub fn eroded_segment_values(
    map: &PropertyMap,
    mask: &SegmentMask,
    erosion_level: usize,
) -> Vec<f64> {
    if erosion_level > 0 {
        map.values_under(&mask.erode(erosion_level))
    } else {
        map.values_under(mask)
    }
}

/// 构建单个分段的结果表.
fn segment_table(
    map: &PropertyMap,
    reference: &DatasetReference,
    quantity: Quantity,
    config: &AnalysisConfig,
    label: u8,
) -> SegmentTable {
    let mask = reference.segmentation().mask(label);
    let x_ref = reference.refs(quantity)[label as usize - 1];
    let tissue = reference.tissue_names()[label as usize - 1].clone();

    let rows = config
        .erosion_levels
        .iter()
        .map(|&level| {
            let x = eroded_segment_values(map, &mask, level);
            debug!("{} `{tissue}` 腐蚀 {level}: {} 个样本", quantity.key(), x.len());
            TableRow {
                erosion_level: level,
                values: config.metrics.iter().map(|m| m.eval(&x, x_ref)).collect(),
            }
        })
        .collect();

    SegmentTable {
        tissue,
        label,
        metrics: config.metrics.clone(),
        rows,
    }
}

/// 对一个物理量执行完整的分段分析.
///
/// 对每个分段标签 1..=L (L 为标注中的最大标签) 和每个配置腐蚀级别,
/// 提取样本并应用配置中的全部指标. 返回按标签升序排列的结果表,
/// 0-based 下标 = 标签 - 1. 单个分段/指标的无定义结果以 NaN 保留在
/// 对应单元格中, 不影响其余分段.
///
/// # 注意
///
/// 重建图与分段标注形状必须一致, 否则程序 panic.
pub fn perform_analysis(
    map: &PropertyMap,
    reference: &DatasetReference,
    quantity: Quantity,
    config: &AnalysisConfig,
) -> Vec<SegmentTable> {
    assert_eq!(
        map.shape(),
        reference.segmentation().shape(),
        "重建图与分段标注形状不一致"
    );

    let n_labels = reference.segmentation().max_label();
    debug!(
        "{} 分段分析: {n_labels} 个分段, {} 个腐蚀级别",
        quantity.key(),
        config.erosion_levels.len()
    );

    (1..=n_labels)
        .map(|label| segment_table(map, reference, quantity, config, label))
        .collect()
}

/// 借助 `rayon`, 按分段并行地执行 [`perform_analysis`].
///
/// 各分段的分析互不共享状态, 结果仍按标签升序重组, 与单线程版本
/// 完全一致.
#[cfg(feature = "rayon")]
pub fn par_perform_analysis(
    map: &PropertyMap,
    reference: &DatasetReference,
    quantity: Quantity,
    config: &AnalysisConfig,
) -> Vec<SegmentTable> {
    assert_eq!(
        map.shape(),
        reference.segmentation().shape(),
        "重建图与分段标注形状不一致"
    );

    let n_labels = reference.segmentation().max_label() as usize;
    (1..=n_labels)
        .into_par_iter()
        .map(|label| segment_table(map, reference, quantity, config, label as u8))
        .collect()
}
