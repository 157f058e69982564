#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供 MR-EPT (磁共振电特性断层成像) 重建结果的分段精度评估:
//! 给定重建的电导率/相对介电常数体数据、分段标注与每个分段的参考值,
//! 输出 "分段 × 腐蚀级别" 的统计结果表和全图归一化误差评分.
//!
//! # 注意
//!
//! 1. 体数据一律按 `(z, H, W)` 组织; 二维输入在加载层被提升为单层三维体.
//! 2. 分析核心是无状态的纯变换: 每次调用从调用方提供的数组出发,
//!   产生独立的输出, 不在调用之间保留任何状态.
//! 3. 数据不足导致的无定义统计值以 NaN 形式保留在结果中; 只有输入
//!   数组之间的形状矛盾等契约违背才会 panic. As what Rust promises.
//!
//! # 功能概览
//!
//! ### 评估指标库 ✅
//!
//! 封闭注册表中的六个纯估计量 (mean, std, median, iqr, rmse, nrmse),
//! 未注册名字在查找时立即报错.
//!
//! 实现位于 `ept-berry/src/metrics`.
//!
//! ### 分段提取与三维形态学腐蚀 ✅
//!
//! 球形结构元二值腐蚀, 用于剔除部分体积效应集中的分段边界层.
//!
//! 实现位于 `ept-berry/src/data/morph.rs`.
//!
//! ### 分段统计分析 ✅
//!
//! 每个分段 × 每个腐蚀级别一行, 应用全部配置指标; 支持 `rayon`
//! 并行 (feature `rayon`).
//!
//! 实现位于 `ept-berry/src/analysis`.
//!
//! ### 全图误差评估 ✅
//!
//! 有效体素上的归一化 L2 误差及其 best-99 稳健变体.
//!
//! 实现位于 `ept-berry/src/analysis/global.rs`.
//!
//! ### 参考图生成 ✅
//!
//! 将分段参考值散布成与重建图同形的参考图, 服务于全图评估与
//! 可视化对比.
//!
//! ### 可视化窗口与对比图导出 ✅
//!
//! 提供一个独立的窗口对象, 以便将物理量值转换为 8-bit 灰度值;
//! 并排渲染重建/参考切片.
//!
//! 实现位于 `ept-berry/src/data/{window.rs, save.rs}`.
//!
//! ### 数据集读写 ✅
//!
//! npz 归档格式的重建结果与参考数据, nii 格式的重建图.
//!
//! 实现位于 `ept-berry/src/dataset`.

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

mod data;

pub use data::{
    save_comparison, save_middle_slice_comparison, DatasetReference, MapWindow, PropertyMap,
    ReferenceError, SegLabel, SegmentMask,
};

pub mod analysis;
pub mod consts;
pub mod dataset;
pub mod metrics;
pub mod prelude;
