//! 全图误差评估.

use itertools::izip;
use log::debug;
use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::consts::label::is_segment;
use crate::consts::Quantity;
use crate::data::{DatasetReference, PropertyMap};

/// 全图归一化误差结果.
#[derive(Copy, Clone, Debug, Serialize)]
pub struct GlobalError {
    /// 全部有效体素上的归一化 L2 误差.
    pub nrmse: f64,

    /// 剔除误差最大的约 1% 体素后的归一化 L2 误差.
    ///
    /// 剔除阈值取自 **当前** 误差分布的第 99 百分位, 因此这是一个
    /// 相对的稳健性度量, 不同重建之间不可作绝对比较.
    pub nrmse_best99: f64,
}

/// 线性插值分位数 (默认规则): 0-based 连续位置 `q * (n - 1)`,
/// 相邻次序统计量之间线性插值. `sorted` 必须非空且升序.
fn linear_percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor();
    let i = lo as usize;
    if i + 1 >= sorted.len() {
        return sorted[sorted.len() - 1];
    }
    sorted[i] + (pos - lo) * (sorted[i + 1] - sorted[i])
}

#[inline]
fn l2_norm<I: IntoIterator<Item = f64>>(values: I) -> f64 {
    values.into_iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// 评估一个物理量的全图归一化误差.
///
/// 有效体素 = 分段标注为前景 **且** 重建值有限的体素; 背景体素无论
/// 取值如何都不参与. 误差为重建值与参考图的绝对差. 总评分为误差
/// L2 范数与参考值 L2 范数之比; best-99 评分先剔除误差达到第 99
/// 百分位的体素, 再在剩余体素上求同一比值. 若没有误差严格低于阈值
/// (常量误差分布), 则退化为不剔除, 此时两个评分相等.
///
/// 参考值范数为零 (如全零参考区域) 时结果为 NaN 或无穷, 原样返回;
/// 没有任何有效体素时两个评分均为 NaN.
///
/// # 注意
///
/// 重建图与分段标注形状必须一致, 否则程序 panic.
pub fn evaluate_global_metrics(
    map: &PropertyMap,
    reference: &DatasetReference,
    quantity: Quantity,
) -> GlobalError {
    assert_eq!(
        map.shape(),
        reference.segmentation().shape(),
        "重建图与分段标注形状不一致"
    );

    let ref_map = reference.reference_map(quantity);

    // 有效性掩膜下的 (重建值, 参考值) 对, 按行优先顺序.
    let pairs: Vec<(f64, f64)> = izip!(
        map.data().iter(),
        reference.segmentation().data().iter(),
        ref_map.iter()
    )
    .filter_map(|(&x, &label, &r)| (is_segment(label) && x.is_finite()).then_some((x, r)))
    .collect();

    debug!(
        "{} 全图评估: {} 个有效体素 (共 {} 个)",
        quantity.key(),
        pairs.len(),
        map.data().len()
    );

    if pairs.is_empty() {
        return GlobalError {
            nrmse: f64::NAN,
            nrmse_best99: f64::NAN,
        };
    }

    let errors: Vec<f64> = pairs.iter().map(|(x, r)| (x - r).abs()).collect();
    let nrmse = l2_norm(errors.iter().copied()) / l2_norm(pairs.iter().map(|(_, r)| *r));

    let mut sorted = errors.clone();
    sorted.sort_unstable_by_key(|&e| OrderedFloat(e));
    let threshold = linear_percentile(&sorted, 0.99);

    let (mut err_sq, mut ref_sq, mut kept) = (0.0f64, 0.0f64, 0usize);
    for (&e, (_, r)) in errors.iter().zip(pairs.iter()) {
        if e < threshold {
            err_sq += e * e;
            ref_sq += r * r;
            kept += 1;
        }
    }

    let nrmse_best99 = if kept == 0 {
        nrmse
    } else {
        err_sq.sqrt() / ref_sq.sqrt()
    };

    GlobalError {
        nrmse,
        nrmse_best99,
    }
}
