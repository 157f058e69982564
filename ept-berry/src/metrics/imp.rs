//! 估计量的泛型实现.
//!
//! 非有限值的处理规则因估计量而异, 必须逐个保持:
//! `mean`/`std`/`median` 在归约时直接忽略非有限值; `iqr` 不忽略
//! (样本含 NaN 时结果为 NaN); `rmse` 先显式过滤再计算.
//! 不要把这些统一成一趟公共过滤.

use num::Float;

/// 算术平均值, 忽略非有限值.
///
/// 样本为空或不含有限值时返回 NaN.
pub(super) fn nan_mean<T: Float>(x: &[T]) -> T {
    let mut sum = T::zero();
    let mut n = 0usize;
    for &v in x.iter().filter(|v| v.is_finite()) {
        sum = sum + v;
        n += 1;
    }
    match n {
        0 => T::nan(),
        // usize -> T 不会失败, 可直接 unwrap.
        n => sum / T::from(n).unwrap(),
    }
}

/// 样本标准差 (无偏方差, 除数 n - 1), 忽略非有限值.
///
/// 有限值不足 2 个时返回 NaN.
pub(super) fn nan_std<T: Float>(x: &[T]) -> T {
    let finite: Vec<T> = x.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.len() < 2 {
        return T::nan();
    }

    let n = T::from(finite.len()).unwrap();
    let mean = finite.iter().fold(T::zero(), |acc, &v| acc + v) / n;
    let ss = finite
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - mean) * (v - mean));
    (ss / (n - T::one())).sqrt()
}

/// 中位数, 忽略非有限值.
///
/// 样本为空或不含有限值时返回 NaN.
pub(super) fn nan_median<T: Float>(x: &[T]) -> T {
    let mut finite: Vec<T> = x.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return T::nan();
    }

    // 全部有限, partial_cmp 不会失败.
    finite.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());
    let n = finite.len();
    let two = T::one() + T::one();
    match n % 2 {
        1 => finite[n / 2],
        _ => (finite[n / 2 - 1] + finite[n / 2]) / two,
    }
}

/// Hazen 规则分位数.
///
/// 第 i 个次序统计量 (1-based) 的概率位置为 `(i - 0.5) / n`,
/// 两个次序统计量之间线性插值, 概率落在首尾位置之外时取端点.
/// `sorted` 必须非空且升序.
fn hazen_quantile<T: Float>(sorted: &[T], q: T) -> T {
    debug_assert!(!sorted.is_empty());

    let n = T::from(sorted.len()).unwrap();
    let half = T::from(0.5).unwrap();
    // 1-based 连续位置.
    let h = q * n + half;

    if h <= T::one() {
        return sorted[0];
    }
    if h >= n {
        return sorted[sorted.len() - 1];
    }

    let lo = h.floor();
    let frac = h - lo;
    // lo 落在 [1, n - 1] 内, 转换为 0-based 后索引合法.
    let i = lo.to_usize().unwrap() - 1;
    sorted[i] + frac * (sorted[i + 1] - sorted[i])
}

/// 四分位距: p75 - p25, 按 Hazen 规则插值.
///
/// 样本为空时返回 NaN; 样本含 NaN 时结果为 NaN (与 `mean` 等不同,
/// 此估计量不忽略缺失值).
pub(super) fn iqr<T: Float>(x: &[T]) -> T {
    if x.is_empty() || x.iter().any(|v| v.is_nan()) {
        return T::nan();
    }

    let mut sorted = x.to_vec();
    // 无 NaN, partial_cmp 不会失败.
    sorted.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap());

    let p75 = hazen_quantile(&sorted, T::from(0.75).unwrap());
    let p25 = hazen_quantile(&sorted, T::from(0.25).unwrap());
    p75 - p25
}

/// 相对参考值的均方根误差, 先过滤非有限值.
///
/// 样本为空或不含有限值时返回 NaN.
pub(super) fn rmse<T: Float>(x: &[T], x_ref: T) -> T {
    let mut ss = T::zero();
    let mut n = 0usize;
    for &v in x.iter().filter(|v| v.is_finite()) {
        ss = ss + (v - x_ref) * (v - x_ref);
        n += 1;
    }
    match n {
        0 => T::nan(),
        n => (ss / T::from(n).unwrap()).sqrt(),
    }
}

/// 归一化均方根误差: `rmse / x_ref`.
///
/// 参考值为 0 时, 按 IEEE 规则得到无穷或 NaN, 原样返回.
pub(super) fn nrmse<T: Float>(x: &[T], x_ref: T) -> T {
    rmse(x, x_ref) / x_ref
}
