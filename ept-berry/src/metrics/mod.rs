//! 评估指标库.
//!
//! 提供一组固定的、具名的纯统计估计量, 作用于一维实数样本;
//! 与参考值相关的指标 (`rmse`, `nrmse`) 额外接受一个参考标量.
//!
//! 指标按注册名查找, 查找表是封闭的: 未注册的名字在查找时立即返回
//! [`UnknownMetricError`], 不会悄悄退化为 0 或 NaN.

use std::fmt;

mod imp;

/// 指标名不在注册表内.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMetricError {
    /// 未注册的指标名.
    pub name: String,
}

/// 固定的评估指标集合.
///
/// 每个变体都是确定性的纯函数: 相同输入给出相同输出, 无副作用.
/// 样本数据不足时结果为 NaN, 不会 panic (见各估计量文档).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Metric {
    /// 算术平均值, 忽略非有限值.
    Mean,

    /// 样本标准差 (无偏, 除数 n - 1), 忽略非有限值.
    Std,

    /// 中位数, 忽略非有限值.
    Median,

    /// 四分位距 (Hazen 规则插值). 样本含 NaN 时结果为 NaN.
    Iqr,

    /// 相对参考值的均方根误差, 先过滤非有限值.
    Rmse,

    /// 归一化均方根误差: `rmse / x_ref`.
    Nrmse,
}

impl Metric {
    /// 全部已注册指标, 按默认报表列顺序排列.
    pub const ALL: [Metric; 6] = [
        Metric::Mean,
        Metric::Std,
        Metric::Median,
        Metric::Iqr,
        Metric::Rmse,
        Metric::Nrmse,
    ];

    /// 指标的注册名.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Metric::Mean => "mean",
            Metric::Std => "std",
            Metric::Median => "median",
            Metric::Iqr => "iqr",
            Metric::Rmse => "rmse",
            Metric::Nrmse => "nrmse",
        }
    }

    /// 按注册名查找指标.
    ///
    /// 查找表是封闭的, 未注册的名字返回 [`UnknownMetricError`].
    pub fn from_name(name: &str) -> Result<Metric, UnknownMetricError> {
        match name {
            "mean" => Ok(Metric::Mean),
            "std" => Ok(Metric::Std),
            "median" => Ok(Metric::Median),
            "iqr" => Ok(Metric::Iqr),
            "rmse" => Ok(Metric::Rmse),
            "nrmse" => Ok(Metric::Nrmse),
            other => Err(UnknownMetricError {
                name: other.to_string(),
            }),
        }
    }

    /// 该指标是否使用参考值?
    #[inline]
    pub const fn needs_reference(&self) -> bool {
        matches!(self, Metric::Rmse | Metric::Nrmse)
    }

    /// 对样本 `x` 求值. 与参考值无关的指标会忽略 `x_ref`.
    pub fn eval(&self, x: &[f64], x_ref: f64) -> f64 {
        match self {
            Metric::Mean => imp::nan_mean(x),
            Metric::Std => imp::nan_std(x),
            Metric::Median => imp::nan_median(x),
            Metric::Iqr => imp::iqr(x),
            Metric::Rmse => imp::rmse(x, x_ref),
            Metric::Nrmse => imp::nrmse(x, x_ref),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{Metric, UnknownMetricError};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn eval(m: Metric, x: &[f64]) -> f64 {
        m.eval(x, 0.0)
    }

    /// 注册表是封闭的: 已知名字全部可查, 未知名字立即报错.
    #[test]
    fn test_metric_registry_closed() {
        for m in Metric::ALL {
            assert_eq!(Metric::from_name(m.name()), Ok(m));
        }
        assert_eq!(
            Metric::from_name("variance"),
            Err(UnknownMetricError {
                name: "variance".to_string()
            })
        );
        // 大小写敏感.
        assert!(Metric::from_name("Mean").is_err());
    }

    /// mean 与 median 对插入任意个数的非有限值不变.
    #[test]
    fn test_mean_median_ignore_non_finite() {
        let clean = [1.0, 2.0, 3.0, 4.0];
        let dirty = [
            f64::NAN,
            1.0,
            f64::INFINITY,
            2.0,
            3.0,
            f64::NEG_INFINITY,
            4.0,
            f64::NAN,
        ];

        assert!(f64_eq(eval(Metric::Mean, &clean), 2.5));
        assert!(f64_eq(eval(Metric::Mean, &dirty), 2.5));
        assert!(f64_eq(eval(Metric::Median, &clean), 2.5));
        assert!(f64_eq(eval(Metric::Median, &dirty), 2.5));
    }

    /// 奇数长度样本的中位数是中间的次序统计量.
    #[test]
    fn test_median_odd() {
        assert!(f64_eq(eval(Metric::Median, &[5.0, 1.0, 3.0]), 3.0));
    }

    /// 常量样本的标准差恰为 0, 且 std 只在有限值上计算.
    #[test]
    fn test_std_constant_and_non_finite() {
        assert!(f64_eq(eval(Metric::Std, &[7.0; 8]), 0.0));
        assert!(f64_eq(eval(Metric::Std, &[7.0, f64::NAN, 7.0, 7.0]), 0.0));

        // 无偏除数: [1, 3] 的样本方差为 2.
        assert!(f64_eq(eval(Metric::Std, &[1.0, 3.0]), 2.0f64.sqrt()));
    }

    /// 有限值不足 2 个时 std 无定义.
    #[test]
    fn test_std_insufficient() {
        assert!(eval(Metric::Std, &[1.0]).is_nan());
        assert!(eval(Metric::Std, &[1.0, f64::NAN]).is_nan());
        assert!(eval(Metric::Std, &[]).is_nan());
    }

    /// Hazen 规则: n = 4 时 h = q * n + 0.5, p75 与 p25 各在
    /// 两个次序统计量中点, iqr = 3.5 - 1.5 = 2.
    #[test]
    fn test_iqr_hazen() {
        assert!(f64_eq(eval(Metric::Iqr, &[4.0, 2.0, 1.0, 3.0]), 2.0));

        // n = 1 时两个分位点都收缩到唯一样本.
        assert!(f64_eq(eval(Metric::Iqr, &[9.0]), 0.0));
    }

    /// 对称样本的 iqr 对关于中位数的反射不变.
    #[test]
    fn test_iqr_reflection_invariant() {
        let x = [1.0, 2.0, 4.0, 6.0, 7.0];
        let median = eval(Metric::Median, &x);
        let reflected: Vec<f64> = x.iter().map(|v| 2.0 * median - v).collect();
        assert!(f64_eq(eval(Metric::Iqr, &x), eval(Metric::Iqr, &reflected)));
    }

    /// iqr 不忽略缺失值: 样本含 NaN 时结果为 NaN.
    #[test]
    fn test_iqr_nan_poisons() {
        assert!(eval(Metric::Iqr, &[1.0, 2.0, f64::NAN]).is_nan());
        assert!(eval(Metric::Iqr, &[]).is_nan());
    }

    /// 与参考值完全一致的样本 rmse 与 nrmse 均为 0.
    #[test]
    fn test_rmse_nrmse_exact() {
        let x = [2.5; 10];
        assert!(f64_eq(Metric::Rmse.eval(&x, 2.5), 0.0));
        assert!(f64_eq(Metric::Nrmse.eval(&x, 2.5), 0.0));
    }

    /// rmse 先过滤非有限值再计算, 除数为有限值个数.
    #[test]
    fn test_rmse_filters_non_finite() {
        let x = [10.0, f64::NAN, 10.0, f64::INFINITY];
        assert!(f64_eq(Metric::Rmse.eval(&x, 10.0), 0.0));

        // [0, 2] 相对 1 的 rmse = 1.
        let x = [0.0, 2.0, f64::NAN];
        assert!(f64_eq(Metric::Rmse.eval(&x, 1.0), 1.0));
    }

    /// 参考值为 0 时 nrmse 无定义 (无穷或 NaN), 但不会 panic.
    #[test]
    fn test_nrmse_zero_reference() {
        assert!(!Metric::Nrmse.eval(&[1.0, 2.0], 0.0).is_finite());
        assert!(Metric::Nrmse.eval(&[0.0, 0.0], 0.0).is_nan());
    }

    /// 空样本在所有指标下都得到 NaN, 不会 panic.
    #[test]
    fn test_empty_sample_everywhere() {
        for m in Metric::ALL {
            assert!(m.eval(&[], 1.0).is_nan(), "{m} 对空样本应为 NaN");
        }
    }

    /// 与参考值相关的指标标注正确.
    #[test]
    fn test_needs_reference() {
        assert!(Metric::Rmse.needs_reference());
        assert!(Metric::Nrmse.needs_reference());
        assert!(!Metric::Mean.needs_reference());
        assert!(!Metric::Iqr.needs_reference());
    }
}
