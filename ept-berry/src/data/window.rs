//! 物理量可视化窗口.

use crate::consts::Quantity;

/// 物理量可视化窗口, 由显示下界和显示上界构成.
///
/// 该窗口是只读的. 若要修改窗口参数, 你应该创建新的实例.
#[derive(Copy, Clone, Debug)]
pub struct MapWindow {
    lower: f64,
    upper: f64,
}

impl MapWindow {
    /// 构建可视化窗口.
    ///
    /// `lower` 和 `upper` 必须在合理范围内且 `lower < upper`, 否则返回 `None`.
    pub fn new(lower: f64, upper: f64) -> Option<MapWindow> {
        if (-1e6..=1e6).contains(&lower) && (-1e6..=1e6).contains(&upper) && lower < upper {
            Some(Self { lower, upper })
        } else {
            None
        }
    }

    /// 构建一个便于展示电导率图的窗口: 0.0 到 2.5 S/m.
    #[inline]
    pub const fn from_conductivity_visual() -> MapWindow {
        Self {
            lower: 0.0,
            upper: 2.5,
        }
    }

    /// 构建一个便于展示相对介电常数图的窗口: 30 到 100.
    #[inline]
    pub const fn from_permittivity_visual() -> MapWindow {
        Self {
            lower: 30.0,
            upper: 100.0,
        }
    }

    /// 构建给定物理量的默认可视化窗口.
    #[inline]
    pub const fn from_quantity_visual(quantity: Quantity) -> MapWindow {
        match quantity {
            Quantity::Cond => Self::from_conductivity_visual(),
            Quantity::Perm => Self::from_permittivity_visual(),
        }
    }

    /// 窗下限.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.lower
    }

    /// 窗上限.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        self.upper
    }

    /// 窗宽.
    #[inline]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// 求在当前窗口设置下, 物理量值 `value` 对应的灰度图像素整数值
    /// (0 <= value <= 255).
    ///
    /// 如果 `value` 无意义 (如 inf, NaN), 则返回 `None`.
    pub fn eval(&self, value: f64) -> Option<u8> {
        if !value.is_finite() {
            return None;
        }
        if value <= self.lower {
            Some(u8::MIN)
        } else if value >= self.upper {
            Some(u8::MAX)
        } else {
            // 255, not 256.
            Some(((value - self.lower) / self.width() * 255.0) as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MapWindow;
    use crate::consts::Quantity;

    fn is_valid_init(lower: f64, upper: f64) -> bool {
        MapWindow::new(lower, upper).is_some()
    }

    #[test]
    fn test_map_window_invalid_input() {
        assert!(!is_valid_init(1.0, 1.0));
        assert!(!is_valid_init(2.0, 1.0));
        assert!(!is_valid_init(0.0, 1e7));
    }

    #[test]
    fn test_map_window_generic() {
        // [0, 2]
        let win = MapWindow::new(0.0, 2.0).unwrap();
        assert_eq!(win.eval(f64::NAN), None);
        assert_eq!(win.eval(f64::INFINITY), None);

        assert_eq!(win.eval(-1.0), Some(0));
        assert_eq!(win.eval(0.0), Some(0));
        assert_eq!(win.eval(0.5), Some((255.0 * 0.25) as u8));
        assert_eq!(win.eval(1.0), Some((255.0 * 0.5) as u8));
        assert_eq!(win.eval(2.0), Some(u8::MAX));
        assert_eq!(win.eval(5.0), Some(u8::MAX));
    }

    /// 两个物理量的默认窗口与其展示范围一致.
    #[test]
    fn test_quantity_visual_windows() {
        let cond = MapWindow::from_quantity_visual(Quantity::Cond);
        assert_eq!(cond.lower_bound(), 0.0);
        assert_eq!(cond.upper_bound(), 2.5);

        let perm = MapWindow::from_quantity_visual(Quantity::Perm);
        assert_eq!(perm.lower_bound(), 30.0);
        assert_eq!(perm.upper_bound(), 100.0);
    }
}
