//! 通用常量.

/// 分段标签值.
pub mod label {
    /// 分段标注中, 背景 (域外) 的标签值.
    pub const BACKGROUND: u8 = 0;

    /// 标签是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        matches!(p, BACKGROUND)
    }

    /// 标签是否属于某个分段 (即非背景)?
    #[inline]
    pub const fn is_segment(p: u8) -> bool {
        !is_background(p)
    }
}

/// 默认的腐蚀级别序列 (体素半径, 升序).
///
/// 级别 0 代表不腐蚀, 直接在分段原形上统计; 更高级别逐步剔除
/// 部分体积效应集中的边界层.
pub const DEFAULT_EROSION_LEVELS: [usize; 3] = [0, 2, 4];

/// 被分析的物理量.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Quantity {
    /// 电导率 (S/m).
    Cond,

    /// 相对介电常数 (无量纲).
    Perm,
}

impl Quantity {
    /// 全部物理量, 按分析顺序排列.
    pub const ALL: [Quantity; 2] = [Quantity::Cond, Quantity::Perm];

    /// 重建结果归档中该量的成员名.
    #[inline]
    pub const fn key(&self) -> &'static str {
        match self {
            Quantity::Cond => "cond",
            Quantity::Perm => "perm",
        }
    }

    /// 参考数据归档中该量参考值序列的成员名.
    #[inline]
    pub const fn ref_key(&self) -> &'static str {
        match self {
            Quantity::Cond => "cond_ref",
            Quantity::Perm => "perm_ref",
        }
    }

    /// 展示用标题, 含单位.
    #[inline]
    pub const fn title(&self) -> &'static str {
        match self {
            Quantity::Cond => "cond. (S/m)",
            Quantity::Perm => "rel. perm. (-)",
        }
    }
}
