//! 二值分段掩膜与三维形态学腐蚀.

use crate::Idx3d;
use ndarray::{Array3, ArrayView, Ix3};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use ndarray::{Array2, Axis};
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 生成半径为 `radius` 的球形结构元的整数偏移集合.
///
/// 偏移 `(dz, dh, dw)` 属于结构元当且仅当 `dz² + dh² + dw² <= radius²`.
/// 半径 0 的结构元只含原点.
fn ball_offsets(radius: usize) -> Vec<(isize, isize, isize)> {
    let r = radius as isize;
    let r2 = r * r;
    let mut offsets = Vec::new();
    for dz in -r..=r {
        for dh in -r..=r {
            for dw in -r..=r {
                if dz * dz + dh * dh + dw * dw <= r2 {
                    offsets.push((dz, dh, dw));
                }
            }
        }
    }
    offsets
}

/// 单个分段的二值掩膜, 与重建图同形.
#[derive(Debug, Clone)]
pub struct SegmentMask {
    data: Array3<bool>,
}

impl SegmentMask {
    /// 由裸数据直接创建.
    #[inline]
    pub fn new(data: Array3<bool>) -> Self {
        Self { data }
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, bool, Ix3> {
        self.data.view()
    }

    /// 掩膜中为真的体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|p| **p).count()
    }

    /// 掩膜是否不含任何真体素?
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|p| *p)
    }

    /// 以半径为 `radius` 的球形结构元做二值腐蚀, 返回新掩膜.
    ///
    /// 体素保留当且仅当以其为中心的球内所有 **界内** 体素均为真;
    /// 越界位置视为真, 因此贴着体数据边界的体素不会仅因越界而被剔除.
    /// 半径 0 返回原掩膜的副本.
    ///
    /// 腐蚀严格不增: 结果中每个真体素在原掩膜中也为真.
    pub fn erode(&self, radius: usize) -> SegmentMask {
        if radius == 0 {
            return self.clone();
        }

        let offsets = ball_offsets(radius);
        let eroded = Array3::from_shape_fn(self.data.dim(), |pos| {
            self.data[pos] && self.survives(pos, &offsets)
        });
        Self { data: eroded }
    }

    /// 判断 `pos` 处的真体素在给定结构元下是否保留.
    #[inline]
    fn survives(&self, (z, h, w): Idx3d, offsets: &[(isize, isize, isize)]) -> bool {
        let (nz, nh, nw) = self.data.dim();
        offsets.iter().all(|&(dz, dh, dw)| {
            let (z, h, w) = (z as isize + dz, h as isize + dh, w as isize + dw);
            if z < 0 || h < 0 || w < 0 {
                return true;
            }
            let (z, h, w) = (z as usize, h as usize, w as usize);
            if z >= nz || h >= nh || w >= nw {
                return true;
            }
            self.data[(z, h, w)]
        })
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl SegmentMask {
    /// 借助 `rayon`, 按水平切片并行地执行 [`Self::erode`].
    ///
    /// 语义与单线程版本完全一致.
    pub fn par_erode(&self, radius: usize) -> SegmentMask {
        if radius == 0 {
            return self.clone();
        }

        let offsets = ball_offsets(radius);
        let (nz, nh, nw) = self.data.dim();

        let slices: Vec<Array2<bool>> = (0..nz)
            .into_par_iter()
            .map(|z| {
                Array2::from_shape_fn((nh, nw), |(h, w)| {
                    self.data[(z, h, w)] && self.survives((z, h, w), &offsets)
                })
            })
            .collect();

        let mut eroded = Array3::from_elem((nz, nh, nw), false);
        for (z, slice) in slices.into_iter().enumerate() {
            eroded.index_axis_mut(Axis(0), z).assign(&slice);
        }
        Self { data: eroded }
    }
}
