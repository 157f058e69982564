//! EPT 重建图与参考数据的基础数据结构.

use std::path::Path;

use itertools::izip;
use ndarray::{Array3, ArrayView, ArrayView2, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::label::*;
use crate::consts::Quantity;
use crate::Idx3d;

pub mod morph;
pub mod save;
pub mod window;

pub use morph::SegmentMask;
pub use save::{save_comparison, save_middle_slice_comparison};
pub use window::MapWindow;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 单一物理量 (电导率或相对介电常数) 的三维重建图.
///
/// 体素值以 `f64` 保存, 非有限值代表未重建/无效位置, 由各统计量
/// 按自身规则处理. 数据按 `(z, H, W)` 组织; 二维输入在加载层被
/// 提升为单层三维体.
#[derive(Debug, Clone)]
pub struct PropertyMap {
    data: Array3<f64>,
}

impl PropertyMap {
    /// 由裸数据直接创建.
    #[inline]
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }

    /// 打开 nii 文件格式的重建图. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    ///
    /// # 注意
    ///
    /// header 中的体素间距不参与后续分析: 腐蚀以体素为单位.
    pub fn open_nifti<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = obj.header().clone();

        // [W, H, z] -> [z, H, W].
        let data = obj
            .into_volume()
            .into_ndarray::<f64>()?
            .permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        // 该操作不会生成 `Err`, 可直接 unwrap.
        let data =
            Array3::<f64>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        Ok(Self { data })
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.data.dim().0
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f64, Ix3> {
        self.data.view()
    }

    /// 获取 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 收集掩膜为真的位置上的体素值, 按行优先顺序.
    ///
    /// 掩膜与重建图形状必须一致, 否则程序 panic.
    pub fn values_under(&self, mask: &SegmentMask) -> Vec<f64> {
        assert_eq!(self.shape(), mask.shape(), "重建图与掩膜形状不一致");
        izip!(self.data.iter(), mask.data().iter())
            .filter_map(|(&v, &m)| m.then_some(v))
            .collect()
    }
}

/// 分段标注. 标签值以 `u8` 保存.
///
/// 0 为背景 (域外), 正整数 1..=L 代表 L 个分段.
#[derive(Debug, Clone)]
pub struct SegLabel {
    data: Array3<u8>,
}

impl SegLabel {
    /// 由裸数据直接创建.
    #[inline]
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
        self.data.view()
    }

    /// 标注中出现的最大分段标签. 纯背景标注返回 0.
    #[inline]
    pub fn max_label(&self) -> u8 {
        self.data.iter().copied().max().unwrap_or(BACKGROUND)
    }

    /// 按升序迭代标注中的全部分段标签 1..=L.
    #[inline]
    pub fn labels(&self) -> impl Iterator<Item = u8> {
        1..=self.max_label()
    }

    /// 获取标注中值为 `label` 的体素个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|p| **p == label).count()
    }

    /// 提取单个分段的二值掩膜: 标签值恰为 `label` 的位置为真.
    #[inline]
    pub fn mask(&self, label: u8) -> SegmentMask {
        SegmentMask::new(self.data.mapv(|p| p == label))
    }
}

/// 参考数据一致性错误.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// 分段标注中出现了没有参考值的标签.
    /// 第一个参数是最大标签, 第二个参数是参考值个数.
    LabelWithoutReference(u8, usize),

    /// 两个物理量的参考值序列长度不一致. `(cond_ref 长度, perm_ref 长度)`
    RefLenMismatch(usize, usize),

    /// 分段名称个数与参考值个数不一致. `(名称个数, 参考值个数)`
    NameCountMismatch(usize, usize),
}

/// 数据集参考信息.
///
/// 包含分段标注、每个分段的参考电导率和相对介电常数, 以及分段的
/// 展示名称. 参考序列下标 i 对应标签 i + 1.
#[derive(Debug, Clone)]
pub struct DatasetReference {
    segmentation: SegLabel,
    cond_ref: Vec<f64>,
    perm_ref: Vec<f64>,
    tissue_names: Vec<String>,
}

impl DatasetReference {
    /// 组装并校验参考数据.
    ///
    /// 校验内容: 两个参考序列与名称序列长度一致, 且标注中出现的每个
    /// 正标签都有对应的参考项.
    pub fn new(
        segmentation: SegLabel,
        cond_ref: Vec<f64>,
        perm_ref: Vec<f64>,
        tissue_names: Vec<String>,
    ) -> Result<Self, ReferenceError> {
        if cond_ref.len() != perm_ref.len() {
            return Err(ReferenceError::RefLenMismatch(
                cond_ref.len(),
                perm_ref.len(),
            ));
        }
        if tissue_names.len() != cond_ref.len() {
            return Err(ReferenceError::NameCountMismatch(
                tissue_names.len(),
                cond_ref.len(),
            ));
        }

        let max_label = segmentation.max_label();
        if max_label as usize > cond_ref.len() {
            return Err(ReferenceError::LabelWithoutReference(
                max_label,
                cond_ref.len(),
            ));
        }

        Ok(Self {
            segmentation,
            cond_ref,
            perm_ref,
            tissue_names,
        })
    }

    /// 获取分段标注.
    #[inline]
    pub fn segmentation(&self) -> &SegLabel {
        &self.segmentation
    }

    /// 获取物理量 `quantity` 的参考值序列. 下标 i 对应标签 i + 1.
    #[inline]
    pub fn refs(&self, quantity: Quantity) -> &[f64] {
        match quantity {
            Quantity::Cond => &self.cond_ref,
            Quantity::Perm => &self.perm_ref,
        }
    }

    /// 获取分段的展示名称序列. 下标 i 对应标签 i + 1.
    #[inline]
    pub fn tissue_names(&self) -> &[String] {
        &self.tissue_names
    }

    /// 参考项个数 (等于可能的分段个数上界).
    #[inline]
    pub fn segment_len(&self) -> usize {
        self.cond_ref.len()
    }

    /// 将分段参考值按标注散布成与重建图同形的参考图.
    ///
    /// 标签为 l > 0 的体素取该分段的参考值, 背景体素为 0.
    /// 该参考图同时服务于全图误差评估与可视化对比.
    pub fn reference_map(&self, quantity: Quantity) -> Array3<f64> {
        let refs = self.refs(quantity);
        let mut map = Array3::zeros(self.segmentation.shape());

        for (out, &label) in izip!(map.iter_mut(), self.segmentation.data().iter()) {
            if is_segment(label) {
                // 构造时已校验标签都有参考项.
                *out = refs[label as usize - 1];
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetReference, PropertyMap, ReferenceError, SegLabel, SegmentMask};
    use crate::consts::Quantity;
    use ndarray::{array, Array3};

    fn two_segment_label() -> SegLabel {
        // 左半标签 1, 右上角一个体素标签 2, 其余背景.
        let mut data = Array3::from_elem((1, 2, 2), 0u8);
        data[(0, 0, 0)] = 1;
        data[(0, 1, 0)] = 1;
        data[(0, 0, 1)] = 2;
        SegLabel::new(data)
    }

    #[test]
    fn test_seg_label_basic() {
        let seg = two_segment_label();
        assert_eq!(seg.max_label(), 2);
        assert_eq!(seg.labels().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(seg.count(1), 2);
        assert_eq!(seg.count(2), 1);
        assert_eq!(seg.count(0), 1);

        let mask = seg.mask(1);
        assert_eq!(mask.count(), 2);
        assert!(mask.data()[(0, 0, 0)]);
        assert!(!mask.data()[(0, 0, 1)]);
    }

    /// 掩膜取值按行优先顺序.
    #[test]
    fn test_values_under_row_major() {
        let map = PropertyMap::new(array![[1.0, 2.0], [3.0, 4.0]].insert_axis(ndarray::Axis(0)));
        let mask = SegmentMask::new(Array3::from_shape_fn((1, 2, 2), |(_, h, w)| h != 0 || w != 1));
        assert_eq!(map.values_under(&mask), vec![1.0, 3.0, 4.0]);
    }

    #[test]
    fn test_reference_validation() {
        let seg = two_segment_label();

        let err = DatasetReference::new(
            seg.clone(),
            vec![1.0],
            vec![50.0],
            vec!["one".to_string()],
        )
        .unwrap_err();
        assert_eq!(err, ReferenceError::LabelWithoutReference(2, 1));

        let err =
            DatasetReference::new(seg.clone(), vec![1.0, 2.0], vec![50.0], vec![]).unwrap_err();
        assert_eq!(err, ReferenceError::RefLenMismatch(2, 1));

        let err = DatasetReference::new(
            seg.clone(),
            vec![1.0, 2.0],
            vec![50.0, 60.0],
            vec!["one".to_string()],
        )
        .unwrap_err();
        assert_eq!(err, ReferenceError::NameCountMismatch(1, 2));

        let reference = DatasetReference::new(
            seg,
            vec![1.0, 2.0],
            vec![50.0, 60.0],
            vec!["one".to_string(), "two".to_string()],
        )
        .unwrap();
        assert_eq!(reference.segment_len(), 2);
        assert_eq!(reference.refs(Quantity::Cond), &[1.0, 2.0]);
        assert_eq!(reference.refs(Quantity::Perm), &[50.0, 60.0]);
    }

    /// 参考图把每个分段的参考值散布到其掩膜上, 背景保持 0.
    #[test]
    fn test_reference_map_scatter() {
        let reference = DatasetReference::new(
            two_segment_label(),
            vec![0.5, 2.0],
            vec![40.0, 80.0],
            vec!["a".to_string(), "b".to_string()],
        )
        .unwrap();

        let cond_map = reference.reference_map(Quantity::Cond);
        assert_eq!(cond_map[(0, 0, 0)], 0.5);
        assert_eq!(cond_map[(0, 1, 0)], 0.5);
        assert_eq!(cond_map[(0, 0, 1)], 2.0);
        assert_eq!(cond_map[(0, 1, 1)], 0.0);

        let perm_map = reference.reference_map(Quantity::Perm);
        assert_eq!(perm_map[(0, 0, 1)], 80.0);
    }
}
