//! 数据集读写.
//!
//! 重建结果以 npz 归档存储, 成员 `cond` 和/或 `perm` (与 numpy
//! `savez` 兼容, 成员名允许带 `.npy` 后缀); 体数据按 `(z, H, W)`
//! 组织, 二维成员会被提升为单层三维体. 参考数据存放在数据集目录下:
//! `dataset_reference.npz` (成员 `segmentation` 为 `uint8` 标签体,
//! `cond_ref`/`perm_ref` 为 `float64` 一维参考序列) 与
//! `tissue_names.json` (分段展示名称的 JSON 字符串数组).

use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;
use ndarray::{Array1, Array3, ArrayD, Axis, Ix1, Ix2, Ix3, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};

use crate::consts::Quantity;
use crate::data::{DatasetReference, PropertyMap, ReferenceError, SegLabel};

/// 参考数据归档的文件名.
pub const REFERENCE_ARCHIVE: &str = "dataset_reference.npz";

/// 分段名称文件的文件名.
pub const TISSUE_NAMES_FILE: &str = "tissue_names.json";

/// 获取 `{用户主目录}/datasets` 目录.
pub fn home_datasets_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("datasets");
    Some(ans)
}

/// 获取 `{用户主目录}/datasets` 目录下给定继续项组成的全路径.
pub fn home_datasets_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_datasets_dir()?;
    ans.extend(it);
    Some(ans)
}

/// 在归档成员名中解析 `key`: 接受裸名与带 `.npy` 后缀两种形式,
/// 返回归档中实际存储的成员名.
fn resolve_member<'a>(names: &'a [String], key: &str) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|n| n.strip_suffix(".npy").unwrap_or(n) == key)
}

/// 二维数组提升为单层三维体; 三维数组原样转换.
///
/// 其他维数返回 `Err(维数)`.
fn promote<T>(arr: ArrayD<T>) -> Result<Array3<T>, usize> {
    match arr.ndim() {
        // 维数已检查, into_dimensionality 不会失败.
        2 => Ok(arr
            .into_dimensionality::<Ix2>()
            .unwrap()
            .insert_axis(Axis(0))),
        3 => Ok(arr.into_dimensionality::<Ix3>().unwrap()),
        d => Err(d),
    }
}

/// 打开重建结果错误.
#[derive(Debug)]
pub enum OpenResultsError {
    /// 底层 I/O 错误.
    Io(std::io::Error),

    /// npz 读取错误.
    ReadNpz(ReadNpzError),

    /// 成员维数既不是 2 也不是 3. `(成员名, 维数)`
    BadDimension(&'static str, usize),
}

/// EPT 重建结果, 至多包含电导率和相对介电常数两个重建图.
///
/// 两个成员都缺失不是加载错误; 是否构成 "无可分析数据" 由上层流程
/// 判断并报告.
#[derive(Debug)]
pub struct EptResults {
    cond: Option<PropertyMap>,
    perm: Option<PropertyMap>,
}

impl EptResults {
    /// 打开 npz 归档格式的重建结果. 缺失的成员以 `None` 表示.
    pub fn open_npz<P: AsRef<Path>>(path: P) -> Result<Self, OpenResultsError> {
        let file = File::open(path.as_ref()).map_err(OpenResultsError::Io)?;
        let mut npz = NpzReader::new(file).map_err(OpenResultsError::ReadNpz)?;
        let names = npz.names().map_err(OpenResultsError::ReadNpz)?;

        let cond = Self::member(&mut npz, &names, Quantity::Cond)?;
        let perm = Self::member(&mut npz, &names, Quantity::Perm)?;

        info!(
            "重建结果已加载: cond {}, perm {}",
            cond.is_some(),
            perm.is_some()
        );
        Ok(Self { cond, perm })
    }

    /// 读取物理量 `quantity` 对应的归档成员.
    fn member(
        npz: &mut NpzReader<File>,
        names: &[String],
        quantity: Quantity,
    ) -> Result<Option<PropertyMap>, OpenResultsError> {
        let Some(name) = resolve_member(names, quantity.key()) else {
            return Ok(None);
        };

        let arr = npz
            .by_name::<OwnedRepr<f64>, IxDyn>(name)
            .map_err(OpenResultsError::ReadNpz)?;
        let arr =
            promote(arr).map_err(|d| OpenResultsError::BadDimension(quantity.key(), d))?;
        Ok(Some(PropertyMap::new(arr)))
    }

    /// 获取物理量 `quantity` 的重建图.
    #[inline]
    pub fn get(&self, quantity: Quantity) -> Option<&PropertyMap> {
        match quantity {
            Quantity::Cond => self.cond.as_ref(),
            Quantity::Perm => self.perm.as_ref(),
        }
    }

    /// 按固定顺序列出结果中实际存在的物理量.
    #[inline]
    pub fn quantities(&self) -> Vec<Quantity> {
        Quantity::ALL
            .into_iter()
            .filter(|q| self.get(*q).is_some())
            .collect()
    }

    /// 结果是否不含任何物理量?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.quantities().is_empty()
    }
}

/// 打开参考数据错误.
#[derive(Debug)]
pub enum OpenReferenceError {
    /// 底层 I/O 错误.
    Io(std::io::Error),

    /// npz 读取错误.
    ReadNpz(ReadNpzError),

    /// 归档缺少必要成员.
    MissingMember(&'static str),

    /// 分段标注维数既不是 2 也不是 3.
    BadDimension(usize),

    /// `tissue_names.json` 解析错误.
    Json(serde_json::Error),

    /// 参考数据自身不一致.
    Reference(ReferenceError),
}

/// 从数据集目录打开参考数据.
///
/// 目录须包含 [`REFERENCE_ARCHIVE`] 与 [`TISSUE_NAMES_FILE`] 两个
/// 文件 (格式见模块文档). 加载成功后会立即校验参考数据的一致性.
pub fn open_reference<P: AsRef<Path>>(dir: P) -> Result<DatasetReference, OpenReferenceError> {
    let dir = dir.as_ref();

    let file = File::open(dir.join(REFERENCE_ARCHIVE)).map_err(OpenReferenceError::Io)?;
    let mut npz = NpzReader::new(file).map_err(OpenReferenceError::ReadNpz)?;
    let names = npz.names().map_err(OpenReferenceError::ReadNpz)?;

    let member = |key: &'static str| -> Result<String, OpenReferenceError> {
        resolve_member(&names, key)
            .map(str::to_string)
            .ok_or(OpenReferenceError::MissingMember(key))
    };

    let seg = npz
        .by_name::<OwnedRepr<u8>, IxDyn>(&member("segmentation")?)
        .map_err(OpenReferenceError::ReadNpz)?;
    let seg = promote(seg).map_err(OpenReferenceError::BadDimension)?;

    let mut ref_values = |q: Quantity| -> Result<Array1<f64>, OpenReferenceError> {
        npz.by_name::<OwnedRepr<f64>, Ix1>(&member(q.ref_key())?)
            .map_err(OpenReferenceError::ReadNpz)
    };
    let cond_ref = ref_values(Quantity::Cond)?;
    let perm_ref = ref_values(Quantity::Perm)?;

    let text = std::fs::read_to_string(dir.join(TISSUE_NAMES_FILE))
        .map_err(OpenReferenceError::Io)?;
    let tissue_names: Vec<String> =
        serde_json::from_str(&text).map_err(OpenReferenceError::Json)?;

    info!(
        "参考数据已加载: {} 个分段, 标注形状 {:?}",
        tissue_names.len(),
        seg.dim()
    );

    DatasetReference::new(
        SegLabel::new(seg),
        cond_ref.to_vec(),
        perm_ref.to_vec(),
        tissue_names,
    )
    .map_err(OpenReferenceError::Reference)
}
