//! 对 `ept-berry::dataset` 的更一层封装. 提供更直接的数据加载器.

use ept_berry::dataset::{self, EptResults, OpenReferenceError, OpenResultsError};
use ept_berry::DatasetReference;
use std::env;
use std::path::{Path, PathBuf};

/// 获取分析工作目录.
///
/// 1. 若环境变量 `$EPT_WORKING_DIR` 非空, 则返回其值;
/// 2. 否则, 返回当前目录.
pub fn working_dir_from_env_or_cwd() -> PathBuf {
    if let Ok(d) = env::var("EPT_WORKING_DIR") {
        PathBuf::from(d)
    } else {
        PathBuf::from(".")
    }
}

/// 获取数据集 `dataset_name` 的参考数据目录.
///
/// 1. 若环境变量 `$EPT_DATASET_DIR` 非空, 则返回 `{其值}/{dataset_name}`;
/// 2. 否则, 返回 `$HOME/datasets/{dataset_name}`.
pub fn reference_dir_from_env_or_home(dataset_name: &str) -> PathBuf {
    if let Ok(d) = env::var("EPT_DATASET_DIR") {
        let mut p = PathBuf::from(d);
        p.push(dataset_name);
        p
    } else {
        dataset::home_datasets_dir_with([dataset_name]).unwrap()
    }
}

/// 打开工作目录下名为 `{input_stem}.npz` 的重建结果归档.
pub fn open_results<P: AsRef<Path>>(
    working_dir: P,
    input_stem: &str,
) -> Result<EptResults, OpenResultsError> {
    EptResults::open_npz(working_dir.as_ref().join(format!("{input_stem}.npz")))
}

/// 打开数据集 `dataset_name` 的参考数据 (目录解析规则见
/// [`reference_dir_from_env_or_home`]).
pub fn open_reference_by_name(dataset_name: &str) -> Result<DatasetReference, OpenReferenceError> {
    dataset::open_reference(reference_dir_from_env_or_home(dataset_name))
}
