//! 分析结果的文件导出.
//!
//! CSV 与全图评分写到 `{working_dir}/csv/`, 对比图写到
//! `{working_dir}/figures/`.

use ept_berry::analysis::{GlobalError, SegmentTable};
use ept_berry::consts::Quantity;
use ept_berry::{save_middle_slice_comparison, DatasetReference, PropertyMap};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// 将 `x` 舍入到 `sig` 位有效数字.
///
/// 0 与非有限值原样返回.
pub fn round_sig(x: f64, sig: i32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let dp = sig - 1 - x.abs().log10().floor() as i32;
    let factor = 10f64.powi(dp);
    (x * factor).round() / factor
}

/// 将分段名称转换为文件系统安全的标识符.
///
/// 非 ASCII 字母数字字符替换为下划线, 连续下划线折叠为一个,
/// 去除首尾下划线, 截断到 32 个字符.
pub fn safe_tissue_name(name: &str) -> String {
    let mut safe = String::with_capacity(name.len());
    let mut last_underscore = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            safe.push(c);
            last_underscore = false;
        } else if !last_underscore {
            safe.push('_');
            last_underscore = true;
        }
    }
    safe.trim_matches('_').chars().take(32).collect()
}

/// 将一个结果表以 CSV 格式写进 `w` 中, 数值舍入到 3 位有效数字.
fn table_into<W: Write>(table: &SegmentTable, w: &mut W) -> io::Result<()> {
    write!(w, "erosion level")?;
    for metric in &table.metrics {
        write!(w, ",{}", metric.name())?;
    }
    writeln!(w)?;

    for row in &table.rows {
        write!(w, "{}", row.erosion_level)?;
        for value in &row.values {
            write!(w, ",{}", round_sig(*value, 3))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// 将全部结果表导出为 CSV, 每个分段一个文件:
/// `{working_dir}/csv/{stem}_{quantity}_{safe_name}.csv`.
pub fn write_csv_tables(
    working_dir: &Path,
    stem: &str,
    quantity: Quantity,
    tables: &[SegmentTable],
) -> io::Result<()> {
    let dir = working_dir.join("csv");
    fs::create_dir_all(&dir)?;

    for table in tables {
        let path = dir.join(format!(
            "{stem}_{}_{}.csv",
            quantity.key(),
            safe_tissue_name(&table.tissue)
        ));
        let mut w = BufWriter::new(File::create(path)?);
        table_into(table, &mut w)?;
    }
    Ok(())
}

/// 将全图误差评分导出为
/// `{working_dir}/csv/{stem}_{quantity}_global.json`.
///
/// 非有限评分按 JSON 惯例写作 null.
pub fn write_global_json(
    working_dir: &Path,
    stem: &str,
    quantity: Quantity,
    global: &GlobalError,
) -> io::Result<()> {
    let dir = working_dir.join("csv");
    fs::create_dir_all(&dir)?;

    let path = dir.join(format!("{stem}_{}_global.json", quantity.key()));
    // 纯数值结构, 序列化不会失败.
    let text = serde_json::to_string_pretty(global).unwrap();
    fs::write(path, text)
}

/// 将重建/参考中间切片对比图导出为
/// `{working_dir}/figures/{stem}_{quantity}.png`.
pub fn save_figure(
    working_dir: &Path,
    stem: &str,
    quantity: Quantity,
    map: &PropertyMap,
    reference: &DatasetReference,
) -> image::ImageResult<()> {
    let dir = working_dir.join("figures");
    fs::create_dir_all(&dir).map_err(image::ImageError::IoError)?;

    let path = dir.join(format!("{stem}_{}.png", quantity.key()));
    save_middle_slice_comparison(map, reference, quantity, path)
}
