//! 结果表的文本呈现.

use super::SegmentTable;
use std::fmt;

impl fmt::Display for SegmentTable {
    /// 渲染为对齐的文本表: 首列为腐蚀级别, 之后每个指标一列.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>13}", "erosion level")?;
        for metric in &self.metrics {
            write!(f, "{:>12}", metric.name())?;
        }
        writeln!(f)?;

        for row in &self.rows {
            write!(f, "{:>13}", row.erosion_level)?;
            for value in &row.values {
                write!(f, "{:>12.6}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::analysis::{SegmentTable, TableRow};
    use crate::metrics::Metric;

    fn sample_table() -> SegmentTable {
        SegmentTable {
            tissue: "liver".to_string(),
            label: 1,
            metrics: vec![Metric::Mean, Metric::Nrmse],
            rows: vec![
                TableRow {
                    erosion_level: 0,
                    values: vec![1.25, 0.5],
                },
                TableRow {
                    erosion_level: 2,
                    values: vec![f64::NAN, f64::NAN],
                },
            ],
        }
    }

    /// 表头含列名, 每个腐蚀级别一行, NaN 以文本形式保留.
    #[test]
    fn test_table_display() {
        let text = sample_table().to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("erosion level"));
        assert!(lines[0].contains("mean"));
        assert!(lines[0].contains("nrmse"));
        assert!(lines[1].trim_start().starts_with('0'));
        assert!(lines[1].contains("1.250000"));
        assert!(lines[2].contains("NaN"));
    }
}
