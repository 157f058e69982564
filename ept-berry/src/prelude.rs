//! 常用功能的一站式导入.

pub use crate::Idx3d;

pub use crate::data::morph::SegmentMask;
pub use crate::data::window::MapWindow;
pub use crate::data::{
    save_comparison, save_middle_slice_comparison, DatasetReference, PropertyMap, ReferenceError,
    SegLabel,
};

pub use crate::analysis::{
    evaluate_global_metrics, perform_analysis, AnalysisConfig, GlobalError, SegmentTable, TableRow,
};

#[cfg(feature = "rayon")]
pub use crate::analysis::par_perform_analysis;

pub use crate::consts::label::BACKGROUND;
pub use crate::consts::{Quantity, DEFAULT_EROSION_LEVELS};

pub use crate::metrics::{Metric, UnknownMetricError};

pub use crate::dataset::{self, open_reference, EptResults};
