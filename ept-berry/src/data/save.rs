//! 对比图像的持久化存储.

use crate::consts::Quantity;
use crate::data::window::MapWindow;
use crate::data::{DatasetReference, PropertyMap};
use image::{GrayImage, ImageResult, Luma};
use ndarray::{ArrayView2, Axis};
use std::path::Path;

/// 将一个切片按窗口渲染进灰度缓冲, 水平偏移为 `offset_w`.
fn render_into(buf: &mut GrayImage, slice: ArrayView2<f64>, window: &MapWindow, offset_w: u32) {
    for ((h, w), &value) in slice.indexed_iter() {
        // 非有限值 (未重建位置) 渲染为黑色.
        let gray = window.eval(value).unwrap_or(u8::MIN);
        buf.put_pixel(offset_w + w as u32, h as u32, Luma([gray]));
    }
}

/// 将重建切片与参考切片渲染为左右并排的灰度对比图并保存到 `path`.
///
/// 左侧为重建, 右侧为参考, 中间留 4 像素白色分隔带.
/// 两个切片的形状必须一致, 否则程序 panic.
pub fn save_comparison<P: AsRef<Path>>(
    recon: ArrayView2<f64>,
    reference: ArrayView2<f64>,
    window: &MapWindow,
    path: P,
) -> ImageResult<()> {
    assert_eq!(recon.dim(), reference.dim(), "对比图两侧形状不一致");

    const GAP: u32 = 4;
    let (height, width) = recon.dim();
    let (height, width) = (height as u32, width as u32);

    let mut buf = GrayImage::from_pixel(width * 2 + GAP, height, Luma([u8::MAX]));
    render_into(&mut buf, recon, window, 0);
    render_into(&mut buf, reference, window, width + GAP);
    buf.save(path)
}

/// 将重建图与对应参考图的中间水平切片渲染为对比图并保存到 `path`.
///
/// 使用物理量的默认可视化窗口. 重建图与分段标注形状必须一致,
/// 否则程序 panic.
pub fn save_middle_slice_comparison<P: AsRef<Path>>(
    map: &PropertyMap,
    reference: &DatasetReference,
    quantity: Quantity,
    path: P,
) -> ImageResult<()> {
    assert_eq!(
        map.shape(),
        reference.segmentation().shape(),
        "重建图与分段标注形状不一致"
    );

    let k0 = map.len_z() / 2;
    let ref_map = reference.reference_map(quantity);
    let window = MapWindow::from_quantity_visual(quantity);
    save_comparison(
        map.slice_at(k0),
        ref_map.index_axis(Axis(0), k0),
        &window,
        path,
    )
}

#[cfg(test)]
mod tests {
    use super::render_into;
    use crate::data::window::MapWindow;
    use image::{GrayImage, Luma};
    use ndarray::array;

    /// 渲染遵循窗口映射, 非有限值落到黑色.
    #[test]
    fn test_render_window_mapping() {
        let slice = array![[0.0, 2.0], [f64::NAN, 1.0]];
        let window = MapWindow::new(0.0, 2.0).unwrap();

        let mut buf = GrayImage::new(2, 2);
        render_into(&mut buf, slice.view(), &window, 0);

        assert_eq!(buf.get_pixel(0, 0), &Luma([0u8]));
        assert_eq!(buf.get_pixel(1, 0), &Luma([255u8]));
        assert_eq!(buf.get_pixel(0, 1), &Luma([0u8]));
        assert_eq!(buf.get_pixel(1, 1), &Luma([(255.0 * 0.5) as u8]));
    }
}
