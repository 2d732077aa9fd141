//! 距离变换与灰度形态学.
//!
//! 流水线只通过 [`DistanceTransform`] 与 [`Morphology`] 两个 trait 使用它们,
//! 调用方可以注入自己的实现. 本模块提供各自的默认实现.

use ndarray::{Array3, ArrayView3};

use crate::BoneLabel;

mod distance;
mod grey;

pub use distance::EuclideanDistance;
pub use grey::{sphere_offsets, SphereMorphology};

/// 距离变换算子: 二值骨图像 -> 同形状的实值图像.
pub trait DistanceTransform: Send + Sync {
    /// 计算每个前景体素到最近背景体素的距离. 背景体素为 0.
    fn distance(&self, label: &BoneLabel) -> Array3<f32>;
}

/// 以超球为结构元的灰度形态学开/闭运算.
pub trait Morphology: Send + Sync {
    /// 开运算 (先腐蚀后膨胀).
    fn open(&self, data: ArrayView3<f32>, radius: usize) -> Array3<f32>;

    /// 闭运算 (先膨胀后腐蚀).
    fn close(&self, data: ArrayView3<f32>, radius: usize) -> Array3<f32>;
}
