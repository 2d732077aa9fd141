//! 合成体模. 用于测试与消融实验.
//!
//! 所有体模均以体素中心是否落在几何体内部来决定前景.

use super::BoneLabel;
use crate::ellipsoid::Ellipsoid;
use crate::{Idx3d, Vec3};

/// 以 `center` 为球心, `radius` 为半径的实心球.
pub fn sphere(shape: Idx3d, center: Vec3, radius: f64) -> BoneLabel {
    let r2 = radius * radius;
    BoneLabel::from_shape_fn(shape, |pos| {
        (BoneLabel::voxel_center(pos) - center).norm_squared() <= r2
    })
}

/// 沿 x 轴贯穿整个图像的圆柱 (杆). 轴线经过 `(y, z) = axis`.
pub fn rod_x(shape: Idx3d, axis: (f64, f64), radius: f64) -> BoneLabel {
    let r2 = radius * radius;
    BoneLabel::from_shape_fn(shape, |pos| {
        let c = BoneLabel::voxel_center(pos);
        (c.y - axis.0).powi(2) + (c.z - axis.1).powi(2) <= r2
    })
}

/// 法向为 z 轴, 贯穿整个 xy 平面的板. 中面位于 `z = mid`, 总厚度为 `thickness`.
pub fn plate_z(shape: Idx3d, mid: f64, thickness: f64) -> BoneLabel {
    let half = thickness / 2.0;
    BoneLabel::from_shape_fn(shape, |pos| {
        (BoneLabel::voxel_center(pos).z - mid).abs() < half
    })
}

/// 实心椭球. 体素中心严格位于 `e` 内部时为前景.
pub fn ellipsoid(shape: Idx3d, e: &Ellipsoid) -> BoneLabel {
    BoneLabel::from_shape_fn(shape, |pos| e.contains(&BoneLabel::voxel_center(pos)))
}
