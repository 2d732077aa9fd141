//! 前景包含性过滤.

use crate::consts::AXIS_REDUCTION;
use crate::ellipsoid::Ellipsoid;
use crate::sphere::generalized_spiral_points;
use crate::{BoneLabel, Mat3, Vec3};

/// 椭球是否完全位于前景中.
///
/// 三个半径先各自减去 `√3`, 任一结果不为正时直接拒绝.
/// 探测方向为方向矩阵的三列及其反向, 再加上 `directions`.
/// 沿每个方向求出与收缩后椭球表面的交点: 交点在界内且为背景时拒绝, 越界视为通过.
/// 椭球中心越界时拒绝.
pub fn is_wholly_in_foreground(label: &BoneLabel, e: &Ellipsoid, directions: &[Vec3]) -> bool {
    let centroid = e.centroid();
    if label.voxel_of(&centroid).is_none() {
        return false;
    }

    let shrunk = e.radii().map(|r| r - AXIS_REDUCTION);
    if shrunk.iter().any(|r| !(*r > 0.0)) {
        return false;
    }
    let o = e.orientation();
    let diag = Vec3::from(shrunk.map(|r| 1.0 / (r * r)));
    let quadric = o * Mat3::from_diagonal(&diag) * o.transpose();

    let axes = [0, 1, 2].map(|i| o.column(i).into_owned());
    axes.iter()
        .copied()
        .chain(axes.iter().map(|v| -v))
        .chain(directions.iter().copied())
        .all(|d| {
            let form = d.dot(&(quadric * d));
            if !(form > 0.0) {
                return true;
            }
            let surface = centroid + d / form.sqrt();
            label.foreground_at(&surface) != Some(false)
        })
}

/// 以固定的螺旋方向集合做包含性过滤.
#[derive(Debug, Clone)]
pub struct ForegroundContainmentFilter<'a> {
    label: &'a BoneLabel,
    directions: Vec<Vec3>,
}

impl<'a> ForegroundContainmentFilter<'a> {
    /// 使用 `n` 个螺旋方向. 要求 `n > 2`, 否则程序 panic.
    pub fn new(label: &'a BoneLabel, n: usize) -> Self {
        Self::with_directions(label, generalized_spiral_points(n))
    }

    /// 使用任意的额外探测方向.
    #[inline]
    pub fn with_directions(label: &'a BoneLabel, directions: Vec<Vec3>) -> Self {
        Self { label, directions }
    }

    /// 见 [`is_wholly_in_foreground`].
    #[inline]
    pub fn accepts(&self, e: &Ellipsoid) -> bool {
        is_wholly_in_foreground(self.label, e, &self.directions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phantom;

    fn sphere_at(r: f64, centroid: Vec3) -> Ellipsoid {
        Ellipsoid::new(r, r, r).unwrap().with_centroid(centroid)
    }

    #[test]
    fn test_sphere_in_sphere() {
        let center = Vec3::new(8.0, 8.0, 8.0);
        let label = phantom::sphere((16, 16, 16), center, 5.0);
        let filter = ForegroundContainmentFilter::new(&label, 100);

        assert!(filter.accepts(&sphere_at(5.0, center)));
        assert!(!filter.accepts(&sphere_at(7.0, center)));
        // 收缩后半径不为正
        assert!(!filter.accepts(&sphere_at(1.5, center)));
        assert!(!filter.accepts(&sphere_at(AXIS_REDUCTION, center)));
    }

    #[test]
    fn test_centroid_out_of_bounds() {
        let label = BoneLabel::from_shape_fn((4, 4, 4), |_| true);
        let e = sphere_at(2.0, Vec3::new(-0.5, 2.0, 2.0));
        assert!(!is_wholly_in_foreground(&label, &e, &[]));
    }

    #[test]
    fn test_out_of_bounds_probes_pass() {
        let label = BoneLabel::from_shape_fn((5, 5, 5), |_| true);
        let e = sphere_at(20.0, Vec3::new(2.5, 2.5, 2.5));
        assert!(ForegroundContainmentFilter::new(&label, 12).accepts(&e));
    }

    #[test]
    fn test_orientation_matters() {
        let label = phantom::plate_z((16, 16, 16), 8.0, 4.0);
        let centroid = Vec3::new(8.0, 8.0, 8.0);
        let filter = ForegroundContainmentFilter::new(&label, 100);

        // 最短轴沿 z: 收缩后仍在板内
        let flat = Ellipsoid::from_semi_axes(
            &Vec3::new(0.0, 0.0, 3.0),
            &Vec3::new(20.0, 0.0, 0.0),
            &Vec3::new(0.0, 21.0, 0.0),
        )
        .unwrap()
        .with_centroid(centroid);
        assert!(filter.accepts(&flat));

        // 中间轴沿 z: 伸出板外
        let tilted = Ellipsoid::from_semi_axes(
            &Vec3::new(3.0, 0.0, 0.0),
            &Vec3::new(0.0, 0.0, 4.0),
            &Vec3::new(0.0, 21.0, 0.0),
        )
        .unwrap()
        .with_centroid(centroid);
        assert!(!filter.accepts(&tilted));
        assert!(!is_wholly_in_foreground(&label, &tilted, &[]));
    }
}
