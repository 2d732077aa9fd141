//! 体素归属.
//!
//! 每个前景体素归属于包含其中心的体积最大的椭球. 候选椭球必须事先按体积降序排列,
//! 归属结果以椭球在该序列中的下标表示.

use ndarray::{Array3, ArrayView3, ArrayViewMut2, Axis, Zip};
use ordered_float::OrderedFloat;

use crate::consts::gray::is_foreground;
use crate::consts::UNASSIGNED;
use crate::ellipsoid::Ellipsoid;
use crate::BoneLabel;

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 按体积降序稳定排序. 体积相同的椭球保持原有顺序.
pub fn sort_by_volume(ellipsoids: &mut [Ellipsoid]) {
    ellipsoids.sort_by_key(|e| std::cmp::Reverse(OrderedFloat(e.volume())));
}

/// 身份图像中已归属的体素个数.
pub fn count_assigned(identity: ArrayView3<i32>) -> usize {
    identity.iter().filter(|id| **id != UNASSIGNED).count()
}

/// 把逐椭球的数值按身份图像广播到每个体素. 未归属的体素为 NaN.
pub fn broadcast(identity: ArrayView3<i32>, values: &[f32]) -> Array3<f32> {
    identity.mapv(|id| {
        usize::try_from(id)
            .ok()
            .and_then(|i| values.get(i))
            .copied()
            .unwrap_or(f32::NAN)
    })
}

/// 体素归属结果与派生的标量图像.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// 身份图像. 未归属的体素为 `UNASSIGNED`.
    pub identity: Array3<i32>,

    /// 椭球因子 `a/b - b/c`.
    pub ef: Array3<f32>,

    /// 椭球体积.
    pub volume: Array3<f32>,

    /// 轴比 `a/b`.
    pub a_to_b: Array3<f32>,

    /// 轴比 `b/c`.
    pub b_to_c: Array3<f32>,
}

/// 体素归属引擎.
#[derive(Debug, Clone, Copy)]
pub struct VoxelAssignmentEngine<'a> {
    label: &'a BoneLabel,
    ellipsoids: &'a [Ellipsoid],
}

impl<'a> VoxelAssignmentEngine<'a> {
    /// `ellipsoids` 应当已经由 [`sort_by_volume`] 排好序.
    #[inline]
    pub fn new(label: &'a BoneLabel, ellipsoids: &'a [Ellipsoid]) -> Self {
        Self { label, ellipsoids }
    }

    /// 处理第 `z` 层切片. 只考虑中心在 z 方向上与切片距离小于 `c` 的椭球.
    fn assign_slice(&self, z: usize, mut slice: ArrayViewMut2<i32>) {
        let z_center = z as f64 + 0.5;
        let candidates: Vec<usize> = self
            .ellipsoids
            .iter()
            .enumerate()
            .filter(|(_, e)| (e.centroid().z - z_center).abs() < e.c())
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return;
        }

        Zip::indexed(&mut slice)
            .and(self.label.slice_at(z))
            .for_each(|(h, w), id, p| {
                if !is_foreground(*p) {
                    return;
                }
                let center = BoneLabel::voxel_center((z, h, w));
                if let Some(i) = candidates
                    .iter()
                    .find(|i| self.ellipsoids[**i].contains(&center))
                {
                    *id = *i as i32;
                }
            });
    }

    /// 计算身份图像.
    pub fn identity(&self) -> Array3<i32> {
        let mut identity = Array3::from_elem(self.label.shape(), UNASSIGNED);
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                identity
                    .axis_iter_mut(Axis(0))
                    .into_par_iter()
                    .enumerate()
                    .for_each(|(z, slice)| self.assign_slice(z, slice));
            } else {
                identity
                    .axis_iter_mut(Axis(0))
                    .enumerate()
                    .for_each(|(z, slice)| self.assign_slice(z, slice));
            }
        }
        identity
    }

    /// 计算身份图像, 并广播 EF / 体积 / 轴比.
    pub fn assign(&self) -> Assignment {
        let identity = self.identity();
        let per = |f: fn(&Ellipsoid) -> f64| -> Vec<f32> {
            self.ellipsoids.iter().map(|e| f(e) as f32).collect()
        };
        let ef = broadcast(identity.view(), &per(Ellipsoid::ellipsoid_factor));
        let volume = broadcast(identity.view(), &per(Ellipsoid::volume));
        let a_to_b = broadcast(identity.view(), &per(Ellipsoid::a_to_b));
        let b_to_c = broadcast(identity.view(), &per(Ellipsoid::b_to_c));
        Assignment {
            identity,
            ef,
            volume,
            a_to_b,
            b_to_c,
        }
    }
}
