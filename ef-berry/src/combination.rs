//! 接触点集合与四点组合.

use itertools::Itertools;

use crate::ray::RayCaster;
use crate::sphere::{axis_directions, generalized_spiral_points};
use crate::{BoneLabel, Vec3};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 射线与背景的接触点, 以及指向种子的单位内法向.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// 接触点坐标.
    pub point: Vec3,

    /// 单位内法向 `normalize(seed - point)`. 两者重合时为零向量.
    pub normal: Vec3,
}

impl ContactPoint {
    /// 由种子与接触点构造.
    pub fn new(seed: &Vec3, point: Vec3) -> Self {
        let normal = (seed - point)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vec3::zeros);
        Self { point, normal }
    }
}

/// 一次拟合任务: 四个接触点与作为椭球中心的种子.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combination {
    /// 四个接触点.
    pub contacts: [ContactPoint; 4],

    /// 种子点.
    pub center: Vec3,
}

/// 对每个种子投射射线, 并枚举接触点的全部四元子集.
#[derive(Debug, Clone)]
pub struct CombinationBuilder<'a> {
    caster: RayCaster<'a>,
    directions: Vec<Vec3>,
}

impl<'a> CombinationBuilder<'a> {
    /// 射线方向为 `n` 个螺旋方向, 后接 `+x, +y, +z, -x, -y, -z`.
    ///
    /// # 注意
    ///
    /// 要求 `n > 2`, 否则程序 panic.
    pub fn new(label: &'a BoneLabel, n: usize) -> Self {
        let mut directions = generalized_spiral_points(n);
        directions.extend(axis_directions());
        Self {
            caster: RayCaster::new(label),
            directions,
        }
    }

    /// 射线方向.
    #[inline]
    pub fn directions(&self) -> &[Vec3] {
        &self.directions
    }

    /// 每个种子产生的组合数 `C(n + 6, 4)`.
    pub fn combinations_per_seed(&self) -> usize {
        let m = self.directions.len();
        if m < 4 {
            return 0;
        }
        m * (m - 1) * (m - 2) * (m - 3) / 24
    }

    /// 种子 `seed` 沿每个方向的接触点, 顺序与 [`Self::directions`] 一致.
    pub fn contacts(&self, seed: &Vec3) -> Vec<ContactPoint> {
        self.directions
            .iter()
            .map(|d| ContactPoint::new(seed, self.caster.cast_to_background(seed, d)))
            .collect()
    }

    /// 种子 `seed` 的全部四元组合, 按下标字典序排列.
    pub fn combinations_of(&self, seed: &Vec3) -> Vec<Combination> {
        self.contacts(seed)
            .into_iter()
            .combinations(4)
            .map(|c| Combination {
                contacts: [c[0], c[1], c[2], c[3]],
                center: *seed,
            })
            .collect()
    }

    /// 所有种子的组合, 按种子顺序拼接.
    pub fn build(&self, seeds: &[Vec3]) -> Vec<Combination> {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let per_seed: Vec<Vec<Combination>> =
                    seeds.par_iter().map(|s| self.combinations_of(s)).collect();
            } else {
                let per_seed: Vec<Vec<Combination>> =
                    seeds.iter().map(|s| self.combinations_of(s)).collect();
            }
        }
        per_seed.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phantom;

    #[test]
    fn test_counts() {
        let label = BoneLabel::from_shape_fn((4, 4, 4), |_| true);
        let builder = CombinationBuilder::new(&label, 12);
        assert_eq!(builder.directions().len(), 18);
        assert_eq!(builder.combinations_per_seed(), 3060);

        let seed = Vec3::new(2.0, 2.0, 2.0);
        assert_eq!(builder.combinations_of(&seed).len(), 3060);

        let builder = CombinationBuilder::new(&label, 3);
        assert_eq!(builder.combinations_per_seed(), 126);
        assert_eq!(builder.build(&[seed, seed]).len(), 252);
        assert!(builder.build(&[]).is_empty());
    }

    #[test]
    fn test_lexicographic_and_seed_order() {
        let label = phantom::sphere((12, 12, 12), Vec3::new(6.0, 6.0, 6.0), 4.0);
        let builder = CombinationBuilder::new(&label, 4);
        let s0 = Vec3::new(6.0, 6.0, 6.0);
        let s1 = Vec3::new(5.0, 6.5, 6.0);

        let contacts = builder.contacts(&s0);
        let combos = builder.build(&[s0, s1]);
        let per_seed = builder.combinations_per_seed();
        assert_eq!(combos.len(), 2 * per_seed);

        assert_eq!(combos[0].contacts, [contacts[0], contacts[1], contacts[2], contacts[3]]);
        assert_eq!(combos[1].contacts[3], contacts[4]);
        assert_eq!(combos[per_seed - 1].contacts[0], contacts[contacts.len() - 4]);
        assert!(combos[..per_seed].iter().all(|c| c.center == s0));
        assert!(combos[per_seed..].iter().all(|c| c.center == s1));
    }

    #[test]
    fn test_inward_normals() {
        let label = phantom::sphere((12, 12, 12), Vec3::new(6.0, 6.0, 6.0), 4.0);
        let builder = CombinationBuilder::new(&label, 12);
        let seed = Vec3::new(6.0, 6.0, 6.0);

        for (c, d) in builder.contacts(&seed).iter().zip(builder.directions()) {
            assert!((c.normal.norm() - 1.0).abs() < 1e-12);
            assert!((c.normal + d).norm() < 1e-9);
            assert_eq!(label.foreground_at(&c.point), Some(false));
        }
    }

    #[test]
    fn test_zero_normal_on_background_seed() {
        let label = BoneLabel::from_shape_fn((3, 3, 3), |_| false);
        let builder = CombinationBuilder::new(&label, 12);
        let seed = Vec3::new(1.5, 1.5, 1.5);
        assert!(builder
            .contacts(&seed)
            .iter()
            .all(|c| c.point == seed && c.normal == Vec3::zeros()));
    }
}
