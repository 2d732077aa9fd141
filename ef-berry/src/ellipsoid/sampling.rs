use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Vec3;

/// 椭球表面采样算子.
pub trait SurfaceSampler: Send + Sync {
    /// 在以原点为中心, 半轴与坐标轴对齐 (`x`, `y`, `z` 依次对应 `radii`)
    /// 的椭球表面采样 `n` 个点.
    fn sample(&self, radii: [f64; 3], n: usize) -> Vec<Vec3>;
}

/// 按面积均匀分布的椭球表面采样.
///
/// 先在单位球面上均匀取方向并拉伸到椭球表面, 再按面积元与最大面积元之比接受或拒绝.
/// 每次采样都从同一个种子重新开始, 所以相同输入的结果一致.
#[derive(Debug, Clone, Copy)]
pub struct IsotropicSampler {
    seed: u64,
}

impl Default for IsotropicSampler {
    fn default() -> Self {
        Self::new(0x00ef_5eed)
    }
}

impl IsotropicSampler {
    /// 以随机数种子 `seed` 创建.
    #[inline]
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

/// 单位球面上的均匀随机方向 (立方体内拒绝采样后归一化).
fn random_unit_vector(rng: &mut StdRng) -> Vec3 {
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        let n2 = v.norm_squared();
        if n2 > 1e-12 && n2 <= 1.0 {
            break v / n2.sqrt();
        }
    }
}

impl SurfaceSampler for IsotropicSampler {
    fn sample(&self, [a, b, c]: [f64; 3], n: usize) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let g_max = (b * c).max(a * c).max(a * b);
        let mut points = Vec::with_capacity(n);

        while points.len() < n {
            let u = random_unit_vector(&mut rng);
            let g = ((b * c * u.x).powi(2) + (a * c * u.y).powi(2) + (a * b * u.z).powi(2)).sqrt();
            if rng.gen::<f64>() * g_max < g {
                points.push(Vec3::new(a * u.x, b * u.y, c * u.z));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_sampling_is_balanced() {
        let points = IsotropicSampler::new(1).sample([2.0, 2.0, 2.0], 4000);
        assert_eq!(points.len(), 4000);

        let mean = points.iter().sum::<Vec3>() / points.len() as f64;
        assert!(mean.norm() < 0.15, "mean = {mean:?}");
        assert!(points.iter().all(|p| (p.norm() - 2.0).abs() < 1e-9));
    }

    #[test]
    fn test_zero_points() {
        assert!(IsotropicSampler::default().sample([1.0, 2.0, 3.0], 0).is_empty());
    }
}
