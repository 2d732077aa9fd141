//! 脊点种子提取.

use ndarray::{Array3, ArrayView3, Zip};

use crate::consts::defaults::{RIDGE_RADIUS, RIDGE_THRESHOLD};
use crate::consts::gray::{is_foreground, BACKGROUND, FOREGROUND};
use crate::morph::Morphology;
use crate::pipeline::EfError;
use crate::{BoneLabel, Vec3};

/// 种子提取结果.
#[derive(Debug, Clone)]
pub struct RidgeSeeds {
    /// 种子点 (脊体素的中心), 按 `(z, h, w)` 行优先顺序排列.
    pub points: Vec<Vec3>,

    /// 种子掩膜. 种子体素为 `FOREGROUND`, 其余为 `BACKGROUND`.
    pub mask: Array3<u8>,
}

impl RidgeSeeds {
    /// 种子点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否没有任何种子.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// 以距离变换的脊响应 `close(D) - open(D)` 提取种子点.
#[derive(Debug, Clone, Copy)]
pub struct RidgeSeedExtractor {
    threshold: f64,
    radius: usize,
}

impl Default for RidgeSeedExtractor {
    fn default() -> Self {
        Self::new(RIDGE_THRESHOLD, RIDGE_RADIUS)
    }
}

impl RidgeSeedExtractor {
    /// `threshold` 为阈值占脊响应最大值的比例, `radius` 为超球结构元半径.
    ///
    /// # 注意
    ///
    /// `threshold` 必须位于 `[0, 1]`, 否则程序 panic.
    pub fn new(threshold: f64, radius: usize) -> Self {
        assert!((0.0..=1.0).contains(&threshold));
        Self { threshold, radius }
    }

    /// 阈值比例.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// 结构元半径.
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// 计算脊响应. 背景处为 0.
    ///
    /// 形态学算子返回的形状与 `distance` 不一致时返回 `Err(ShapeMismatch)`.
    pub fn ridge(
        &self,
        distance: ArrayView3<f32>,
        label: &BoneLabel,
        morph: &dyn Morphology,
    ) -> Result<Array3<f32>, EfError> {
        let closed = morph.close(distance, self.radius);
        let opened = morph.open(distance, self.radius);
        if closed.dim() != label.shape() || opened.dim() != label.shape() {
            return Err(EfError::ShapeMismatch);
        }

        let mut ridge = closed;
        Zip::from(&mut ridge)
            .and(&opened)
            .and(label.data())
            .for_each(|r, o, p| {
                *r = if is_foreground(*p) { *r - *o } else { 0.0 };
            });
        Ok(ridge)
    }

    /// 提取种子点与种子掩膜.
    ///
    /// 阈值为 `threshold * max(R)`, 只保留严格大于阈值的体素;
    /// 种子点与掩膜在同一次遍历中生成. `max(R) = 0` 时没有种子.
    pub fn extract(
        &self,
        distance: ArrayView3<f32>,
        label: &BoneLabel,
        morph: &dyn Morphology,
    ) -> Result<RidgeSeeds, EfError> {
        if distance.dim() != label.shape() {
            return Err(EfError::ShapeMismatch);
        }
        let ridge = self.ridge(distance, label, morph)?;
        let max = ridge.iter().copied().fold(0.0f32, f32::max);
        let tau = self.threshold * max as f64;

        let mut mask = Array3::from_elem(ridge.dim(), BACKGROUND);
        let mut points = vec![];
        for (pos, r) in ridge.indexed_iter() {
            if *r as f64 > tau {
                mask[pos] = FOREGROUND;
                points.push(BoneLabel::voxel_center(pos));
            }
        }
        log::debug!("ridge max = {max:.3}, threshold = {tau:.3}, {} seeds", points.len());
        Ok(RidgeSeeds { points, mask })
    }
}
