//! 射线投射.

use crate::{BoneLabel, Vec3};

/// 方向向量长度低于该值时不再步进.
const MIN_STEP: f64 = 1e-3;

/// 在二值骨图像上沿固定方向步进, 直到离开前景.
#[derive(Debug, Clone, Copy)]
pub struct RayCaster<'a> {
    label: &'a BoneLabel,
}

impl<'a> RayCaster<'a> {
    /// 在 `label` 上投射射线.
    #[inline]
    pub fn new(label: &'a BoneLabel) -> Self {
        Self { label }
    }

    /// 沿 `direction` 走完整个图像对角线所需的最大步数.
    fn max_steps(&self, step: f64) -> usize {
        let (z, h, w) = self.label.shape();
        let diagonal = ((z * z + h * h + w * w) as f64).sqrt();
        (diagonal / step).ceil() as usize + 1
    }

    /// 从 `seed` 出发, 每次前进 `direction`, 返回第一个位于背景或越界的位置.
    ///
    /// `seed` 本身已在背景或越界时直接返回它. `direction` 不必是单位向量,
    /// 其长度即为步长; 长度小于 `1e-3` 时直接返回 `seed`.
    /// 步数不会超过走完图像对角线所需的步数.
    pub fn cast_to_background(&self, seed: &Vec3, direction: &Vec3) -> Vec3 {
        let step = direction.norm();
        if !(step >= MIN_STEP) {
            return *seed;
        }

        let mut pos = *seed;
        for _ in 0..self.max_steps(step) {
            match self.label.foreground_at(&pos) {
                Some(true) => pos += direction,
                _ => return pos,
            }
        }
        pos
    }
}
