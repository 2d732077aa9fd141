use ndarray::{Array2, Array3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ellipsoid::Ellipsoid;
use crate::Vec3;

/// 没有找到任何椭球的原因. 按流水线阶段先后排列.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoEllipsoidReason {
    /// 输入没有前景体素.
    EmptyForeground,

    /// 脊响应没有超过阈值的体素.
    NoSeeds,

    /// 没有产生任何四点组合.
    NoCombinations,

    /// 所有组合都拟合失败.
    NoFit,

    /// 所有拟合结果都未通过包含性过滤.
    AllRejected,
}

/// 各阶段的计数.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EfSummary {
    /// 前景体素个数.
    pub foreground_voxels: usize,

    /// 种子点个数.
    pub seeds: usize,

    /// 四点组合个数.
    pub combinations: usize,

    /// 拟合成功的组合个数.
    pub fitted: usize,

    /// 通过搜索阶段过滤的椭球个数.
    pub candidates: usize,

    /// 通过最终过滤的椭球个数.
    pub ellipsoids: usize,

    /// 归属到某个椭球的前景体素个数.
    pub assigned_voxels: usize,
}

impl EfSummary {
    /// 已归属体素占前景体素的百分比. 没有前景时为 0.
    pub fn filling_percentage(&self) -> f64 {
        if self.foreground_voxels == 0 {
            return 0.0;
        }
        100.0 * self.assigned_voxels as f64 / self.foreground_voxels as f64
    }

    /// 没有找到任何椭球时, 返回最早出现空集的阶段.
    pub fn empty_reason(&self) -> Option<NoEllipsoidReason> {
        use NoEllipsoidReason::*;
        if self.foreground_voxels == 0 {
            Some(EmptyForeground)
        } else if self.seeds == 0 {
            Some(NoSeeds)
        } else if self.combinations == 0 {
            Some(NoCombinations)
        } else if self.fitted == 0 {
            Some(NoFit)
        } else if self.ellipsoids == 0 {
            Some(AllRejected)
        } else {
            None
        }
    }
}

/// 流水线输出. 三维图像的形状与输入一致, 按 `(z, h, w)` 组织.
#[derive(Debug, Clone)]
pub struct EfOutput {
    /// 按体积降序排列的椭球. 身份图像中的下标指向这里.
    pub ellipsoids: Vec<Ellipsoid>,

    /// 种子点.
    pub seed_points: Vec<Vec3>,

    /// 种子掩膜.
    pub seed_mask: Array3<u8>,

    /// 身份图像, 未归属为 `UNASSIGNED`.
    pub identity: Array3<i32>,

    /// 逐体素椭球因子, 未归属为 NaN.
    pub ef: Array3<f32>,

    /// 逐体素椭球体积, 未归属为 NaN.
    pub volume: Array3<f32>,

    /// 逐体素 `a/b`, 未归属为 NaN.
    pub a_to_b: Array3<f32>,

    /// 逐体素 `b/c`, 未归属为 NaN.
    pub b_to_c: Array3<f32>,

    /// Flinn 图 (占据为 1).
    pub flinn_plot: Array2<u8>,

    /// Flinn 峰值图 (体素计数, 可能经过高斯平滑).
    pub flinn_peak_plot: Array2<f32>,

    /// 各阶段计数.
    pub summary: EfSummary,
}

impl EfOutput {
    /// 见 [`EfSummary::empty_reason`].
    #[inline]
    pub fn empty_reason(&self) -> Option<NoEllipsoidReason> {
        self.summary.empty_reason()
    }

    /// 见 [`EfSummary::filling_percentage`].
    #[inline]
    pub fn filling_percentage(&self) -> f64 {
        self.summary.filling_percentage()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reason_order() {
        let mut s = EfSummary::default();
        assert_eq!(s.empty_reason(), Some(NoEllipsoidReason::EmptyForeground));
        assert_eq!(s.filling_percentage(), 0.0);

        s.foreground_voxels = 8;
        assert_eq!(s.empty_reason(), Some(NoEllipsoidReason::NoSeeds));
        s.seeds = 1;
        assert_eq!(s.empty_reason(), Some(NoEllipsoidReason::NoCombinations));
        s.combinations = 10;
        assert_eq!(s.empty_reason(), Some(NoEllipsoidReason::NoFit));
        s.fitted = 3;
        s.candidates = 2;
        assert_eq!(s.empty_reason(), Some(NoEllipsoidReason::AllRejected));
        s.ellipsoids = 1;
        assert_eq!(s.empty_reason(), None);

        s.assigned_voxels = 2;
        assert_eq!(s.filling_percentage(), 25.0);
    }
}
