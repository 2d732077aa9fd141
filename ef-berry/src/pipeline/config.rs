#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::defaults::*;

/// 流水线配置. 所有 setter 在参数非法时 panic.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EfConfig {
    ridge_threshold: f64,
    ridge_radius: usize,
    sigma: f64,
    ray_directions: usize,
    search_filter_directions: usize,
    filter_directions: usize,
    flinn_size: usize,
}

impl Default for EfConfig {
    fn default() -> Self {
        Self {
            ridge_threshold: RIDGE_THRESHOLD,
            ridge_radius: RIDGE_RADIUS,
            sigma: SIGMA,
            ray_directions: RAY_DIRECTIONS,
            search_filter_directions: SEARCH_FILTER_DIRECTIONS,
            filter_directions: FILTER_DIRECTIONS,
            flinn_size: FLINN_SIZE,
        }
    }
}

impl EfConfig {
    /// 脊响应阈值占最大值的比例, 位于 `[0, 1]`.
    pub fn with_ridge_threshold(mut self, threshold: f64) -> Self {
        assert!((0.0..=1.0).contains(&threshold));
        self.ridge_threshold = threshold;
        self
    }

    /// 开闭运算超球结构元的半径.
    pub fn with_ridge_radius(mut self, radius: usize) -> Self {
        self.ridge_radius = radius;
        self
    }

    /// Flinn 峰值图的高斯平滑标准差. 0 表示不平滑.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        assert!(sigma >= 0.0 && sigma.is_finite());
        self.sigma = sigma;
        self
    }

    /// 射线投射的螺旋方向个数, 必须大于 2.
    pub fn with_ray_directions(mut self, n: usize) -> Self {
        assert!(n > 2);
        self.ray_directions = n;
        self
    }

    /// 搜索阶段包含性过滤的螺旋方向个数, 必须大于 2.
    pub fn with_search_filter_directions(mut self, n: usize) -> Self {
        assert!(n > 2);
        self.search_filter_directions = n;
        self
    }

    /// 最终包含性过滤的螺旋方向个数, 必须大于 2.
    pub fn with_filter_directions(mut self, n: usize) -> Self {
        assert!(n > 2);
        self.filter_directions = n;
        self
    }

    /// Flinn 图边长, 必须为正.
    pub fn with_flinn_size(mut self, size: usize) -> Self {
        assert!(size > 0);
        self.flinn_size = size;
        self
    }

    /// 见 [`Self::with_ridge_threshold`].
    #[inline]
    pub fn ridge_threshold(&self) -> f64 {
        self.ridge_threshold
    }

    /// 见 [`Self::with_ridge_radius`].
    #[inline]
    pub fn ridge_radius(&self) -> usize {
        self.ridge_radius
    }

    /// 见 [`Self::with_sigma`].
    #[inline]
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// 见 [`Self::with_ray_directions`].
    #[inline]
    pub fn ray_directions(&self) -> usize {
        self.ray_directions
    }

    /// 见 [`Self::with_search_filter_directions`].
    #[inline]
    pub fn search_filter_directions(&self) -> usize {
        self.search_filter_directions
    }

    /// 见 [`Self::with_filter_directions`].
    #[inline]
    pub fn filter_directions(&self) -> usize {
        self.filter_directions
    }

    /// 见 [`Self::with_flinn_size`].
    #[inline]
    pub fn flinn_size(&self) -> usize {
        self.flinn_size
    }
}
