//! 椭球值类型.
//!
//! 不允许退化情形 (例如某个半径为 0 的圆盘). 三个半径始终满足 `a <= b <= c`,
//! 方向矩阵的三列依次是 `a`, `b`, `c` 对应半轴的单位方向.

mod error;
mod sampling;

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::consts::ORTHOGONALITY_EPS;
use crate::{Mat3, Vec3};

pub use error::EllipsoidError;
pub use sampling::{IsotropicSampler, SurfaceSampler};

/// 椭球运行时错误.
pub type EllipsoidResult<T> = Result<T, EllipsoidError>;

#[inline]
fn valid_radius(r: f64) -> bool {
    r > 0.0 && r.is_finite()
}

/// 检查 `u, v, w` 两两正交且非退化, 归一化后作为三列返回.
fn orthonormal_frame(u: &Vec3, v: &Vec3, w: &Vec3) -> EllipsoidResult<Mat3> {
    let axes = [u, v, w];
    if axes
        .iter()
        .any(|x| !x.iter().all(|c| c.is_finite()) || x.norm() == 0.0)
    {
        return Err(EllipsoidError::DegenerateAxis);
    }
    if u.dot(v).abs() > ORTHOGONALITY_EPS
        || u.dot(w).abs() > ORTHOGONALITY_EPS
        || v.dot(w).abs() > ORTHOGONALITY_EPS
    {
        return Err(EllipsoidError::NonOrthogonal);
    }
    Ok(Mat3::from_columns(&[u.normalize(), v.normalize(), w.normalize()]))
}

/// 三维椭球.
///
/// 形状 (半径与方向) 只能通过会重新校验不变量的 setter 修改.
#[derive(Clone)]
pub struct Ellipsoid {
    a: f64,
    b: f64,
    c: f64,
    centroid: Vec3,
    orientation: Mat3,
    sampler: Option<Arc<dyn SurfaceSampler>>,
}

impl fmt::Debug for Ellipsoid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ellipsoid")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("c", &self.c)
            .field("centroid", &self.centroid)
            .field("orientation", &self.orientation)
            .field("sampling", &self.sampler.is_some())
            .finish()
    }
}

impl Ellipsoid {
    /// 以三个半径构造椭球, 半径会被排序. 方向为单位矩阵, 中心位于原点.
    ///
    /// 任一半径非有限或不为正时返回 `Err(InvalidRadius)`.
    pub fn new(a: f64, b: f64, c: f64) -> EllipsoidResult<Self> {
        let mut radii = [a, b, c];
        if !radii.iter().all(|r| valid_radius(*r)) {
            return Err(EllipsoidError::InvalidRadius);
        }
        radii.sort_by(f64::total_cmp);
        let [a, b, c] = radii;
        Ok(Self {
            a,
            b,
            c,
            centroid: Vec3::zeros(),
            orientation: Mat3::identity(),
            sampler: None,
        })
    }

    /// 以三个半轴向量构造椭球.
    ///
    /// 半轴按长度升序排列: 最短者的长度为 `a`, 方向成为方向矩阵的第一列, 依此类推.
    /// 向量不正交时返回 `Err(NonOrthogonal)`.
    pub fn from_semi_axes(u: &Vec3, v: &Vec3, w: &Vec3) -> EllipsoidResult<Self> {
        let mut axes = [*u, *v, *w];
        axes.sort_by(|p, q| p.norm().total_cmp(&q.norm()));
        let radii = axes.map(|x| x.norm());
        if !radii.iter().all(|r| valid_radius(*r)) {
            return Err(EllipsoidError::InvalidRadius);
        }
        let orientation = orthonormal_frame(&axes[0], &axes[1], &axes[2])?;
        let [a, b, c] = radii;
        Ok(Self {
            a,
            b,
            c,
            centroid: Vec3::zeros(),
            orientation,
            sampler: None,
        })
    }

    /// 最短半径.
    #[inline]
    pub fn a(&self) -> f64 {
        self.a
    }

    /// 中间半径.
    #[inline]
    pub fn b(&self) -> f64 {
        self.b
    }

    /// 最长半径.
    #[inline]
    pub fn c(&self) -> f64 {
        self.c
    }

    /// 按升序返回 `[a, b, c]`.
    #[inline]
    pub fn radii(&self) -> [f64; 3] {
        [self.a, self.b, self.c]
    }

    /// 设置最短半径. 要求 `a <= b`.
    pub fn set_a(&mut self, a: f64) -> EllipsoidResult<()> {
        if !valid_radius(a) {
            return Err(EllipsoidError::InvalidRadius);
        }
        if a > self.b {
            return Err(EllipsoidError::MisorderedRadius);
        }
        self.a = a;
        Ok(())
    }

    /// 设置中间半径. 要求 `a <= b <= c`.
    pub fn set_b(&mut self, b: f64) -> EllipsoidResult<()> {
        if !valid_radius(b) {
            return Err(EllipsoidError::InvalidRadius);
        }
        if b < self.a || b > self.c {
            return Err(EllipsoidError::MisorderedRadius);
        }
        self.b = b;
        Ok(())
    }

    /// 设置最长半径. 要求 `c >= b`.
    pub fn set_c(&mut self, c: f64) -> EllipsoidResult<()> {
        if !valid_radius(c) {
            return Err(EllipsoidError::InvalidRadius);
        }
        if c < self.b {
            return Err(EllipsoidError::MisorderedRadius);
        }
        self.c = c;
        Ok(())
    }

    /// 椭球中心 (副本).
    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.centroid
    }

    /// 设置椭球中心.
    #[inline]
    pub fn set_centroid(&mut self, centroid: &Vec3) {
        self.centroid = *centroid;
    }

    /// 消费自我, 返回中心被移动到 `centroid` 的椭球.
    #[inline]
    pub fn with_centroid(mut self, centroid: Vec3) -> Self {
        self.centroid = centroid;
        self
    }

    /// 方向矩阵 (副本). 三列依次是 `a`, `b`, `c` 对应半轴的单位方向.
    ///
    /// # 注意
    ///
    /// 三列可能构成左手系.
    #[inline]
    pub fn orientation(&self) -> Mat3 {
        self.orientation
    }

    /// 设置方向. `u`, `v`, `w` 分别对应 `a`, `b`, `c`, 归一化后保存.
    ///
    /// 向量两两点积的绝对值超过 `1e-12` 时返回 `Err(NonOrthogonal)`.
    pub fn set_orientation(&mut self, u: &Vec3, v: &Vec3, w: &Vec3) -> EllipsoidResult<()> {
        self.orientation = orthonormal_frame(u, v, w)?;
        Ok(())
    }

    /// 以矩阵的三列设置方向. 见 [`Self::set_orientation`].
    pub fn set_orientation_matrix(&mut self, m: &Mat3) -> EllipsoidResult<()> {
        let (u, v, w) = (m.column(0), m.column(1), m.column(2));
        self.set_orientation(&u.into_owned(), &v.into_owned(), &w.into_owned())
    }

    /// 以半径缩放后的三个方向列向量.
    pub fn semi_axes(&self) -> [Vec3; 3] {
        let radii = self.radii();
        [0, 1, 2].map(|i| self.orientation.column(i) * radii[i])
    }

    /// 椭球体积.
    #[inline]
    pub fn volume(&self) -> f64 {
        4.0 / 3.0 * PI * self.a * self.b * self.c
    }

    /// 椭球因子 `a/b - b/c`. 板状为负, 杆状为正.
    #[inline]
    pub fn ellipsoid_factor(&self) -> f64 {
        self.a / self.b - self.b / self.c
    }

    /// 轴比 `a/b`.
    #[inline]
    pub fn a_to_b(&self) -> f64 {
        self.a / self.b
    }

    /// 轴比 `b/c`.
    #[inline]
    pub fn b_to_c(&self) -> f64 {
        self.b / self.c
    }

    /// 点 `p` 是否严格位于椭球内部. 恰好在表面上的点不算在内.
    ///
    /// 先用最长半径 `c` 做快速排除.
    pub fn contains(&self, p: &Vec3) -> bool {
        let d = p - self.centroid;
        let c = self.c;
        if d.x.abs() > c || d.y.abs() > c || d.z.abs() > c {
            return false;
        }
        if d.norm_squared() > c * c {
            return false;
        }
        // 转到椭球的局部坐标系
        let l = self.orientation.tr_mul(&d);
        (l.x / self.a).powi(2) + (l.y / self.b).powi(2) + (l.z / c).powi(2) < 1.0
    }

    /// 初始化表面采样器.
    #[inline]
    pub fn init_sampling(&mut self, sampler: Arc<dyn SurfaceSampler>) {
        self.sampler = Some(sampler);
    }

    /// 在椭球表面采样 `n` 个点. 点会被旋转到椭球方向并平移到中心.
    ///
    /// 尚未调用 [`Self::init_sampling`] 时返回 `Err(NotInitialized)`.
    pub fn sample_points(&self, n: usize) -> EllipsoidResult<Vec<Vec3>> {
        let sampler = self
            .sampler
            .as_ref()
            .ok_or(EllipsoidError::NotInitialized)?;
        let mut points = sampler.sample(self.radii(), n);
        for p in points.iter_mut() {
            *p = self.orientation * *p + self.centroid;
        }
        Ok(points)
    }
}
