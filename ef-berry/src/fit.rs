//! 局部椭球拟合.
//!
//! 流水线只依赖 [`LocalEllipsoidFitter`]. 拟合失败返回 `None`, 对应组合被直接丢弃.

use nalgebra::SymmetricEigen;

use crate::combination::ContactPoint;
use crate::ellipsoid::Ellipsoid;
use crate::{Mat3, Vec3};

/// 四点切平面约束下的局部椭球拟合.
pub trait LocalEllipsoidFitter: Send + Sync {
    /// 以 `center` 为中心, 在四个接触点的切平面约束下拟合椭球.
    ///
    /// 返回的椭球位于每个切平面的前景一侧 (法向所指的一侧). 约束不可行时返回 `None`.
    fn fit(&self, contacts: &[ContactPoint; 4], center: &Vec3) -> Option<Ellipsoid>;
}

/// 维度.
const DIM: f64 = 3.0;

/// 接触点到中心的有向距离下限.
const MIN_OFFSET: f64 = 1e-9;

/// 四个约束方向的 (归一化) Gram 矩阵行列式下限. 低于它视为共面.
const COPLANAR_EPS: f64 = 1e-10;

/// 默认拟合器: 中心固定, 体积最大的内切椭球.
///
/// 接触点 `p_i` 与内法向 `n_i` 给出半空间 `n_i · (x - p_i) >= 0`.
/// 记 `r_i = n_i · (center - p_i)`, `q_i = n_i / r_i`, 椭球
/// `{center + M u : |u| <= 1}` 位于全部半空间内当且仅当 `q_i^T P q_i <= 1`,
/// 其中 `P = M^2`. 最大化 `log det P` 等价于点集 `{q_i}` 的 D-最优设计,
/// 这里用乘性权重迭代 (Titterington, 1976) 求解.
#[derive(Debug, Clone, Copy)]
pub struct TangentPlaneFitter {
    max_iterations: usize,
    tolerance: f64,
}

impl Default for TangentPlaneFitter {
    fn default() -> Self {
        Self::new(200, 1e-6)
    }
}

impl TangentPlaneFitter {
    /// 最多迭代 `max_iterations` 次, 最大杠杆值与维度之比和 1 相差小于 `tolerance` 时停止.
    ///
    /// # 注意
    ///
    /// `tolerance` 必须为正, 否则程序 panic.
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        assert!(tolerance > 0.0);
        Self {
            max_iterations,
            tolerance,
        }
    }

    /// 求解 `P`. 约束退化时返回 `None`.
    fn solve(&self, q: &[Vec3; 4]) -> Option<Mat3> {
        let mut u = [0.25; 4];

        let g = gram(q, &u);
        let scale = g.trace() / DIM;
        if !(g.determinant() > COPLANAR_EPS * scale.powi(3)) {
            return None;
        }

        for _ in 0..self.max_iterations {
            let lev = leverages(q, &gram(q, &u).try_inverse()?);
            let worst = lev.iter().copied().fold(0.0, f64::max) / DIM;
            if worst - 1.0 < self.tolerance {
                break;
            }
            u.iter_mut().zip(lev).for_each(|(w, l)| *w *= l / DIM);
        }

        // 加权平均杠杆值恰为 DIM, 所以 worst >= 1. 缩放后最紧的约束恰好相切.
        let g_inv = gram(q, &u).try_inverse()?;
        let worst = leverages(q, &g_inv).iter().copied().fold(0.0, f64::max) / DIM;
        Some(g_inv / (DIM * worst))
    }
}

/// `G = Σ u_i q_i q_i^T`.
fn gram(q: &[Vec3; 4], u: &[f64; 4]) -> Mat3 {
    q.iter()
        .zip(u)
        .fold(Mat3::zeros(), |acc, (qi, w)| acc + qi * qi.transpose() * *w)
}

/// `q_i^T G^{-1} q_i`.
fn leverages(q: &[Vec3; 4], g_inv: &Mat3) -> [f64; 4] {
    q.map(|qi| qi.dot(&(g_inv * qi)))
}

impl LocalEllipsoidFitter for TangentPlaneFitter {
    fn fit(&self, contacts: &[ContactPoint; 4], center: &Vec3) -> Option<Ellipsoid> {
        let mut q = [Vec3::zeros(); 4];
        for (qi, c) in q.iter_mut().zip(contacts) {
            let n = c.normal;
            if !n.iter().all(|v| v.is_finite()) || n.norm() < MIN_OFFSET {
                return None;
            }
            let r = n.dot(&(center - c.point));
            if !(r > MIN_OFFSET * n.norm()) {
                return None;
            }
            *qi = n / r;
        }

        let p = self.solve(&q)?;
        let eigen = SymmetricEigen::new(p);
        let mut order = [0, 1, 2];
        order.sort_by(|i, j| eigen.eigenvalues[*i].total_cmp(&eigen.eigenvalues[*j]));
        if !(eigen.eigenvalues[order[0]] > 0.0) {
            return None;
        }

        let radii = order.map(|i| eigen.eigenvalues[i].sqrt());
        let mut e = Ellipsoid::new(radii[0], radii[1], radii[2]).ok()?;

        // 特征向量再做一次 Gram-Schmidt, 保证正交性在容差之内
        let u = eigen.eigenvectors.column(order[0]).normalize();
        let v = eigen.eigenvectors.column(order[1]);
        let v = (v - u * u.dot(&v)).try_normalize(f64::EPSILON)?;
        let w = u.cross(&v);
        e.set_orientation(&u, &v, &w).ok()?;
        Some(e.with_centroid(*center))
    }
}
