//! 球面方向采样.
//!
//! 广义螺旋点集参考 Rakhmanov et al., 1994 (见 Saff & Kuijlaars, 1997,
//! doi:10.1007/BF03024331), 但下标 `k` 左移一位以方便索引.

use std::f64::consts::TAU;

use crate::Vec3;

/// 递推计算第 `k` 个点的方位角. 输入均为正, 因此可以直接用 `floor` 取模.
#[inline]
fn phi_by_recursion(n: f64, phi_prev: f64, h: f64) -> f64 {
    let phi = phi_prev + 3.6 / n.sqrt() / (1.0 - h * h).sqrt();
    phi - (phi / TAU).floor() * TAU
}

/// 生成单位球面上近似均匀分布的 `n` 个单位向量. 结果只取决于 `n`.
///
/// 第一个和最后一个点的方位角均为 0, 分别位于南极和北极.
///
/// # 注意
///
/// 要求 `n > 2`, 否则程序 panic.
pub fn generalized_spiral_points(n: usize) -> Vec<Vec3> {
    assert!(n > 2, "至少需要三个螺旋点");

    let nf = n as f64;
    let height = |k: usize| -1.0 + 2.0 * k as f64 / (nf - 1.0);

    let mut phi = Vec::with_capacity(n);
    phi.push(0.0);
    for k in 1..n - 1 {
        phi.push(phi_by_recursion(nf, phi[k - 1], height(k)));
    }
    phi.push(0.0);

    phi.into_iter()
        .enumerate()
        .map(|(k, phi)| {
            let theta = height(k).acos();
            Vec3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            )
        })
        .collect()
}

/// 六个坐标轴方向, 顺序为 `+x, +y, +z, -x, -y, -z`.
pub fn axis_directions() -> [Vec3; 6] {
    [
        Vec3::x(),
        Vec3::y(),
        Vec3::z(),
        -Vec3::x(),
        -Vec3::y(),
        -Vec3::z(),
    ]
}

/// 估计以 `pixel_width` 为分辨率时, 在半径 `search_radius` 的球面上不漏掉体素所需的螺旋点数.
#[inline]
pub fn estimate_spiral_points(search_radius: f64, pixel_width: f64) -> usize {
    (search_radius * 3.809 / pixel_width).powi(2).ceil() as usize
}
