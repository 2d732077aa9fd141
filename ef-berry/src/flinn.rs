//! Flinn 图.
//!
//! 横轴为 `a/b`, 纵轴为 `b/c`, 两者都量化到 `[0, size - 1]`. 纵轴翻转,
//! 即 `b/c = 1` 位于第 0 行.

use ndarray::{Array1, Array2, ArrayView3, Axis, Zip};

use crate::ellipsoid::Ellipsoid;
use crate::Idx2d;

/// 轴比 `(a/b, b/c)` 所在的格子 `(row, col)`. 比值会被截断到 `[0, 1]`, 非有限时返回 `None`.
///
/// # 注意
///
/// 要求 `size > 0`, 否则程序 panic.
pub fn flinn_cell(a_to_b: f64, b_to_c: f64, size: usize) -> Option<Idx2d> {
    assert!(size > 0);
    if !a_to_b.is_finite() || !b_to_c.is_finite() {
        return None;
    }
    let scale = (size - 1) as f64;
    let quantize = |v: f64| (v.clamp(0.0, 1.0) * scale).round() as usize;
    Some((size - 1 - quantize(b_to_c), quantize(a_to_b)))
}

#[inline]
fn cell_of(e: &Ellipsoid, size: usize) -> Option<Idx2d> {
    flinn_cell(e.a_to_b(), e.b_to_c(), size)
}

/// Flinn 图: 每个椭球所在的格子置 1.
pub fn flinn_plot(ellipsoids: &[Ellipsoid], size: usize) -> Array2<u8> {
    let mut plot = Array2::zeros((size, size));
    for cell in ellipsoids.iter().filter_map(|e| cell_of(e, size)) {
        plot[cell] = 1;
    }
    plot
}

/// Flinn 峰值图: 每个体素在其归属椭球所在的格子上计数一次.
///
/// `identity` 中的下标指向 `ellipsoids`, 负值与越界下标被忽略.
pub fn flinn_peak_plot(ellipsoids: &[Ellipsoid], identity: ArrayView3<i32>, size: usize) -> Array2<f32> {
    let mut counts = vec![0usize; ellipsoids.len()];
    for id in identity.iter() {
        if let Some(c) = usize::try_from(*id).ok().and_then(|i| counts.get_mut(i)) {
            *c += 1;
        }
    }

    let mut plot = Array2::zeros((size, size));
    for (e, n) in ellipsoids.iter().zip(counts) {
        if let Some(cell) = cell_of(e, size).filter(|_| n > 0) {
            plot[cell] += n as f32;
        }
    }
    plot
}

/// 归一化的一维高斯核, 半径为 `ceil(3 * sigma)`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (3.0 * sigma).ceil() as isize;
    let kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-((x * x) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.into_iter().map(|k| k / sum).collect()
}

/// 可分离高斯模糊. 边界按复制边缘像素处理. `sigma <= 0` 时原样返回.
pub fn gaussian_blur(plot: &Array2<f32>, sigma: f64) -> Array2<f32> {
    if !(sigma > 0.0) || plot.is_empty() {
        return plot.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let radius = (kernel.len() / 2) as isize;

    let mut out = plot.mapv(f64::from);
    for axis in [1, 0] {
        let mut next = Array2::<f64>::zeros(out.dim());
        Zip::from(next.lanes_mut(Axis(axis)))
            .and(out.lanes(Axis(axis)))
            .for_each(|mut dst, src| {
                let n = src.len() as isize;
                let src: Array1<f64> = src.to_owned();
                for (i, d) in dst.iter_mut().enumerate() {
                    *d = kernel
                        .iter()
                        .enumerate()
                        .map(|(k, w)| {
                            let j = (i as isize + k as isize - radius).clamp(0, n - 1);
                            w * src[j as usize]
                        })
                        .sum();
                }
            });
        out = next;
    }
    out.mapv(|v| v as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn f32_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_flinn_cell() {
        assert_eq!(flinn_cell(1.0, 1.0, 501), Some((0, 500)));
        assert_eq!(flinn_cell(0.0, 0.0, 501), Some((500, 0)));
        assert_eq!(flinn_cell(0.5, 0.25, 101), Some((75, 50)));
        assert_eq!(flinn_cell(1.2, -0.1, 11), Some((10, 10)));
        assert_eq!(flinn_cell(f64::NAN, 0.5, 11), None);
    }

    #[test]
    fn test_plots() {
        let sphere = Ellipsoid::new(2.0, 2.0, 2.0).unwrap();
        let rod = Ellipsoid::new(1.0, 1.0, 4.0).unwrap();
        let es = [sphere, rod.clone(), rod];

        let plot = flinn_plot(&es, 101);
        assert_eq!(plot.iter().filter(|v| **v == 1).count(), 2);
        assert_eq!(plot[(0, 100)], 1);
        assert_eq!(plot[(75, 100)], 1);

        let identity = Array3::from_shape_vec((1, 2, 4), vec![0, 0, 0, 1, 2, -1, 7, 1]).unwrap();
        let peak = flinn_peak_plot(&es, identity.view(), 101);
        assert_eq!(peak[(0, 100)], 3.0);
        assert_eq!(peak[(75, 100)], 3.0);
        assert_eq!(peak.sum(), 6.0);
    }

    #[test]
    fn test_blur_preserves_mass() {
        let mut plot = Array2::<f32>::zeros((21, 21));
        plot[(10, 10)] = 5.0;
        plot[(8, 12)] = 1.0;

        let blurred = gaussian_blur(&plot, 1.5);
        assert!(f32_eq(blurred.sum(), 6.0));
        assert!(blurred[(10, 10)] < 5.0 && blurred[(10, 11)] > 0.0);
        assert!(f32_eq(blurred[(10, 9)], blurred[(10, 11)]));

        assert_eq!(gaussian_blur(&plot, 0.0), plot);
    }

    #[test]
    fn test_kernel() {
        let k = gaussian_kernel(1.0);
        assert_eq!(k.len(), 7);
        assert!((k.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(k[3] > k[2] && (k[2] - k[4]).abs() < 1e-15);
    }
}
