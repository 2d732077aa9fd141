use ndarray::{Array3, ArrayViewMut1, Axis, Zip};

use super::DistanceTransform;
use crate::consts::gray::is_foreground;
use crate::BoneLabel;

/// 精确欧氏距离变换 (Felzenszwalb & Huttenlocher, 2012).
///
/// 依次沿 `w`, `h`, `z` 做一维平方距离变换. 图像外部一律视为背景,
/// 所以贴着边界的前景体素距离不超过 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl DistanceTransform for EuclideanDistance {
    fn distance(&self, label: &BoneLabel) -> Array3<f32> {
        let mut sq = label
            .data()
            .mapv(|p| if is_foreground(p) { f64::INFINITY } else { 0.0 });
        for axis in [2, 1, 0] {
            transform_axis(&mut sq, axis);
        }
        sq.mapv(|d| d.sqrt() as f32)
    }
}

#[inline]
fn sq(v: f64) -> f64 {
    v * v
}

/// 对 `data` 中沿 `axis` 的每一条线做一维变换.
fn transform_axis(data: &mut Array3<f64>, axis: usize) {
    let op = |mut lane: ArrayViewMut1<f64>| {
        let f = lane.to_vec();
        let mut d = vec![0.0; f.len()];
        lower_envelope(&f, &mut d);
        lane.iter_mut().zip(d).for_each(|(x, v)| *x = v);
    };

    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::from(data.lanes_mut(Axis(axis))).par_for_each(op);
        } else {
            Zip::from(data.lanes_mut(Axis(axis))).for_each(op);
        }
    }
}

/// 一维平方距离变换 `out[q] = min_p (q - p)^2 + f[p]`.
///
/// 非有限的 `f[p]` 不参与下包络. 线两端外侧各有一个虚拟背景点 (`-1` 与 `n`).
fn lower_envelope(f: &[f64], out: &mut [f64]) {
    let n = f.len();
    // v: 下包络中各抛物线的顶点; z: 各抛物线起作用的左边界
    let mut v: Vec<usize> = Vec::with_capacity(n);
    let mut z: Vec<f64> = Vec::with_capacity(n);

    for q in (0..n).filter(|&q| f[q].is_finite()) {
        let fq = f[q] + sq(q as f64);
        let s = loop {
            let Some(&p) = v.last() else {
                break f64::NEG_INFINITY;
            };
            let s = (fq - (f[p] + sq(p as f64))) / (2.0 * (q - p) as f64);
            if s <= z[z.len() - 1] {
                v.pop();
                z.pop();
            } else {
                break s;
            }
        };
        v.push(q);
        z.push(s);
    }

    let mut k = 0;
    for (q, d) in out.iter_mut().enumerate() {
        let pad = sq((q + 1) as f64).min(sq((n - q) as f64));
        if v.is_empty() {
            *d = pad;
            continue;
        }
        while k + 1 < v.len() && z[k + 1] < q as f64 {
            k += 1;
        }
        let p = v[k];
        *d = (sq(q as f64 - p as f64) + f[p]).min(pad);
    }
}
