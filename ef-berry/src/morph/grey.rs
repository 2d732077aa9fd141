use ndarray::{Array3, ArrayView3, Zip};

use super::Morphology;
use crate::Idx3d;

/// 半径为 `radius` 的离散超球结构元, 以 `(dz, dh, dw)` 偏移量表示.
///
/// 满足 `dz^2 + dh^2 + dw^2 <= radius^2`. 中心 `(0, 0, 0)` 总在其中.
pub fn sphere_offsets(radius: usize) -> Vec<(isize, isize, isize)> {
    let r = radius as isize;
    let r2 = r * r;
    let mut offsets = vec![];
    for dz in -r..=r {
        for dh in -r..=r {
            for dw in -r..=r {
                if dz * dz + dh * dh + dw * dw <= r2 {
                    offsets.push((dz, dh, dw));
                }
            }
        }
    }
    offsets
}

/// 以超球为结构元的灰度腐蚀/膨胀. 图像外部的邻居直接忽略.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereMorphology;

impl SphereMorphology {
    /// 灰度腐蚀: 结构元内的最小值.
    pub fn erode(&self, data: ArrayView3<f32>, radius: usize) -> Array3<f32> {
        rank_filter(data, &sphere_offsets(radius), f32::INFINITY, f32::min)
    }

    /// 灰度膨胀: 结构元内的最大值.
    pub fn dilate(&self, data: ArrayView3<f32>, radius: usize) -> Array3<f32> {
        rank_filter(data, &sphere_offsets(radius), f32::NEG_INFINITY, f32::max)
    }
}

impl Morphology for SphereMorphology {
    fn open(&self, data: ArrayView3<f32>, radius: usize) -> Array3<f32> {
        let eroded = self.erode(data, radius);
        self.dilate(eroded.view(), radius)
    }

    fn close(&self, data: ArrayView3<f32>, radius: usize) -> Array3<f32> {
        let dilated = self.dilate(data, radius);
        self.erode(dilated.view(), radius)
    }
}

/// 以 `pick` 在结构元覆盖的 (界内) 邻居上折叠.
fn rank_filter(
    data: ArrayView3<f32>,
    offsets: &[(isize, isize, isize)],
    init: f32,
    pick: fn(f32, f32) -> f32,
) -> Array3<f32> {
    let kernel = |(z, h, w): Idx3d| -> f32 {
        offsets
            .iter()
            .filter_map(|&(dz, dh, dw)| {
                let pos = (
                    z.checked_add_signed(dz)?,
                    h.checked_add_signed(dh)?,
                    w.checked_add_signed(dw)?,
                );
                data.get(pos).copied()
            })
            .fold(init, pick)
    };

    let mut out = Array3::<f32>::zeros(data.dim());
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::indexed(&mut out).par_for_each(|pos, v| *v = kernel(pos));
        } else {
            Zip::indexed(&mut out).for_each(|pos, v| *v = kernel(pos));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_offsets() {
        assert_eq!(sphere_offsets(0), vec![(0, 0, 0)]);
        assert_eq!(sphere_offsets(1).len(), 7);
        // 半径 2: 1 + 6 + 12 + 8 + 6 = 33
        assert_eq!(sphere_offsets(2).len(), 33);
    }

    #[test]
    fn test_single_peak() {
        let mut data = Array3::<f32>::zeros((5, 5, 5));
        data[(2, 2, 2)] = 3.0;
        let m = SphereMorphology;

        let dilated = m.dilate(data.view(), 1);
        assert_eq!(dilated[(2, 2, 3)], 3.0);
        assert_eq!(dilated[(2, 3, 3)], 0.0);
        assert_eq!(dilated.iter().filter(|v| **v == 3.0).count(), 7);

        // 孤立的峰会被开运算削掉, 闭运算保留它
        assert!(m.open(data.view(), 1).iter().all(|v| *v == 0.0));
        assert_eq!(m.close(data.view(), 1), data);
    }

    #[test]
    fn test_border_neighbours_ignored() {
        let data = Array3::<f32>::from_elem((3, 3, 3), 2.0);
        let m = SphereMorphology;
        assert_eq!(m.erode(data.view(), 2), data);
        assert_eq!(m.dilate(data.view(), 2), data);
    }
}
