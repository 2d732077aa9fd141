use std::ops::Index;

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use crate::consts::gray::*;
use crate::{Idx3d, Vec3};

pub mod phantom;

/// 三维二值骨图像. 体素值以 `u8` 保存, 大于 0 即为前景.
///
/// 数据按 `(z, h, w)` 组织, 即 `(k, j, i)`. 以后均按照该模式访问.
/// 连续空间中体素 `(i, j, k)` 占据以 `(i + 0.5, j + 0.5, k + 0.5)`
/// 为中心的单位立方体.
#[derive(Debug, Clone)]
pub struct BoneLabel {
    data: Array3<u8>,
}

impl Index<Idx3d> for BoneLabel {
    type Output = u8;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl BoneLabel {
    /// 直接以 `(z, h, w)` 格式的数据创建.
    #[inline]
    pub fn new(data: Array3<u8>) -> Self {
        Self { data }
    }

    /// 以 `(x, y, z)` 即 \[W, H, D\] 格式的数据创建. 内部会转换成 `(z, h, w)`.
    pub fn from_xyz(data: Array3<u8>) -> Self {
        // [W, H, D] -> [D, H, W]
        let data = data.permuted_axes([2, 1, 0]);
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().to_owned()
        };
        debug_assert!(data.is_standard_layout());
        Self { data }
    }

    /// 按 `(z, h, w)` 形状和谓词 `f` 创建. `f` 返回 `true` 的位置为前景.
    pub fn from_shape_fn<F>(shape: Idx3d, mut f: F) -> Self
    where
        F: FnMut(Idx3d) -> bool,
    {
        let data = Array3::from_shape_fn(shape, |pos| {
            if f(pos) {
                FOREGROUND
            } else {
                BACKGROUND
            }
        });
        Self { data }
    }

    /// 获取数据形状大小 `(z, h, w)`.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.data.dim()
    }

    /// 是否存在为 0 的维度.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 连续坐标 `p` 所在体素的索引 (向下取整). 越界或坐标非有限时返回 `None`.
    pub fn voxel_of(&self, p: &Vec3) -> Option<Idx3d> {
        if !p.iter().all(|v| v.is_finite() && *v >= 0.0) {
            return None;
        }
        let pos = (p.z.floor() as usize, p.y.floor() as usize, p.x.floor() as usize);
        self.check(&pos).then_some(pos)
    }

    /// 体素 `pos` 的中心在连续空间中的坐标.
    #[inline]
    pub fn voxel_center((z, h, w): Idx3d) -> Vec3 {
        Vec3::new(w as f64 + 0.5, h as f64 + 0.5, z as f64 + 0.5)
    }

    /// 判断体素 `pos` 是否为前景. 越界时 panic.
    #[inline]
    pub fn is_foreground(&self, pos: Idx3d) -> bool {
        is_foreground(self[pos])
    }

    /// 连续坐标 `p` 所在体素是否为前景. 越界时返回 `None`.
    #[inline]
    pub fn foreground_at(&self, p: &Vec3) -> Option<bool> {
        self.voxel_of(p).map(|pos| self.is_foreground(pos))
    }

    /// 获取前景体素个数.
    #[inline]
    pub fn count_foreground(&self) -> usize {
        self.data.iter().filter(|p| is_foreground(**p)).count()
    }

    /// 收集所有前景体素对应的下标. 结果按行优先存储.
    pub fn foreground_pos(&self) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, pixel)| is_foreground(*pixel).then_some(pos))
            .collect()
    }

    /// 获取 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, u8> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }
}
