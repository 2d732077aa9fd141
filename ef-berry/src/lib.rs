#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 在三维二值骨小梁图像上计算逐体素的椭球因子 (Ellipsoid Factor, EF).
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 算法流程
//!
//! 1. 对前景做欧氏距离变换, 以 `close(D) - open(D)` 作为脊响应, 按最大值的百分比阈值化得到种子点;
//! 2. 从每个种子点沿球面螺旋方向和六个坐标轴方向发射射线, 找到第一个背景位置 (接触点);
//! 3. 以接触点的所有四元组合为切平面约束, 拟合以种子为中心的局部最大椭球;
//! 4. 过滤掉伸出前景的椭球, 并按体积从大到小稳定排序;
//! 5. 每个前景体素归属于包含它的最大椭球, 由此得到 EF / 体积 / 轴比图像以及 Flinn 图.
//!
//! # 注意
//!
//! 1. 外部协作者 (距离变换, 形态学开闭运算, 局部椭球拟合, 椭球表面采样)
//!   均以 trait 的形式注入, crate 为每一个都提供了默认实现.
//! 2. 在非期望情况下 (例如非法参数), 程序会直接 panic, 而不会导致内存错误.
//!   椭球构造错误和输入图像错误则以 `Result` 返回.
//!
//! # 开发计划
//!
//! ### 椭球值类型 ✅
//!
//! 半径有序, 方向矩阵正交归一. 实现位于 `ef-berry/src/ellipsoid`.
//!
//! ### 球面螺旋采样 ✅
//!
//! 实现位于 `ef-berry/src/sphere.rs`.
//!
//! ### 脊点种子提取 ✅
//!
//! 三维灰度形态学与距离变换位于 `ef-berry/src/morph`,
//! 种子提取位于 `ef-berry/src/seed.rs`.
//!
//! ### 射线投射与四点组合 ✅
//!
//! 实现位于 `ef-berry/src/ray.rs` 与 `ef-berry/src/combination.rs`.
//!
//! ### 切平面约束的局部椭球拟合 ✅
//!
//! 实现位于 `ef-berry/src/fit.rs`.
//!
//! ### 前景包含过滤, 体素归属, Flinn 图 ✅
//!
//! 实现位于 `ef-berry/src/containment.rs`, `ef-berry/src/assign.rs`
//! 和 `ef-berry/src/flinn.rs`.
//!
//! ### 各向异性体素 ⌛️
//!
//! 目前假定体素各向同性, 所有长度均以体素为单位.

/// 三维索引, 按 `(z, h, w)` 即 `(k, j, i)` 组织.
pub type Idx3d = (usize, usize, usize);

/// 二维索引, 按 `(h, w)` 组织.
pub type Idx2d = (usize, usize);

/// 连续空间中的三维点 / 向量, 分量为 `(x, y, z)`.
pub type Vec3 = nalgebra::Vector3<f64>;

/// 3×3 矩阵. 用作椭球的方向矩阵.
pub type Mat3 = nalgebra::Matrix3<f64>;

pub mod consts;

/// 三维二值骨图像与合成体模.
mod data;

pub use data::{phantom, BoneLabel};

pub mod ellipsoid;

pub mod sphere;

pub mod morph;

pub mod seed;

pub mod ray;

pub mod combination;

pub mod fit;

pub mod containment;

pub mod assign;

pub mod flinn;

pub mod pipeline;

pub mod prelude;
