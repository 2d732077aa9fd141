//! 椭球构造与采样错误.

use std::fmt;

/// 构造, 修改椭球或在其表面采样时的错误.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EllipsoidError {
    /// 半径不是有限正数.
    InvalidRadius,

    /// 半径违反 `a <= b <= c` 的顺序.
    MisorderedRadius,

    /// 方向向量两两之间不正交.
    NonOrthogonal,

    /// 方向向量 (或半轴向量) 长度为 0 或非有限.
    DegenerateAxis,

    /// 尚未调用 `init_sampling` 就开始采样.
    NotInitialized,
}

impl fmt::Display for EllipsoidError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRadius => write!(f, "radius must be a finite positive number"),
            Self::MisorderedRadius => write!(f, "radii must satisfy a <= b <= c"),
            Self::NonOrthogonal => write!(f, "orientation vectors must be orthogonal"),
            Self::DegenerateAxis => write!(f, "orientation vectors must be finite and non-zero"),
            Self::NotInitialized => write!(f, "sampling has not been initialized"),
        }
    }
}

impl std::error::Error for EllipsoidError {}
