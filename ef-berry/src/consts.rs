//! 通用常量.

/// 单通道体素值.
pub mod gray {
    /// 背景体素值.
    pub const BACKGROUND: u8 = 0;

    /// 二值化后前景体素的规范值. 输入中任意大于 0 的值都视为前景.
    pub const FOREGROUND: u8 = 1;

    /// 体素是否是前景?
    #[inline]
    pub const fn is_foreground(p: u8) -> bool {
        p > BACKGROUND
    }

    /// 体素是否是背景?
    #[inline]
    pub const fn is_background(p: u8) -> bool {
        !is_foreground(p)
    }
}

/// 椭球身份图像中 "未归属任何椭球" 的哨兵值.
pub const UNASSIGNED: i32 = -1;

/// 包含性检测时, 椭球三个半径统一收缩的量, 即单位体素的对角线长度 `√3`.
pub const AXIS_REDUCTION: f64 = 1.732_050_807_568_877_2;

/// 设置椭球方向时, 判定两个向量正交所允许的点积上限.
pub const ORTHOGONALITY_EPS: f64 = 1e-12;

/// 默认配置.
pub mod defaults {
    /// 脊响应阈值占最大值的比例.
    pub const RIDGE_THRESHOLD: f64 = 0.8;

    /// 开闭运算所用超球结构元的半径 (单位: 体素).
    pub const RIDGE_RADIUS: usize = 2;

    /// Flinn 峰值图高斯平滑的标准差. 0 表示不平滑.
    pub const SIGMA: f64 = 0.0;

    /// 射线投射所用的螺旋方向个数 (另外还会附加六个坐标轴方向).
    pub const RAY_DIRECTIONS: usize = 12;

    /// 搜索阶段快速包含性过滤的螺旋方向个数.
    pub const SEARCH_FILTER_DIRECTIONS: usize = 12;

    /// 最终包含性过滤的螺旋方向个数.
    pub const FILTER_DIRECTIONS: usize = 100;

    /// Flinn 图边长. 过小会导致多个椭球落入同一格.
    pub const FLINN_SIZE: usize = 501;
}
