//! 消融实验用的合成体模.

use ef_berry::prelude::*;
use std::env;

/// 默认体模边长 (体素).
const DEFAULT_SIZE: usize = 24;

/// 获取体模边长.
///
/// 1. 若环境变量 `$EF_PHANTOM_SIZE` 是不小于 12 的整数, 则返回其值;
/// 2. 否则, 返回 24.
pub fn size_from_env() -> usize {
    env::var("EF_PHANTOM_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n >= 12)
        .unwrap_or(DEFAULT_SIZE)
}

/// 边长为 `n` 的立方体中的三种典型结构: 球, 沿 x 的杆, 法向为 z 的板.
pub fn standard(n: usize) -> [(&'static str, BoneLabel); 3] {
    let shape = (n, n, n);
    let mid = n as f64 / 2.0;
    let r = n as f64 / 4.0;
    [
        ("sphere", phantom::sphere(shape, Vec3::new(mid, mid, mid), r + 1.0)),
        ("rod", phantom::rod_x(shape, (mid, mid), r)),
        ("plate", phantom::plate_z(shape, mid, r)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_non_empty() {
        for (name, label) in standard(12) {
            assert!(label.count_foreground() > 0, "{name}");
            assert_eq!(label.shape(), (12, 12, 12));
        }
    }
}
