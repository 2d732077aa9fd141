use std::fmt;

/// 流水线的致命错误.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EfError {
    /// 输入图像存在长度为 0 的维度.
    MalformedGrid,

    /// 注入的距离变换或形态学算子返回了与输入形状不同的图像.
    ShapeMismatch,
}

impl fmt::Display for EfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedGrid => write!(f, "input grid has a zero-length dimension"),
            Self::ShapeMismatch => write!(f, "collaborator returned a grid of the wrong shape"),
        }
    }
}

impl std::error::Error for EfError {}
