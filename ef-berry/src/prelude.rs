//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d, Mat3, Vec3};

pub use crate::{phantom, BoneLabel};

pub use crate::consts::gray::{BACKGROUND, FOREGROUND};
pub use crate::consts::UNASSIGNED;

pub use crate::ellipsoid::{Ellipsoid, EllipsoidError, IsotropicSampler, SurfaceSampler};
pub use crate::sphere::generalized_spiral_points;

pub use crate::fit::{LocalEllipsoidFitter, TangentPlaneFitter};
pub use crate::morph::{DistanceTransform, EuclideanDistance, Morphology, SphereMorphology};

pub use crate::pipeline::{EfConfig, EfError, EfOutput, EfSummary, EllipsoidFactor, NoEllipsoidReason};
