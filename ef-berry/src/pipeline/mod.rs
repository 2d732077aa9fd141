//! 椭球因子流水线.
//!
//! 距离变换 -> 脊点种子 -> 射线投射与四点组合 -> 局部拟合与搜索阶段过滤
//! -> 最终过滤 -> 按体积排序 -> 体素归属与 Flinn 图.

use std::sync::Arc;

use crate::assign::{count_assigned, sort_by_volume, VoxelAssignmentEngine};
use crate::combination::CombinationBuilder;
use crate::containment::ForegroundContainmentFilter;
use crate::ellipsoid::{Ellipsoid, IsotropicSampler, SurfaceSampler};
use crate::fit::{LocalEllipsoidFitter, TangentPlaneFitter};
use crate::flinn::{flinn_peak_plot, flinn_plot, gaussian_blur};
use crate::morph::{DistanceTransform, EuclideanDistance, Morphology, SphereMorphology};
use crate::seed::RidgeSeedExtractor;
use crate::{BoneLabel, Vec3};

mod config;
mod error;
mod output;

pub use config::EfConfig;
pub use error::EfError;
pub use output::{EfOutput, EfSummary, NoEllipsoidReason};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
    }
}

/// 对 `items` 逐个求 `f`, 结果顺序与输入一致.
fn ordered_map<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }
}

/// 搜索阶段的计数与结果.
#[derive(Debug, Default)]
struct SearchResult {
    combinations: usize,
    fitted: usize,
    accepted: Vec<Ellipsoid>,
}

impl SearchResult {
    fn append(mut self, other: Self) -> Self {
        self.combinations += other.combinations;
        self.fitted += other.fitted;
        self.accepted.extend(other.accepted);
        self
    }
}

/// 椭球因子计算器. 持有配置和全部外部协作者.
pub struct EllipsoidFactor {
    config: EfConfig,
    distance: Box<dyn DistanceTransform>,
    morphology: Box<dyn Morphology>,
    fitter: Box<dyn LocalEllipsoidFitter>,
    sampler: Arc<dyn SurfaceSampler>,
}

impl Default for EllipsoidFactor {
    fn default() -> Self {
        Self::new(EfConfig::default())
    }
}

impl EllipsoidFactor {
    /// 以 `config` 与默认协作者创建.
    pub fn new(config: EfConfig) -> Self {
        Self {
            config,
            distance: Box::new(EuclideanDistance),
            morphology: Box::new(SphereMorphology),
            fitter: Box::new(TangentPlaneFitter::default()),
            sampler: Arc::new(IsotropicSampler::default()),
        }
    }

    /// 替换距离变换.
    pub fn with_distance<D: DistanceTransform + 'static>(mut self, distance: D) -> Self {
        self.distance = Box::new(distance);
        self
    }

    /// 替换形态学算子.
    pub fn with_morphology<M: Morphology + 'static>(mut self, morphology: M) -> Self {
        self.morphology = Box::new(morphology);
        self
    }

    /// 替换局部椭球拟合器.
    pub fn with_fitter<F: LocalEllipsoidFitter + 'static>(mut self, fitter: F) -> Self {
        self.fitter = Box::new(fitter);
        self
    }

    /// 替换输出椭球所用的表面采样器.
    pub fn with_sampler(mut self, sampler: Arc<dyn SurfaceSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    /// 当前配置.
    #[inline]
    pub fn config(&self) -> &EfConfig {
        &self.config
    }

    /// 逐个种子枚举组合, 拟合并做搜索阶段过滤, 只保留通过过滤的椭球.
    ///
    /// 结果按种子顺序拼接, 种子内部按组合的字典序.
    fn search(&self, label: &BoneLabel, seeds: &[Vec3]) -> SearchResult {
        let builder = CombinationBuilder::new(label, self.config.ray_directions());
        let filter = ForegroundContainmentFilter::new(label, self.config.search_filter_directions());

        let per_seed = ordered_map(seeds, |seed| {
            let combinations = builder.combinations_of(seed);
            let mut fitted = 0;
            let accepted = combinations
                .iter()
                .filter_map(|c| self.fitter.fit(&c.contacts, &c.center))
                .inspect(|_| fitted += 1)
                .filter(|e| filter.accepts(e))
                .collect();
            SearchResult {
                combinations: combinations.len(),
                fitted,
                accepted,
            }
        });
        per_seed
            .into_iter()
            .fold(SearchResult::default(), SearchResult::append)
    }

    /// 运行整条流水线.
    ///
    /// 输入存在长度为 0 的维度时返回 `Err(MalformedGrid)`,
    /// 注入的协作者返回错误形状时返回 `Err(ShapeMismatch)`.
    /// 找不到椭球不是错误, 此时输出为空, 原因见 [`EfOutput::empty_reason`].
    pub fn run(&self, label: &BoneLabel) -> Result<EfOutput, EfError> {
        if label.is_empty() {
            return Err(EfError::MalformedGrid);
        }
        let cfg = &self.config;
        let mut summary = EfSummary {
            foreground_voxels: label.count_foreground(),
            ..Default::default()
        };

        let distance = self.distance.distance(label);
        if distance.dim() != label.shape() {
            return Err(EfError::ShapeMismatch);
        }
        let seeds = RidgeSeedExtractor::new(cfg.ridge_threshold(), cfg.ridge_radius()).extract(
            distance.view(),
            label,
            self.morphology.as_ref(),
        )?;
        summary.seeds = seeds.len();

        let found = self.search(label, &seeds.points);
        summary.combinations = found.combinations;
        summary.fitted = found.fitted;
        summary.candidates = found.accepted.len();
        let candidates = found.accepted;
        log::debug!(
            "{} seeds, {} combinations",
            summary.seeds,
            summary.combinations
        );

        let filter = ForegroundContainmentFilter::new(label, cfg.filter_directions());
        let keep = ordered_map(&candidates, |e| filter.accepts(e));
        let mut ellipsoids: Vec<Ellipsoid> = candidates
            .into_iter()
            .zip(keep)
            .filter_map(|(e, ok)| ok.then_some(e))
            .collect();
        sort_by_volume(&mut ellipsoids);
        for e in ellipsoids.iter_mut() {
            e.init_sampling(Arc::clone(&self.sampler));
        }
        summary.ellipsoids = ellipsoids.len();
        log::debug!(
            "{} fitted, {} passed search filter, {} passed final filter",
            summary.fitted,
            summary.candidates,
            summary.ellipsoids
        );

        let assignment = VoxelAssignmentEngine::new(label, &ellipsoids).assign();
        summary.assigned_voxels = count_assigned(assignment.identity.view());

        let size = cfg.flinn_size();
        let plot = flinn_plot(&ellipsoids, size);
        let peak = gaussian_blur(
            &flinn_peak_plot(&ellipsoids, assignment.identity.view(), size),
            cfg.sigma(),
        );

        log::info!("found {} ellipsoids", summary.ellipsoids);
        log::info!("assigned voxels = {}", summary.assigned_voxels);
        log::info!("foreground voxels = {}", summary.foreground_voxels);
        log::info!("filling percentage = {:.2}%", summary.filling_percentage());
        if let Some(reason) = summary.empty_reason() {
            log::info!("no ellipsoid found: {reason:?}");
        }

        Ok(EfOutput {
            ellipsoids,
            seed_points: seeds.points,
            seed_mask: seeds.mask,
            identity: assignment.identity,
            ef: assignment.ef,
            volume: assignment.volume,
            a_to_b: assignment.a_to_b,
            b_to_c: assignment.b_to_c,
            flinn_plot: plot,
            flinn_peak_plot: peak,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::ContactPoint;
    use crate::consts::UNASSIGNED;
    use crate::phantom;
    use ndarray::{Array3, ArrayView3};

    fn small_config() -> EfConfig {
        EfConfig::default()
            .with_ray_directions(6)
            .with_flinn_size(101)
    }

    struct NeverFits;

    impl LocalEllipsoidFitter for NeverFits {
        fn fit(&self, _: &[ContactPoint; 4], _: &Vec3) -> Option<Ellipsoid> {
            None
        }
    }

    struct WrongShape;

    impl DistanceTransform for WrongShape {
        fn distance(&self, _: &BoneLabel) -> Array3<f32> {
            Array3::zeros((1, 2, 3))
        }
    }

    struct Flat;

    impl Morphology for Flat {
        fn open(&self, data: ArrayView3<f32>, _: usize) -> Array3<f32> {
            data.to_owned()
        }

        fn close(&self, data: ArrayView3<f32>, _: usize) -> Array3<f32> {
            data.to_owned()
        }
    }

    fn sphere_label() -> BoneLabel {
        phantom::sphere((14, 14, 14), Vec3::new(7.0, 7.0, 7.0), 5.0)
    }

    /// 已归属体素上的中位数.
    fn assigned_median(field: &Array3<f32>) -> f32 {
        let mut v: Vec<f32> = field.iter().copied().filter(|v| !v.is_nan()).collect();
        assert!(!v.is_empty());
        v.sort_by(f32::total_cmp);
        v[v.len() / 2]
    }

    #[test]
    fn test_malformed_grid() {
        let label = BoneLabel::new(Array3::zeros((0, 4, 4)));
        let err = EllipsoidFactor::default().run(&label).unwrap_err();
        assert_eq!(err, EfError::MalformedGrid);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = EllipsoidFactor::new(small_config())
            .with_distance(WrongShape)
            .run(&sphere_label())
            .unwrap_err();
        assert_eq!(err, EfError::ShapeMismatch);
    }

    #[test]
    fn test_all_background() {
        let label = BoneLabel::from_shape_fn((5, 6, 7), |_| false);
        let out = EllipsoidFactor::new(small_config()).run(&label).unwrap();

        assert_eq!(out.empty_reason(), Some(NoEllipsoidReason::EmptyForeground));
        assert!(out.ellipsoids.is_empty() && out.seed_points.is_empty());
        assert_eq!(out.identity.dim(), (5, 6, 7));
        assert!(out.identity.iter().all(|id| *id == UNASSIGNED));
        assert!(out.ef.iter().all(|v| v.is_nan()));
        assert!(out.flinn_plot.iter().all(|v| *v == 0));
        assert_eq!(out.flinn_peak_plot.dim(), (101, 101));
        assert_eq!(out.filling_percentage(), 0.0);
    }

    #[test]
    fn test_degenerate_collaborators() {
        let label = sphere_label();

        let out = EllipsoidFactor::new(small_config())
            .with_morphology(Flat)
            .run(&label)
            .unwrap();
        assert_eq!(out.empty_reason(), Some(NoEllipsoidReason::NoSeeds));

        let out = EllipsoidFactor::new(small_config())
            .with_fitter(NeverFits)
            .run(&label)
            .unwrap();
        assert_eq!(out.empty_reason(), Some(NoEllipsoidReason::NoFit));
        assert!(out.summary.combinations > 0);
        assert_eq!(out.summary.assigned_voxels, 0);
    }

    #[test]
    fn test_sphere() {
        let _ = simple_logger::SimpleLogger::new().init();
        let label = sphere_label();
        let out = EllipsoidFactor::new(small_config()).run(&label).unwrap();

        assert_eq!(out.empty_reason(), None);
        assert!(out.summary.assigned_voxels > 0);
        assert!(out.summary.ellipsoids <= out.summary.candidates);
        assert!(out.summary.candidates <= out.summary.fitted);

        // 按体积降序
        for w in out.ellipsoids.windows(2) {
            assert!(w[0].volume() >= w[1].volume());
        }
        // 最大的椭球接近球形
        let largest = &out.ellipsoids[0];
        assert!(largest.a_to_b() >= 0.8, "{largest:?}");
        assert!(largest.b_to_c() >= 0.85, "{largest:?}");
        assert!(largest.sample_points(4).is_ok());

        let a_to_b = assigned_median(&out.a_to_b);
        let b_to_c = assigned_median(&out.b_to_c);
        assert!(a_to_b >= 0.85 && b_to_c >= 0.75, "{a_to_b} {b_to_c}");

        // Flinn 峰值图的质量集中在球形一角 (行 0, 列 size - 1) 附近
        let last = (out.flinn_peak_plot.nrows() - 1) as f64;
        let near_corner: f32 = out
            .flinn_peak_plot
            .indexed_iter()
            .filter(|((r, c), _)| (*r as f64) <= 0.3 * last && (*c as f64) >= 0.7 * last)
            .map(|(_, v)| *v)
            .sum();
        assert!(near_corner > 0.5 * out.flinn_peak_plot.sum());

        // 身份图像只出现在前景上
        for (pos, id) in out.identity.indexed_iter() {
            if *id != UNASSIGNED {
                assert!(label.is_foreground(pos));
                assert_eq!(out.ef[pos], out.ellipsoids[*id as usize].ellipsoid_factor() as f32);
            }
        }
        assert_eq!(
            out.flinn_peak_plot.sum() as usize,
            out.summary.assigned_voxels
        );
    }

    #[test]
    fn test_rod_is_prolate() {
        let label = phantom::rod_x((10, 10, 16), (5.0, 5.0), 3.5);
        let out = EllipsoidFactor::new(small_config()).run(&label).unwrap();
        assert!(out.summary.assigned_voxels > 0);

        let assigned: Vec<f32> = out.ef.iter().copied().filter(|v| !v.is_nan()).collect();
        let mean = assigned.iter().sum::<f32>() / assigned.len() as f32;
        assert!(mean > 0.2, "mean EF = {mean}");

        // 最大椭球细长, 长轴沿 x
        let largest = &out.ellipsoids[0];
        assert!(largest.b_to_c() < 0.3, "{largest:?}");
        assert!(largest.a_to_b() > largest.b_to_c(), "{largest:?}");
        let [_, _, c] = largest.semi_axes();
        assert!(c.normalize().x.abs() > 0.8);
    }

    #[test]
    fn test_search_matches_full_combination_list() {
        let label = sphere_label();
        let ef = EllipsoidFactor::new(small_config());
        let seeds = [Vec3::new(7.0, 7.0, 7.0), Vec3::new(6.5, 7.5, 7.0)];
        let found = ef.search(&label, &seeds);

        let all = CombinationBuilder::new(&label, ef.config().ray_directions()).build(&seeds);
        let filter = ForegroundContainmentFilter::new(&label, ef.config().search_filter_directions());
        let fitted: Vec<Ellipsoid> = all
            .iter()
            .filter_map(|c| TangentPlaneFitter::default().fit(&c.contacts, &c.center))
            .collect();
        let accepted: Vec<&Ellipsoid> = fitted.iter().filter(|e| filter.accepts(e)).collect();

        assert_eq!(found.combinations, all.len());
        assert_eq!(found.fitted, fitted.len());
        assert!(!found.accepted.is_empty());
        assert_eq!(found.accepted.len(), accepted.len());
        for (a, b) in found.accepted.iter().zip(accepted) {
            assert_eq!(a.radii(), b.radii());
            assert_eq!(a.centroid(), b.centroid());
            assert_eq!(a.orientation(), b.orientation());
        }

        assert!(ef.search(&label, &[]).accepted.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let label = sphere_label();
        let ef = EllipsoidFactor::new(small_config().with_sigma(1.0));
        let (x, y) = (ef.run(&label).unwrap(), ef.run(&label).unwrap());

        assert_eq!(x.summary, y.summary);
        assert_eq!(x.identity, y.identity);
        assert_eq!(x.seed_mask, y.seed_mask);
        assert_eq!(x.ef.mapv(f32::to_bits), y.ef.mapv(f32::to_bits));
        assert_eq!(x.flinn_peak_plot, y.flinn_peak_plot);
        for (a, b) in x.ellipsoids.iter().zip(y.ellipsoids.iter()) {
            assert_eq!(a.radii(), b.radii());
            assert_eq!(a.centroid(), b.centroid());
            assert_eq!(a.orientation(), b.orientation());
        }
    }
}
