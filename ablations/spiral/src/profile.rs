//! 单组配置的运行统计.

use ef_berry::prelude::*;
use std::time::{Duration, Instant};

/// 一次流水线运行的记录.
#[derive(Clone, Debug)]
pub struct Record {
    /// 体模名.
    pub phantom: &'static str,

    /// 流水线各阶段计数.
    pub summary: EfSummary,

    /// 平均椭球因子 (只统计已归属的体素). 没有归属体素时为 `None`.
    pub mean_ef: Option<f64>,

    /// 耗时.
    pub elapsed: Duration,
}

/// 一组配置 (螺旋方向数) 下全部体模的统计.
#[derive(Clone, Debug)]
pub struct Profile {
    directions: usize,
    records: Vec<Record>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new(directions: usize) -> Self {
        Self {
            directions,
            records: vec![],
        }
    }

    /// 计时运行一次流水线, 并记录结果.
    pub fn run(&mut self, phantom: &'static str, ef: &EllipsoidFactor, label: &BoneLabel) {
        let since = Instant::now();
        let out = match ef.run(label) {
            Ok(out) => out,
            Err(e) => {
                log::error!("{phantom} with {} directions: {e}", self.directions);
                return;
            }
        };
        let elapsed = since.elapsed();

        let (sum, n) = out
            .ef
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, n), v| (s + *v as f64, n + 1));
        self.records.push(Record {
            phantom,
            summary: out.summary,
            mean_ef: (n > 0).then(|| sum / n as f64),
            elapsed,
        });
    }

    /// 螺旋方向数.
    #[inline]
    pub fn directions(&self) -> usize {
        self.directions
    }

    /// 全部记录.
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// 总耗时 (以毫秒为单位).
    pub fn total_ms(&self) -> u64 {
        self.records
            .iter()
            .map(|r| r.elapsed)
            .sum::<Duration>()
            .as_millis() as u64
    }

    /// 耗时最长的一次运行.
    pub fn slowest(&self) -> Option<&Record> {
        self.records.iter().max_by_key(|r| r.elapsed)
    }
}
