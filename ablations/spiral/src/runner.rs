//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use ef_berry::prelude::*;
use std::thread;
use utils::phantoms;

/// 参与比较的螺旋方向数.
const DIRECTIONS: [usize; 4] = [6, 8, 12, 16];

/// 以 `n` 个螺旋方向运行全部体模.
fn profile_with(n: usize, labels: &[(&'static str, BoneLabel)]) -> Profile {
    let ef = EllipsoidFactor::new(
        EfConfig::default()
            .with_ray_directions(n)
            .with_flinn_size(101),
    );
    let mut profile = Profile::new(n);
    for (name, label) in labels {
        profile.run(*name, &ef, label);
    }
    profile
}

/// 实际运行.
pub fn run() -> AblationResult {
    let size = phantoms::size_from_env();
    let labels = phantoms::standard(size);
    assert!(labels.iter().all(|(_, l)| l.count_foreground() > 0));

    println!(
        "Running ablation studies on {size}^3 phantoms with {} cpus...",
        utils::cpus()
    );
    thread::scope(|s| {
        let labels = &labels;
        let handles = DIRECTIONS.map(|n| s.spawn(move || profile_with(n, labels)));

        AblationResult::from_iter(
            handles
                .into_iter()
                .map(|th| th.join().expect("Thread joining error")),
        )
    })
}
