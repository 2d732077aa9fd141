//! 射线方向数消融实验.
//!
//! 在三种合成体模上, 以不同的螺旋方向数运行椭球因子流水线, 比较耗时与填充率.

mod profile;
mod result;
mod runner;

fn main() {
    utils::init_logger();
    runner::run().analyze();
}
