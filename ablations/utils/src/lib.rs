//! 消融实验依赖的通用组件.

use simple_logger::SimpleLogger;

pub mod phantoms;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 安装日志. 默认只输出 `warn` 及以上, 设置 `$RUST_LOG` 后按其值输出.
///
/// 重复调用时忽略错误.
pub fn init_logger() {
    let _ = SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init();
}
