// ==========================================
// 飞行员竞标优化系统 - 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 管线各引擎按步骤输出结构化字段,级别由环境变量控制
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的默认过滤器(本库 info,其余 warn)
const DEFAULT_FILTER: &str = "warn,pilot_bid_optimizer=info";

/// 初始化日志系统
///
/// # 环境变量
/// - RUST_LOG: 日志级别过滤器
///   例如: RUST_LOG=debug 或 RUST_LOG=pilot_bid_optimizer::engine=trace
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// debug 级别 + 测试捕获输出;重复调用安全(try_init)
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
