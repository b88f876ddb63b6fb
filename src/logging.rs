// ==========================================
// 企业定额匹配系统 - 日志系统
// ==========================================
// 基于 tracing + tracing-subscriber
// 过滤器优先取 RUST_LOG，未设置时放行本 crate 的 info
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 未设置 RUST_LOG 时的默认过滤器
const DEFAULT_FILTER: &str = "info,quota_match=info";

/// 初始化日志系统（进程入口调用一次）
///
/// # 环境变量
/// - RUST_LOG: 过滤器指令
///   例如: RUST_LOG=debug 或 RUST_LOG=quota_match=trace
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}

/// 测试环境初始化
///
/// 输出交给测试框架捕获；重复调用安全（后续调用为空操作）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
