use anyhow::Result;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub fn init_logger(log_level: &str) -> Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_timer(ChronoLocal::new("%b %d %H:%M:%S".to_owned()))
        .with_target(false)
        .with_filter(build_console_filter(log_level));

    tracing_subscriber::registry().with(console_layer).try_init()?;
    Ok(())
}

/// 构建控制台日志过滤器，压低 sqlx 慢查询等噪音
fn build_console_filter(base_level: &str) -> EnvFilter {
    EnvFilter::builder().parse_lossy(format!(
        "{},\
            sqlx::query=error,\
            sqlx=error,\
            sea_orm::database=error,\
            sea_orm_migration=warn",
        base_level
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_filter_keeps_base_level() {
        let filter = build_console_filter("debug").to_string();
        assert!(filter.contains("debug"));
        assert!(filter.contains("sqlx=error"));
        assert!(filter.contains("sea_orm_migration=warn"));
    }
}
