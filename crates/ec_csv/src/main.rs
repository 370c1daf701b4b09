mod config;
mod database;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use crate::config::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    utils::init_logger(&args.log_level)?;

    let command = args.command();
    info!("使用数据库: {}", args.db_path.display());
    let db = database::connect(&args.db_path).await?;

    let result = database::run(&db, &command).await;
    if let Err(e) = &result {
        error!("执行迁移命令失败: {:#}", e);
    }

    // 显式关闭连接池，确保释放所有数据库锁
    db.close().await?;
    result.map(|_| ())
}
