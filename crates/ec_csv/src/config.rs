use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 命令行参数，未指定时从环境变量读取
#[derive(Parser, Debug)]
#[command(name = "ec-csv-migrate", version, about = "执行 EC-CUBE CSV 项数据迁移")]
pub struct Args {
    /// SQLite 数据库文件路径
    #[arg(long, env = "EC_CSV_DB_PATH", default_value = "data.sqlite")]
    pub db_path: PathBuf,

    /// 日志级别
    #[arg(long, env = "EC_CSV_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 应用待执行的迁移（默认）
    Up {
        /// 最多应用的迁移数，缺省为全部
        #[arg(long)]
        steps: Option<u32>,
    },
    /// 回滚已应用的迁移
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// 列出已应用与待执行的迁移
    Status,
}

impl Args {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Up { steps: None })
    }
}
