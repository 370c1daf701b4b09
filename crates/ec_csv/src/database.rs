use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ec_csv_entity::entities::csv;
use ec_csv_entity::entities::prelude::Csv;
use ec_csv_migration::{Migrator, MigratorTrait, SchemaManager, TAX_RATE_CSV_ID, TAX_RATE_CSV_TABLE};
use sea_orm::sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sea_orm::{DatabaseConnection, EntityTrait, SqlxSqliteConnector};
use tracing::{debug, info, warn};

use crate::config::Command;

/// 创建 SQLite 连接选项
fn create_sqlite_options(path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(90))
}

/// 打开数据库
///
/// 迁移只使用单连接池，避免多连接导致迁移顺序问题。
pub async fn connect(path: &Path) -> Result<DatabaseConnection> {
    if !path.exists() {
        debug!("数据库文件不存在，将创建新的数据库");
    } else {
        debug!("检测到现有数据库文件，将在必要时应用迁移");
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(create_sqlite_options(path))
        .await
        .with_context(|| format!("打开数据库 {} 失败", path.display()))?;

    Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
}

/// 迁移状态
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub applied: Vec<String>,
    pub pending: Vec<String>,
}

pub async fn migration_report(db: &DatabaseConnection) -> Result<MigrationReport> {
    let applied = Migrator::get_applied_migrations(db)
        .await
        .context("读取已应用迁移失败")?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    let pending = Migrator::get_pending_migrations(db)
        .await
        .context("读取待执行迁移失败")?
        .iter()
        .map(|m| m.name().to_string())
        .collect();
    Ok(MigrationReport { applied, pending })
}

/// 查询税率 CSV 项，`dtb_csv` 不存在时返回 `None`
pub async fn tax_rate_csv(db: &DatabaseConnection) -> Result<Option<csv::Model>> {
    if !SchemaManager::new(db).has_table(TAX_RATE_CSV_TABLE).await? {
        return Ok(None);
    }
    Ok(Csv::find_by_id(TAX_RATE_CSV_ID).one(db).await?)
}

/// 执行命令并输出迁移状态
pub async fn run(db: &DatabaseConnection, command: &Command) -> Result<MigrationReport> {
    match command {
        Command::Up { steps } => {
            Migrator::up(db, *steps).await.context("应用迁移失败")?;
            report_tax_rate_csv(db).await?;
        }
        Command::Down { steps } => {
            Migrator::down(db, Some(*steps)).await.context("回滚迁移失败")?;
        }
        Command::Status => {}
    }

    let report = migration_report(db).await?;
    for name in &report.applied {
        info!("已应用: {}", name);
    }
    for name in &report.pending {
        info!("待执行: {}", name);
    }
    Ok(report)
}

async fn report_tax_rate_csv(db: &DatabaseConnection) -> Result<()> {
    match tax_rate_csv(db).await? {
        Some(model) => info!(
            "CSV 项「{}」(id={}) 已存在，启用: {}",
            model.disp_name, model.id, model.enabled
        ),
        None => warn!("未找到 id={} 的 CSV 项，表 {} 可能尚未创建", TAX_RATE_CSV_ID, TAX_RATE_CSV_TABLE),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sea_orm::{ConnectionTrait, Schema};

    use super::*;

    struct TempDb(PathBuf);

    impl TempDb {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir().join(format!("ec_csv_{}_{}.sqlite", name, std::process::id()));
            let db = Self(path);
            db.cleanup();
            db
        }

        fn cleanup(&self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.0.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            self.cleanup();
        }
    }

    async fn create_csv_table(db: &DatabaseConnection) {
        let backend = db.get_database_backend();
        let stmt = Schema::new(backend).create_table_from_entity(Csv);
        db.execute(backend.build(&stmt)).await.unwrap();
    }

    #[tokio::test]
    async fn test_status_on_new_database() {
        let tmp = TempDb::new("status");
        let db = connect(&tmp.0).await.unwrap();

        let report = run(&db, &Command::Status).await.unwrap();

        assert!(tmp.0.exists());
        assert!(report.applied.is_empty());
        assert_eq!(report.pending, vec![ec_csv_migration::TAX_RATE_CSV_VERSION.to_string()]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_up_without_csv_table() {
        let tmp = TempDb::new("up_without_table");
        let db = connect(&tmp.0).await.unwrap();

        let report = run(&db, &Command::Up { steps: None }).await.unwrap();

        assert_eq!(report.applied, vec![ec_csv_migration::TAX_RATE_CSV_VERSION.to_string()]);
        assert!(report.pending.is_empty());
        assert_eq!(tax_rate_csv(&db).await.unwrap(), None);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_up_then_down_keeps_row() {
        let tmp = TempDb::new("up_then_down");
        let db = connect(&tmp.0).await.unwrap();
        create_csv_table(&db).await;

        run(&db, &Command::Up { steps: None }).await.unwrap();
        let row = tax_rate_csv(&db).await.unwrap().expect("税率行不存在");
        assert_eq!(row.id, TAX_RATE_CSV_ID);
        assert_eq!(row.field_name, "TaxRule");

        let report = run(&db, &Command::Down { steps: 1 }).await.unwrap();
        assert!(report.applied.is_empty());
        assert_eq!(report.pending.len(), 1);
        assert!(tax_rate_csv(&db).await.unwrap().is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_reopen_skips_applied_migration() {
        let tmp = TempDb::new("reopen");
        {
            let db = connect(&tmp.0).await.unwrap();
            create_csv_table(&db).await;
            run(&db, &Command::Up { steps: None }).await.unwrap();
            db.close().await.unwrap();
        }

        let db = connect(&tmp.0).await.unwrap();
        // 已记录在 seaql_migrations 中，不会再次插入
        let report = run(&db, &Command::Up { steps: None }).await.unwrap();
        assert!(report.pending.is_empty());
        assert!(tax_rate_csv(&db).await.unwrap().is_some());
        db.close().await.unwrap();
    }
}
