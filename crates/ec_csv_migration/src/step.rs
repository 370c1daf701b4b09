//! 带前置条件的迁移步骤
//!
//! 迁移步骤不依赖框架的全局状态，所需能力（查询表是否存在、执行语句）
//! 通过 [`SchemaInspector`] 与 [`StatementExecutor`] 显式传入。
//! [`StepMigration`] 负责把任意 [`MigrationStep`] 接入 `sea-orm-migration` 的 `Migrator`。

use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, SqlErr, Statement};
use sea_orm_migration::prelude::*;
use thiserror::Error;
use tracing::{error, info};

/// 查询当前数据库结构
#[async_trait::async_trait]
pub trait SchemaInspector: Sync {
    async fn has_table(&self, name: &str) -> Result<bool, DbErr>;
}

/// 执行会修改数据的语句
#[async_trait::async_trait]
pub trait StatementExecutor: Sync {
    /// 语句按该后端渲染
    fn backend(&self) -> DbBackend;

    async fn execute(&self, stmt: Statement) -> Result<(), DbErr>;
}

#[async_trait::async_trait]
impl SchemaInspector for SchemaManager<'_> {
    async fn has_table(&self, name: &str) -> Result<bool, DbErr> {
        // 每次都实时查询 schema，不做缓存
        SchemaManager::has_table(self, name).await
    }
}

#[async_trait::async_trait]
impl StatementExecutor for SchemaManager<'_> {
    fn backend(&self) -> DbBackend {
        self.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<(), DbErr> {
        ConnectionTrait::execute(self.get_connection(), stmt).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl StatementExecutor for DatabaseConnection {
    fn backend(&self) -> DbBackend {
        self.get_database_backend()
    }

    async fn execute(&self, stmt: Statement) -> Result<(), DbErr> {
        ConnectionTrait::execute(self, stmt).await?;
        Ok(())
    }
}

/// 单条数据修改语句，值在编写迁移时固定，执行时按后端渲染
#[derive(Debug, Clone)]
pub enum Mutation {
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    /// 原样执行的 SQL
    Raw(String),
}

impl Mutation {
    pub fn build(&self, backend: DbBackend) -> Statement {
        match self {
            Mutation::Insert(stmt) => backend.build(stmt),
            Mutation::Update(stmt) => backend.build(stmt),
            Mutation::Delete(stmt) => backend.build(stmt),
            Mutation::Raw(sql) => Statement::from_string(backend, sql.clone()),
        }
    }
}

/// 单次 `apply`/`revert` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// 语句已执行
    Applied,
    /// 目标表不存在，未做任何修改
    PreconditionSkipped,
    /// 没有可执行的语句
    NoOp,
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("failed to inspect table `{table}`: {source}")]
    Inspection { table: String, source: DbErr },
    #[error("statement rejected, version: {version}, error: {source}")]
    Execution { version: String, source: DbErr },
}

impl MigrationError {
    /// 是否因唯一约束（含主键）冲突被数据库拒绝
    pub fn is_unique_violation(&self) -> bool {
        let MigrationError::Execution { source, .. } = self else {
            return false;
        };
        if matches!(source.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            return true;
        }
        // 非 sqlx 执行器返回的错误没有错误码，只能按 SQLite 的错误信息判断
        source.to_string().contains("UNIQUE constraint failed")
    }
}

impl From<MigrationError> for DbErr {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Inspection { source, .. } | MigrationError::Execution { source, .. } => source,
        }
    }
}

/// 有版本号、可正向执行与回滚的迁移单元
#[async_trait::async_trait]
pub trait MigrationStep: Send + Sync {
    /// 可排序的唯一版本号，同时作为迁移记录表中的键
    fn version_id(&self) -> &str;

    async fn apply(
        &self,
        inspector: &dyn SchemaInspector,
        executor: &dyn StatementExecutor,
    ) -> Result<StepOutcome, MigrationError>;

    async fn revert(
        &self,
        inspector: &dyn SchemaInspector,
        executor: &dyn StatementExecutor,
    ) -> Result<StepOutcome, MigrationError>;
}

/// 仅在目标表存在时执行的迁移步骤
///
/// 正向语句每次 `apply` 最多执行一次，本身不防重复执行，
/// 是否已执行由 `seaql_migrations` 记录。回滚语句可以为空，此时 `revert` 什么也不做。
#[derive(Debug, Clone)]
pub struct GuardedStep {
    version_id: String,
    target_table: String,
    forward: Mutation,
    backward: Option<Mutation>,
}

impl GuardedStep {
    pub fn new(version_id: impl Into<String>, target_table: impl Into<String>, forward: Mutation) -> Self {
        Self {
            version_id: version_id.into(),
            target_table: target_table.into(),
            forward,
            backward: None,
        }
    }

    pub fn with_backward(mut self, backward: Mutation) -> Self {
        self.backward = Some(backward);
        self
    }

    async fn precondition(&self, inspector: &dyn SchemaInspector) -> Result<bool, MigrationError> {
        inspector
            .has_table(&self.target_table)
            .await
            .map_err(|source| MigrationError::Inspection {
                table: self.target_table.clone(),
                source,
            })
    }

    async fn run(&self, mutation: &Mutation, executor: &dyn StatementExecutor) -> Result<(), MigrationError> {
        let stmt = mutation.build(executor.backend());
        if let Err(source) = executor.execute(stmt).await {
            error!("迁移 {} 执行语句失败: {}", self.version_id, source);
            return Err(MigrationError::Execution {
                version: self.version_id.clone(),
                source,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MigrationStep for GuardedStep {
    fn version_id(&self) -> &str {
        &self.version_id
    }

    async fn apply(
        &self,
        inspector: &dyn SchemaInspector,
        executor: &dyn StatementExecutor,
    ) -> Result<StepOutcome, MigrationError> {
        if !self.precondition(inspector).await? {
            info!("表 {} 不存在，跳过迁移 {}", self.target_table, self.version_id);
            return Ok(StepOutcome::PreconditionSkipped);
        }
        self.run(&self.forward, executor).await?;
        info!("迁移 {} 已应用到表 {}", self.version_id, self.target_table);
        Ok(StepOutcome::Applied)
    }

    async fn revert(
        &self,
        inspector: &dyn SchemaInspector,
        executor: &dyn StatementExecutor,
    ) -> Result<StepOutcome, MigrationError> {
        let Some(backward) = &self.backward else {
            return Ok(StepOutcome::NoOp);
        };
        if !self.precondition(inspector).await? {
            info!("表 {} 不存在，跳过回滚 {}", self.target_table, self.version_id);
            return Ok(StepOutcome::PreconditionSkipped);
        }
        self.run(backward, executor).await?;
        info!("迁移 {} 已回滚", self.version_id);
        Ok(StepOutcome::Applied)
    }
}

/// 将 [`MigrationStep`] 接入 `Migrator`，版本号即迁移名
pub struct StepMigration<S>(pub S);

impl<S: MigrationStep> MigrationName for StepMigration<S> {
    fn name(&self) -> &str {
        self.0.version_id()
    }
}

#[async_trait::async_trait]
impl<S: MigrationStep> MigrationTrait for StepMigration<S> {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.0.apply(manager, manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.0.revert(manager, manager).await?;
        Ok(())
    }
}
