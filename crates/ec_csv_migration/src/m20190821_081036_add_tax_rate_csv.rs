use sea_orm_migration::prelude::*;

use crate::step::{GuardedStep, Mutation, StepMigration};

pub const VERSION: &str = "m20190821_081036_add_tax_rate_csv";

/// 依赖的目标表，不存在时跳过
pub const TABLE: &str = "dtb_csv";

/// 商品规格「税率」导出项的固定 id
pub const TAX_RATE_CSV_ID: i32 = 204;

/// 为商品 CSV 导出追加「税率」列
///
/// 回滚语句保持为空：只新增导出项，不做回滚。
pub fn step() -> GuardedStep {
    let insert = Query::insert()
        .into_table(DtbCsv::Table)
        .columns([
            DtbCsv::Id,
            DtbCsv::CsvTypeId,
            DtbCsv::CreatorId,
            DtbCsv::EntityName,
            DtbCsv::FieldName,
            DtbCsv::ReferenceFieldName,
            DtbCsv::DispName,
            DtbCsv::SortNo,
            DtbCsv::Enabled,
            DtbCsv::CreateDate,
            DtbCsv::UpdateDate,
            DtbCsv::DiscriminatorType,
        ])
        .values_panic([
            TAX_RATE_CSV_ID.into(),
            1.into(),
            Option::<i32>::None.into(),
            r"Eccube\Entity\ProductClass".into(),
            "TaxRule".into(),
            "tax_rate".into(),
            "税率".into(),
            31.into(),
            false.into(),
            Expr::current_timestamp().into(),
            Expr::current_timestamp().into(),
            "csv".into(),
        ])
        .to_owned();

    GuardedStep::new(VERSION, TABLE, Mutation::Insert(insert))
}

pub fn migration() -> StepMigration<GuardedStep> {
    StepMigration(step())
}

#[derive(DeriveIden)]
enum DtbCsv {
    Table,
    Id,
    CsvTypeId,
    CreatorId,
    EntityName,
    FieldName,
    ReferenceFieldName,
    DispName,
    SortNo,
    Enabled,
    CreateDate,
    UpdateDate,
    DiscriminatorType,
}
