use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// CSV 导出项定义（EC-CUBE `dtb_csv`）
///
/// 每一行描述某个实体字段在 CSV 导出中的列，`id` 由数据迁移显式指定。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dtb_csv")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub csv_type_id: i32,
    pub creator_id: Option<i32>,
    pub entity_name: String,
    pub field_name: String,
    pub reference_field_name: Option<String>,
    pub disp_name: String,
    pub sort_no: i32,
    pub enabled: bool,
    pub create_date: String,
    pub update_date: String,
    pub discriminator_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
