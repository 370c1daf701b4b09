pub use sea_orm_migration::prelude::*;

mod m20190821_081036_add_tax_rate_csv;
pub mod step;

pub use m20190821_081036_add_tax_rate_csv::{TABLE as TAX_RATE_CSV_TABLE, TAX_RATE_CSV_ID, VERSION as TAX_RATE_CSV_VERSION};

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20190821_081036_add_tax_rate_csv::migration())]
    }
}
