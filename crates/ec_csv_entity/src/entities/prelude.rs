pub use super::csv::Entity as Csv;
