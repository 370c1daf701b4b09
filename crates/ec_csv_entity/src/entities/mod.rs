pub mod prelude;

pub mod csv;
