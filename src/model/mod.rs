//! Data model: values, rows and the table row store

mod row;
mod table;
mod value;

pub use row::Row;
pub use table::Table;
pub use value::CellValue;
