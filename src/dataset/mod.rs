pub mod reader;

pub use reader::{read_delay_dataset, read_pricing_dataset, read_table, Table, TableFormat};
