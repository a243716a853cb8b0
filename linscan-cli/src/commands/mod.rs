pub mod rand_table;
pub mod scan;
