pub mod browse;
pub mod import;
