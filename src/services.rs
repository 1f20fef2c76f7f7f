pub mod import;
pub use import::ImportService;
