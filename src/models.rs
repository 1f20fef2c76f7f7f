pub mod crm;
pub mod import;
pub mod inventory;
pub mod operations;
pub mod vehicles;
