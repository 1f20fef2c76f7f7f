pub mod crm_repo;
pub use crm_repo::ClientRepository;
pub mod vehicles_repo;
pub use vehicles_repo::VehicleRepository;
pub mod operations_repo;
pub use operations_repo::OperationsRepository;
pub mod inventory_repo;
pub use inventory_repo::InventoryRepository;
