//! Business logic services for the Warehouse Stock Tracker

pub mod category;
pub mod inventory;
pub mod movement;
pub mod product;
pub mod warehouse;

pub use category::CategoryService;
pub use inventory::InventoryService;
pub use movement::MovementService;
pub use product::ProductService;
pub use warehouse::WarehouseService;
