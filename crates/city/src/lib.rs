pub mod building;
pub mod config;
pub mod resource;
pub mod scenario;

pub use building::{Building, BuildingType, TypeData};
pub use resource::Resource;
pub use scenario::Scenario;
