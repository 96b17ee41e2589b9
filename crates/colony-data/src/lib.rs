pub mod loader;
pub mod schema;
pub mod template;

pub use loader::DataLoadError;
pub use template::{SettlementTemplate, load_building_types, load_settlement_template};
