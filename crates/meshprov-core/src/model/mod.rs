// ── Domain model ──
//
// Canonical types shared by the inventory driver, the workflow and the CLI.

pub mod ap;
pub mod mac;

pub use ap::{ApIdentity, InventoryRecord, InventoryRow};
pub use mac::{MacAddress, MacParseError};
pub use meshprov_api::MeshRole;
