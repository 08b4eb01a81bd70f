// ── Access point identity and inventory records ──

use std::fmt;

use serde::Serialize;

use meshprov_api::MeshRole;

use super::mac::MacAddress;

/// One CSV line exactly as read, before normalization.
///
/// Columns: building, role, floor, mac, target name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryRow {
    /// 1-based line number in the source file.
    pub line: u64,
    pub building: String,
    pub role: String,
    pub floor: String,
    pub mac: String,
    pub target_name: String,
}

/// A normalized inventory entry.
///
/// Building and role are lowercased; the MAC is colon-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRecord {
    pub building: String,
    pub floor: String,
    pub role: String,
    pub mac: MacAddress,
    pub target_name: String,
}

impl InventoryRecord {
    /// `mesh-<role>`, e.g. `portal` → `mesh-portal`.
    pub fn mesh_role(&self) -> MeshRole {
        MeshRole::from(format!("mesh-{}", self.role).as_str())
    }

    /// The identity the provisioning workflow acts on.
    ///
    /// Unprovisioned APs are known to the controller by their MAC.
    pub fn identity(&self) -> ApIdentity {
        ApIdentity {
            current_name: self.mac.to_string(),
            target_name: self.target_name.clone(),
            mesh_role: self.mesh_role(),
        }
    }
}

/// The AP a provisioning run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApIdentity {
    /// Name the controller currently knows the AP by.
    pub current_name: String,
    /// Name the AP should carry after provisioning.
    pub target_name: String,
    pub mesh_role: MeshRole,
}

impl fmt::Display for ApIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({})",
            self.current_name, self.target_name, self.mesh_role
        )
    }
}
