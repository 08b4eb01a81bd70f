// Wire-level types for the configuration object API.
//
// Every object call answers with a `{"_global_result": {...}}` envelope.
// We only read it for display; success is decided by the HTTP status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Configuration objects the client knows how to POST.
///
/// The string form is the path segment under `/configuration/object/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectEndpoint {
    ApRename,
    ApRegroup,
    ClearProvisioningApList,
    ReadBootinfo,
    CopyProvisioningParams,
    ApProv,
    ApReprovision,
}

impl Serialize for ObjectEndpoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

// ── MeshRole ────────────────────────────────────────────────────────

/// Mesh role assigned to an AP (`mesh_role_sel` on the wire).
///
/// Portals get extra antenna-gain settings during provisioning; any other
/// role string the inventory produces is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MeshRole {
    Portal,
    Point,
    Other(String),
}

impl MeshRole {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Portal => "mesh-portal",
            Self::Point => "mesh-point",
            Self::Other(role) => role,
        }
    }

    pub fn is_portal(&self) -> bool {
        matches!(self, Self::Portal)
    }
}

impl fmt::Display for MeshRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for MeshRole {
    fn from(s: &str) -> Self {
        match s {
            "mesh-portal" => Self::Portal,
            "mesh-point" => Self::Point,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl FromStr for MeshRole {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Serialize for MeshRole {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MeshRole {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s.as_str()))
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// Parameters pushed into the provisioning buffer by `ap_prov`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApProvisioning {
    pub ap_name: String,
    pub ap_group: String,
    pub mesh_role: MeshRole,
}

// ── Responses ───────────────────────────────────────────────────────

/// The `_global_result` block of a controller response.
///
/// Field types differ between firmware releases (`status` is sometimes a
/// string), so everything beyond `status_str` is kept loosely typed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GlobalResult {
    #[serde(default)]
    pub status: Option<serde_json::Value>,
    #[serde(default)]
    pub status_str: Option<String>,
    #[serde(rename = "UIDARUBA", default, skip_serializing)]
    pub uidaruba: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(rename = "_global_result")]
    pub global_result: Option<GlobalResult>,
}

/// Decoded response of a configuration object call.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub operation: ObjectEndpoint,
    pub status: u16,
    pub body: serde_json::Value,
}

impl CommandResponse {
    /// The controller's `_global_result`, if the body carries one.
    pub fn global_result(&self) -> Option<GlobalResult> {
        self.body
            .get("_global_result")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Human-readable status message from `_global_result.status_str`.
    pub fn status_str(&self) -> Option<String> {
        self.global_result().and_then(|g| g.status_str)
    }
}
