// Request bodies for configuration object calls.
//
// Shapes are fixed by the controller; keys are hyphenated or underscored
// exactly as the controller expects them.

use serde_json::{Value, json};

use crate::models::ApProvisioning;

const ACTION_MODIFY: &str = "modify";

/// Antenna gains (dBi) applied to mesh portals, 5 GHz then 2.4 GHz.
pub const PORTAL_A_ANT_GAIN: &str = "5.5";
pub const PORTAL_G_ANT_GAIN: &str = "3.5";

pub fn ap_rename(serial: &str, new_name: &str) -> Value {
    json!({ "serial-num": serial, "new-name": new_name })
}

pub fn ap_regroup(serial: &str, new_group: &str) -> Value {
    json!({ "serial-num": serial, "new-group": new_group })
}

pub fn clear_provisioning_ap_list() -> Value {
    json!({ "_action": ACTION_MODIFY })
}

pub fn read_bootinfo(ap_name: &str) -> Value {
    json!({
        "_action": ACTION_MODIFY,
        "read_bootinfo_option": "ap-name",
        "ap-name": ap_name,
    })
}

pub fn copy_provisioning_params(ap_name: &str) -> Value {
    json!({
        "_action": ACTION_MODIFY,
        "ap-name": ap_name,
        "copy_provisioning_options": "ap-name",
    })
}

/// Body for `ap_prov`. Portals also get fixed antenna gains.
pub fn ap_prov(request: &ApProvisioning) -> Value {
    let mut body = json!({
        "_action": ACTION_MODIFY,
        "ap_name": { "_action": ACTION_MODIFY, "ap-name": request.ap_name },
        "ap_group": { "_action": ACTION_MODIFY, "ap-group": request.ap_group },
        "mesh_role": { "_action": ACTION_MODIFY, "mesh_role_sel": request.mesh_role.as_str() },
    });

    if request.mesh_role.is_portal() {
        if let Some(obj) = body.as_object_mut() {
            obj.insert(
                "a_ant_gain".into(),
                json!({ "_action": ACTION_MODIFY, "a-ant-gain": PORTAL_A_ANT_GAIN }),
            );
            obj.insert(
                "g_ant_gain".into(),
                json!({ "_action": ACTION_MODIFY, "g-ant-gain": PORTAL_G_ANT_GAIN }),
            );
        }
    }

    body
}

pub fn ap_reprovision(ap_name: &str) -> Value {
    json!({
        "_action": ACTION_MODIFY,
        "ap-name": ap_name,
        "reprovision_option": "ap-name",
    })
}
