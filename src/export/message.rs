use serde::{Deserialize, Serialize};

/// Job handed to the export queue. Consumers expect camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJobMessage {
    pub user_id: String,
    pub playlist_id: String,
    pub target_email: String,
}

impl ExportJobMessage {
    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}
