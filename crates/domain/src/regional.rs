use serde::{Deserialize, Serialize};

use crate::entity::{CollectionEntity, EntityId};
use crate::status::RecordStatus;

/// Regional territory grouping stores for logistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regional {
    /// Territory identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Short territory code.
    #[serde(default)]
    pub code: Option<String>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
    /// Territory status.
    pub status: RecordStatus,
}

impl CollectionEntity for Regional {
    type Status = RecordStatus;

    const RESOURCE: &'static str = "regionals";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}
