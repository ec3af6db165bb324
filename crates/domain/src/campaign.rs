use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{CollectionEntity, EntityId};
use crate::status::{LifecycleStatus, RecordStatus};

/// Time-boxed donation campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// First day of the campaign.
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    /// Last day of the campaign.
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
    /// Campaign status.
    pub status: LifecycleStatus,
}

impl CollectionEntity for Campaign {
    type Status = LifecycleStatus;

    const RESOURCE: &'static str = "campaigns";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}

/// Link between a store and an OSC, optionally scoped to one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partnership {
    /// Partnership identifier.
    pub id: i64,
    /// Receiving organization.
    pub osc_id: i64,
    /// Donating store.
    pub store_id: i64,
    /// Campaign the link belongs to, when campaign-scoped.
    #[serde(default)]
    pub campaign_id: Option<i64>,
    /// First day of the partnership.
    #[serde(default)]
    pub started_on: Option<NaiveDate>,
    /// Partnership status.
    pub status: RecordStatus,
}

impl CollectionEntity for Partnership {
    type Status = RecordStatus;

    const RESOURCE: &'static str = "partnerships";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}
