use serde::{Deserialize, Serialize};

use crate::entity::{CollectionEntity, EntityId};
use crate::status::LifecycleStatus;

/// Civil-society organization receiving donations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Osc {
    /// Organization identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Company registration number.
    #[serde(default)]
    pub cnpj: Option<String>,
    /// Service category (food bank, shelter, ...).
    #[serde(default)]
    pub category: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
    /// Main contact email.
    #[serde(default)]
    pub email: Option<String>,
    /// Participation status.
    pub status: LifecycleStatus,
}

impl CollectionEntity for Osc {
    type Status = LifecycleStatus;

    const RESOURCE: &'static str = "oscs";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}

/// Person registered as a point of contact for one OSC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact identifier.
    pub id: i64,
    /// Organization the contact belongs to.
    pub osc_id: i64,
    /// Full name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Role inside the organization.
    #[serde(default)]
    pub role: Option<String>,
    /// Contact status.
    pub status: LifecycleStatus,
}

impl CollectionEntity for Contact {
    type Status = LifecycleStatus;

    const RESOURCE: &'static str = "contacts";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}
