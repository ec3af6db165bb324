use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{CollectionEntity, EntityId};
use crate::status::{BinaryStatus, RecordStatus};

/// Partner store registered on the donation platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    /// Store identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Company registration number.
    #[serde(default)]
    pub cnpj: Option<String>,
    /// City name.
    #[serde(default)]
    pub city: Option<String>,
    /// Two-letter state code.
    #[serde(default)]
    pub state: Option<String>,
    /// Regional territory the store belongs to.
    #[serde(default)]
    pub regional_id: Option<i64>,
    /// Approval status.
    pub status: RecordStatus,
    /// Creation timestamp, when the backend reports it.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CollectionEntity for Store {
    type Status = RecordStatus;

    const RESOURCE: &'static str = "stores";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}

/// Store row from the legacy `lojas` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loja {
    /// Row identifier.
    pub id: i64,
    /// Internal store code.
    #[serde(rename = "codigo")]
    pub code: String,
    /// Display name.
    #[serde(rename = "nome")]
    pub name: String,
    /// City name.
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    /// Two-letter state code.
    #[serde(rename = "uf", default)]
    pub state: Option<String>,
    /// Regional territory identifier.
    #[serde(rename = "regional", default)]
    pub regional_id: Option<i64>,
    /// Active flag.
    #[serde(rename = "ativo")]
    pub status: BinaryStatus,
}

impl CollectionEntity for Loja {
    type Status = BinaryStatus;

    const RESOURCE: &'static str = "lojas";

    fn id(&self) -> EntityId {
        EntityId::Numeric(self.id)
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}

/// Store imported from the retail partner's own catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreExternal {
    /// External store code.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Company registration number.
    #[serde(default)]
    pub cnpj: Option<String>,
    /// Partner system that supplied the record.
    #[serde(default)]
    pub source: Option<String>,
    /// Active flag.
    pub status: BinaryStatus,
}

impl CollectionEntity for StoreExternal {
    type Status = BinaryStatus;

    const RESOURCE: &'static str = "stores-external";

    fn id(&self) -> EntityId {
        EntityId::Text(self.id.clone())
    }

    fn status(&self) -> Self::Status {
        self.status
    }
}
