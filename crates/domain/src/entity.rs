use std::fmt::{Display, Formatter};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::status::StatusValue;

/// Record identifier as returned by the backend: numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer primary key.
    Numeric(i64),
    /// Opaque string key (external codes, UUIDs).
    Text(String),
}

impl EntityId {
    /// Parses a path segment, preferring the numeric form when it renders
    /// back to the same text.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        match value.parse::<i64>() {
            Ok(number) if number.to_string() == value => Self::Numeric(number),
            _ => Self::Text(value.to_owned()),
        }
    }
}

impl Display for EntityId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(value) => write!(formatter, "{value}"),
            Self::Text(value) => formatter.write_str(value),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Numeric(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A record type listed and mutated through one backend resource.
pub trait CollectionEntity: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// Closed status enumeration declared by this entity.
    type Status: StatusValue;

    /// Resource path segment under the API base URL.
    const RESOURCE: &'static str;

    /// Returns the record identifier.
    fn id(&self) -> EntityId;

    /// Returns the record status.
    fn status(&self) -> Self::Status;
}

#[cfg(test)]
mod tests {
    use super::EntityId;

    #[test]
    fn parse_prefers_numeric_ids() {
        assert_eq!(EntityId::parse(" 42 "), EntityId::Numeric(42));
        assert_eq!(
            EntityId::parse("EXT-0042"),
            EntityId::Text("EXT-0042".to_owned())
        );
    }

    #[test]
    fn parse_keeps_codes_that_do_not_round_trip() {
        let id = EntityId::parse("007");
        assert_eq!(id, EntityId::Text("007".to_owned()));
        assert_eq!(id.to_string(), "007");
        assert_eq!(EntityId::parse("+5"), EntityId::Text("+5".to_owned()));
        assert_eq!(EntityId::parse("-3"), EntityId::Numeric(-3));
    }

    #[test]
    fn ids_render_without_decoration() {
        assert_eq!(EntityId::from(7).to_string(), "7");
        assert_eq!(EntityId::from("abc").to_string(), "abc");
    }
}
