use std::fmt::Debug;
use std::hash::Hash;
use std::str::FromStr;

use partilha_core::AppError;
use serde::{Deserialize, Serialize};

/// Closed status enumeration declared by one entity variant.
pub trait StatusValue:
    Copy + Eq + Ord + Hash + Debug + FromStr<Err = AppError> + Send + Sync + 'static
{
    /// Returns every declared value, in declaration order.
    fn all() -> &'static [Self];

    /// Returns the wire value used in filters and payloads.
    fn as_str(&self) -> &'static str;
}

/// Portuguese record status used by stores, regionals and partnerships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RecordStatus {
    /// Record is active.
    Ativa,
    /// Record is inactive.
    Inativa,
    /// Record awaits approval.
    Pendente,
}

impl StatusValue for RecordStatus {
    fn all() -> &'static [Self] {
        const ALL: &[RecordStatus] = &[
            RecordStatus::Ativa,
            RecordStatus::Inativa,
            RecordStatus::Pendente,
        ];

        ALL
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Ativa => "Ativa",
            Self::Inativa => "Inativa",
            Self::Pendente => "Pendente",
        }
    }
}

impl FromStr for RecordStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Ativa" => Ok(Self::Ativa),
            "Inativa" => Ok(Self::Inativa),
            "Pendente" => Ok(Self::Pendente),
            _ => Err(AppError::Validation(format!(
                "unknown record status '{value}'"
            ))),
        }
    }
}

/// Integer flag status (`0` inactive, `1` active) used by legacy store tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BinaryStatus {
    /// Wire value `0`.
    Inactive,
    /// Wire value `1`.
    Active,
}

impl StatusValue for BinaryStatus {
    fn all() -> &'static [Self] {
        const ALL: &[BinaryStatus] = &[BinaryStatus::Inactive, BinaryStatus::Active];

        ALL
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Inactive => "0",
            Self::Active => "1",
        }
    }
}

impl TryFrom<u8> for BinaryStatus {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Inactive),
            1 => Ok(Self::Active),
            _ => Err(AppError::Validation(format!(
                "binary status must be 0 or 1, got {value}"
            ))),
        }
    }
}

impl From<BinaryStatus> for u8 {
    fn from(value: BinaryStatus) -> Self {
        match value {
            BinaryStatus::Inactive => 0,
            BinaryStatus::Active => 1,
        }
    }
}

impl FromStr for BinaryStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "0" => Ok(Self::Inactive),
            "1" => Ok(Self::Active),
            _ => Err(AppError::Validation(format!(
                "unknown binary status '{value}'"
            ))),
        }
    }
}

/// Lowercase lifecycle status used by OSCs, campaigns and contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleStatus {
    /// Participating normally.
    Active,
    /// No longer participating.
    Inactive,
    /// Registration under review.
    Pending,
}

impl StatusValue for LifecycleStatus {
    fn all() -> &'static [Self] {
        const ALL: &[LifecycleStatus] = &[
            LifecycleStatus::Active,
            LifecycleStatus::Inactive,
            LifecycleStatus::Pending,
        ];

        ALL
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
        }
    }
}

impl FromStr for LifecycleStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            _ => Err(AppError::Validation(format!(
                "unknown lifecycle status '{value}'"
            ))),
        }
    }
}
