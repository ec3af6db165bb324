use std::str::FromStr;

use chrono::{DateTime, Utc};
use partilha_core::{AppError, AppResult};
use partilha_domain::{EntityId, FilterSet};
use serde_json::Value;

pub const USAGE: &str = "usage:
  partilha-admin list <resource> [key=value ...]
  partilha-admin stats <resource> [key=value ...]
  partilha-admin create <resource> <json>
  partilha-admin update <resource> <id> <json>
  partilha-admin delete <resource> <id>
  partilha-admin session set <token> [expires-at]
  partilha-admin session clear

resources: stores, lojas, oscs, regionals, partnerships, campaigns, contacts, stores-external";

/// Collection resources exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Stores,
    Lojas,
    Oscs,
    Regionals,
    Partnerships,
    Campaigns,
    Contacts,
    StoresExternal,
}

impl Resource {
    pub fn all() -> &'static [Self] {
        &[
            Self::Stores,
            Self::Lojas,
            Self::Oscs,
            Self::Regionals,
            Self::Partnerships,
            Self::Campaigns,
            Self::Contacts,
            Self::StoresExternal,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stores => "stores",
            Self::Lojas => "lojas",
            Self::Oscs => "oscs",
            Self::Regionals => "regionals",
            Self::Partnerships => "partnerships",
            Self::Campaigns => "campaigns",
            Self::Contacts => "contacts",
            Self::StoresExternal => "stores-external",
        }
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource '{value}'")))
    }
}

/// Operation applied to one collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionAction {
    List(FilterSet),
    Stats(FilterSet),
    Create(Value),
    Update(EntityId, Value),
    Delete(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Collection {
        resource: Resource,
        action: CollectionAction,
    },
    SessionSet {
        token: String,
        expires_at: Option<DateTime<Utc>>,
    },
    SessionClear,
}

impl AdminCommand {
    /// Parses the arguments that follow the program name.
    pub fn parse<I>(args: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let args: Vec<String> = args.into_iter().collect();
        let Some((command, rest)) = args.split_first() else {
            return Err(usage_error("missing command"));
        };

        if command == "session" {
            return parse_session(rest);
        }

        let Some((resource, rest)) = rest.split_first() else {
            return Err(usage_error("missing resource"));
        };
        let resource = resource.parse::<Resource>()?;

        let action = match (command.as_str(), rest) {
            ("list", pairs) => CollectionAction::List(parse_filter(pairs)?),
            ("stats", pairs) => CollectionAction::Stats(parse_filter(pairs)?),
            ("create", [payload]) => CollectionAction::Create(parse_payload(payload)?),
            ("update", [id, payload]) => {
                CollectionAction::Update(EntityId::parse(id), parse_payload(payload)?)
            }
            ("delete", [id]) => CollectionAction::Delete(EntityId::parse(id)),
            ("create" | "update" | "delete", _) => {
                return Err(usage_error(&format!("wrong arguments for '{command}'")));
            }
            (other, _) => return Err(usage_error(&format!("unknown command '{other}'"))),
        };

        Ok(Self::Collection { resource, action })
    }
}

fn parse_session(rest: &[String]) -> AppResult<AdminCommand> {
    match rest {
        [verb] if verb == "clear" => Ok(AdminCommand::SessionClear),
        [verb, token] if verb == "set" => Ok(AdminCommand::SessionSet {
            token: token.clone(),
            expires_at: None,
        }),
        [verb, token, expires_at] if verb == "set" => {
            let expires_at = expires_at.parse::<DateTime<Utc>>().map_err(|error| {
                AppError::Validation(format!("invalid expiry '{expires_at}': {error}"))
            })?;
            Ok(AdminCommand::SessionSet {
                token: token.clone(),
                expires_at: Some(expires_at),
            })
        }
        _ => Err(usage_error("wrong arguments for 'session'")),
    }
}

fn parse_filter(pairs: &[String]) -> AppResult<FilterSet> {
    let pairs = pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .ok_or_else(|| AppError::Validation(format!("expected key=value, got '{pair}'")))
        })
        .collect::<AppResult<Vec<_>>>()?;

    FilterSet::from_pairs(pairs)
}

fn parse_payload(payload: &str) -> AppResult<Value> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|error| AppError::Validation(format!("payload is not valid JSON: {error}")))?;
    if !value.is_object() {
        return Err(AppError::Validation(
            "payload must be a JSON object".to_owned(),
        ));
    }

    Ok(value)
}

fn usage_error(reason: &str) -> AppError {
    AppError::Validation(format!("{reason}\n{USAGE}"))
}
