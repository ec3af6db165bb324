//! Domain entities, filters and pagination for the donation admin collections.

#![forbid(unsafe_code)]

mod campaign;
mod entity;
mod filter;
mod osc;
mod page;
mod regional;
mod status;
mod store;
mod tally;

pub use campaign::{Campaign, Partnership};
pub use entity::{CollectionEntity, EntityId};
pub use filter::{FilterSet, PAGE_SIZE_PARAM, RequestDescriptor};
pub use osc::{Contact, Osc};
pub use page::{DEFAULT_PAGE_SIZE, PageInfo};
pub use regional::Regional;
pub use status::{BinaryStatus, LifecycleStatus, RecordStatus, StatusValue};
pub use store::{Loja, Store, StoreExternal};
pub use tally::StatusTally;
