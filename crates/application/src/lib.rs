//! Application services and ports for the donation admin collections.

#![forbid(unsafe_code)]

mod collection_controller;
mod collection_ports;
mod debounce;
mod osc_lookup_service;

pub use collection_controller::{
    CollectionController, CollectionPhase, CollectionQuery, CollectionState,
};
pub use collection_ports::{
    CollectionGateway, CredentialProvider, Mutation, MutationKind, ResponseEnvelope,
};
pub use debounce::Debouncer;
pub use osc_lookup_service::{
    OSC_LOOKUP_DELAY, OSC_LOOKUP_MIN_CHARS, OscLookupService, OscLookupState,
};
