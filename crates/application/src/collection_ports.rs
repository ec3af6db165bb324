mod credentials;
mod envelope;
mod gateway;

pub use credentials::CredentialProvider;
pub use envelope::ResponseEnvelope;
pub use gateway::{CollectionGateway, Mutation, MutationKind};
