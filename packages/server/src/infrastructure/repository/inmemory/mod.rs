mod metadata;
mod snapshot;

pub use metadata::StaticMetadataLookup;
pub use snapshot::InMemorySnapshotStore;
