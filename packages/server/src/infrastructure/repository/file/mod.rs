mod snapshot;

pub use snapshot::FileSnapshotStore;
