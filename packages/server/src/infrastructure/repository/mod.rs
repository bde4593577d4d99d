//! Collaborator implementations
//!
//! - `inmemory`: テストや一時的な実行用（プロセス終了で消える）
//! - `file`: セッションごとの JSON ファイル

pub mod file;
pub mod inmemory;

pub use file::FileSnapshotStore;
pub use inmemory::{InMemorySnapshotStore, StaticMetadataLookup};
