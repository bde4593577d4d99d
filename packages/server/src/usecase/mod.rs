//! UseCase layer
//!
//! ドメインロジックとコラボレーターを組み合わせて、パイプラインの各操作を実装します。

pub mod broadcast_hub;
pub mod error;
pub mod heartbeat;
pub mod live_pipeline;
pub mod session_control;
pub mod session_router;
pub mod session_statistics;
pub mod snapshot_persister;

pub use broadcast_hub::{BroadcastHub, SessionEventKind};
pub use error::{SessionError, StatisticsError};
pub use heartbeat::Heartbeat;
pub use live_pipeline::{LiveShotPipeline, PipelineHandle};
pub use session_control::SessionControlUseCase;
pub use session_router::SessionRouter;
pub use session_statistics::{
    SessionReport, SessionStatisticsUseCase, ShotScore, StatisticsRequest,
};
pub use snapshot_persister::{SnapshotPersister, SnapshotSink};
