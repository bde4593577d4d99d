//! Sensor transports
//!
//! センサーからの入力を行単位の `SensorEvent` としてパイプラインに渡します。

pub mod serial;

pub use serial::{BackoffPolicy, SensorError, SensorFeedHandle, SerialSensorFeed};
