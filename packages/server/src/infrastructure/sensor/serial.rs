//! Serial sensor feed.
//!
//! Owns the sensor transport exclusively, splits the byte stream on `\n` and
//! forwards each line to the pipeline as a [`SensorEvent::Frame`]. When the
//! transport cannot be opened or is lost, the feed waits with capped
//! exponential backoff and reopens it. It never touches decoder or router
//! state.
//!
//! The device is opened as a plain file, which covers character devices
//! such as `/dev/ttyUSB0` whose line settings are configured outside the
//! process (e.g. with `stty`).

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader},
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::domain::SensorEvent;

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("failed to open sensor device '{device}': {source}")]
    Open {
        device: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read from sensor: {0}")]
    Read(#[from] std::io::Error),
}

/// Reconnect delays: `initial`, doubled per failed attempt, capped at `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

impl BackoffPolicy {
    pub fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }
}

/// Longest line forwarded as a frame, excluding the line terminator.
pub const MAX_FRAME_LEN: usize = 256;

/// Why [`read_frames`] returned without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The transport reported end of stream.
    Eof,
    /// Nobody is consuming frames any more.
    ReceiverClosed,
}

/// Forward every line of `reader` to `events`, in order.
///
/// Invalid UTF-8 is replaced rather than rejected so one corrupt byte costs
/// at most one line. Blank lines are dropped. Lines longer than
/// [`MAX_FRAME_LEN`] are discarded up to the next `\n`.
pub async fn read_frames<R>(
    reader: &mut R,
    events: &mpsc::Sender<SensorEvent>,
) -> Result<StreamEnd, SensorError>
where
    R: AsyncBufRead + Unpin,
{
    // Room for a full frame plus `\r\n`.
    let limit = (MAX_FRAME_LEN + 2) as u64;
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        let read = (&mut *reader).take(limit).read_until(b'\n', &mut buf).await?;
        if read == 0 {
            return Ok(StreamEnd::Eof);
        }
        if buf.last() != Some(&b'\n') && buf.len() as u64 == limit {
            let discarded = buf.len() + skip_line(reader, limit).await?;
            tracing::warn!(
                "Discarding sensor line longer than {} bytes ({} bytes dropped)",
                MAX_FRAME_LEN,
                discarded
            );
            continue;
        }
        while matches!(buf.last(), Some(b'\r' | b'\n')) {
            buf.pop();
        }
        if buf.len() > MAX_FRAME_LEN {
            tracing::warn!(
                "Discarding sensor line longer than {} bytes ({} bytes dropped)",
                MAX_FRAME_LEN,
                buf.len()
            );
            continue;
        }
        let line = String::from_utf8_lossy(&buf);
        if line.trim().is_empty() {
            continue;
        }
        if events
            .send(SensorEvent::Frame(line.to_string()))
            .await
            .is_err()
        {
            return Ok(StreamEnd::ReceiverClosed);
        }
    }
}

/// Consume input up to and including the next `\n` (or EOF) in bounded chunks.
async fn skip_line<R>(reader: &mut R, chunk: u64) -> Result<usize, SensorError>
where
    R: AsyncBufRead + Unpin,
{
    let mut scratch = Vec::new();
    let mut skipped = 0;
    loop {
        scratch.clear();
        let read = (&mut *reader).take(chunk).read_until(b'\n', &mut scratch).await?;
        skipped += read;
        if read == 0 || scratch.last() == Some(&b'\n') {
            return Ok(skipped);
        }
    }
}

pub struct SerialSensorFeed {
    device: PathBuf,
    backoff: BackoffPolicy,
}

impl SerialSensorFeed {
    pub fn new(device: impl AsRef<Path>, backoff: BackoffPolicy) -> Self {
        Self {
            device: device.as_ref().to_path_buf(),
            backoff,
        }
    }

    /// Start the read loop; events go to `events` until shutdown or until
    /// the receiver is dropped.
    pub fn spawn(self, events: mpsc::Sender<SensorEvent>) -> SensorFeedHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = self.run(&events) => {}
                _ = &mut shutdown_rx => {}
            }
            tracing::info!("Sensor feed '{}' stopped", self.device.display());
        });
        SensorFeedHandle { shutdown_tx, task }
    }

    async fn run(&self, events: &mpsc::Sender<SensorEvent>) {
        let source = self.device.display().to_string();
        let mut delay = self.backoff.initial;

        loop {
            let reason = match self.open().await {
                Ok(mut reader) => {
                    tracing::info!("Sensor device '{}' opened", source);
                    delay = self.backoff.initial;
                    if events
                        .send(SensorEvent::Connected {
                            source: source.clone(),
                        })
                        .await
                        .is_err()
                    {
                        return;
                    }
                    match read_frames(&mut reader, events).await {
                        Ok(StreamEnd::ReceiverClosed) => return,
                        Ok(StreamEnd::Eof) => "end of stream".to_string(),
                        Err(e) => e.to_string(),
                    }
                }
                Err(e) => e.to_string(),
            };

            tracing::warn!(
                "Sensor '{}' unavailable ({}); retrying in {:?}",
                source,
                reason,
                delay
            );
            if events
                .send(SensorEvent::Disconnected {
                    source: source.clone(),
                    reason,
                })
                .await
                .is_err()
            {
                return;
            }
            tokio::time::sleep(delay).await;
            delay = self.backoff.next(delay);
        }
    }

    async fn open(&self) -> Result<BufReader<tokio::fs::File>, SensorError> {
        let file = tokio::fs::File::open(&self.device)
            .await
            .map_err(|source| SensorError::Open {
                device: self.device.display().to_string(),
                source,
            })?;
        Ok(BufReader::new(file))
    }
}

pub struct SensorFeedHandle {
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SensorFeedHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Sensor feed task failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_backoff_doubles_and_caps() {
        // テスト項目: 待機時間は 2 倍ずつ増え、上限で頭打ちになる
        // given (前提条件):
        let policy = BackoffPolicy {
            initial: Duration::from_millis(100),
            max: Duration::from_millis(350),
        };

        // when (操作):
        let second = policy.next(policy.initial);
        let third = policy.next(second);
        let fourth = policy.next(third);

        // then (期待する結果):
        assert_eq!(second, Duration::from_millis(200));
        assert_eq!(third, Duration::from_millis(350));
        assert_eq!(fourth, Duration::from_millis(350));
    }

    #[tokio::test]
    async fn test_read_frames_splits_lines() {
        // テスト項目: 改行で分割され、CRLF と空行が除去され、不正な UTF-8 は置換される
        // given (前提条件):
        let mut input: &[u8] = b"1,2\r\n\r\nBullet Hit Coordinate (3, 4)\n\xff\xfe,5\n7|8";
        let (tx, mut rx) = mpsc::channel(16);

        // when (操作):
        let end = read_frames(&mut input, &tx).await.unwrap();
        drop(tx);

        // then (期待する結果):
        assert_eq!(end, StreamEnd::Eof);
        let mut frames = Vec::new();
        while let Some(SensorEvent::Frame(line)) = rx.recv().await {
            frames.push(line);
        }
        assert_eq!(
            frames,
            vec![
                "1,2".to_string(),
                "Bullet Hit Coordinate (3, 4)".to_string(),
                "\u{FFFD}\u{FFFD},5".to_string(),
                "7|8".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_read_frames_discards_oversized_lines() {
        // テスト項目: 改行のない長大な入力は破棄され、次の行から読み込みを再開する
        // given (前提条件):
        let mut data = vec![b'7'; 1 << 20];
        data.extend_from_slice(b"\n1,2\n");
        data.extend(std::iter::repeat_n(b'9', MAX_FRAME_LEN * 3));
        let mut input: &[u8] = &data;
        let (tx, mut rx) = mpsc::channel(16);

        // when (操作):
        let end = read_frames(&mut input, &tx).await.unwrap();
        drop(tx);

        // then (期待する結果):
        assert_eq!(end, StreamEnd::Eof);
        let mut frames = Vec::new();
        while let Some(SensorEvent::Frame(line)) = rx.recv().await {
            frames.push(line);
        }
        assert_eq!(frames, vec!["1,2".to_string()]);
    }

    #[tokio::test]
    async fn test_read_frames_keeps_line_at_max_length() {
        // テスト項目: 上限ちょうどの行（CRLF 付き）はそのまま転送される
        // given (前提条件):
        let line = "8".repeat(MAX_FRAME_LEN);
        let data = format!("{}\r\n", line);
        let mut input: &[u8] = data.as_bytes();
        let (tx, mut rx) = mpsc::channel(4);

        // when (操作):
        read_frames(&mut input, &tx).await.unwrap();
        drop(tx);

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some(SensorEvent::Frame(line)));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_read_frames_stops_when_receiver_dropped() {
        // テスト項目: 受信側がいなくなると読み込みを終了する
        // given (前提条件):
        let mut input: &[u8] = b"1,2\n3,4\n";
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // when (操作):
        let end = read_frames(&mut input, &tx).await.unwrap();

        // then (期待する結果):
        assert_eq!(end, StreamEnd::ReceiverClosed);
    }

    #[tokio::test]
    async fn test_feed_reports_connect_frames_and_disconnect() {
        // テスト項目: デバイスを開くと Connected、各行の Frame、終端で Disconnected が届く
        // given (前提条件):
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "10,20\n30,40\n").unwrap();
        let feed = SerialSensorFeed::new(
            file.path(),
            BackoffPolicy {
                initial: Duration::from_secs(60),
                max: Duration::from_secs(60),
            },
        );
        let (tx, mut rx) = mpsc::channel(16);

        // when (操作):
        let handle = feed.spawn(tx);
        let mut events = Vec::new();
        for _ in 0..4 {
            events.push(rx.recv().await.unwrap());
        }
        handle.shutdown().await;

        // then (期待する結果):
        assert!(matches!(events[0], SensorEvent::Connected { .. }));
        assert_eq!(events[1], SensorEvent::Frame("10,20".to_string()));
        assert_eq!(events[2], SensorEvent::Frame("30,40".to_string()));
        assert!(matches!(
            &events[3],
            SensorEvent::Disconnected { reason, .. } if reason == "end of stream"
        ));
    }

    #[tokio::test]
    async fn test_feed_reports_missing_device() {
        // テスト項目: 存在しないデバイスは Disconnected として通知され、タスクは生き続ける
        // given (前提条件):
        let dir = tempfile::tempdir().unwrap();
        let feed = SerialSensorFeed::new(dir.path().join("ttyMISSING"), BackoffPolicy::default());
        let (tx, mut rx) = mpsc::channel(16);

        // when (操作):
        let handle = feed.spawn(tx);
        let event = rx.recv().await.unwrap();
        handle.shutdown().await;

        // then (期待する結果):
        match event {
            SensorEvent::Disconnected { source, reason } => {
                assert!(source.ends_with("ttyMISSING"));
                assert!(reason.contains("failed to open sensor device"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
