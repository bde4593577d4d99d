//! Wire decoder for target-grid sensor lines.
//!
//! Each line has already been split off the serial stream by the sensor feed.
//! Two format families are recognized, tried in this order:
//!
//! 1. Annotated capture: free text containing `Bullet Hit Coordinate`
//!    followed by `(<int>, <int>)`. These frames carry no usable timestamp,
//!    so the hit is stamped with the decode-time clock.
//! 2. Delimited pair: `<num><sep><num>[<sep><int>]` where `<sep>` is one of
//!    `,` `:` `;` `|`, tried in that priority order. The optional third field
//!    is an epoch-millisecond timestamp.

use std::sync::Arc;

use rangeline_shared::time::Clock;

use super::{
    entity::{HitRecord, SourceFormat},
    error::DecodeError,
    value_object::Timestamp,
};

/// Marker token of the annotated-capture family.
pub const CAPTURE_MARKER: &str = "Bullet Hit Coordinate";

/// Separators of the delimited-pair family, in priority order.
pub const PAIR_SEPARATORS: [char; 4] = [',', ':', ';', '|'];

/// Stateless decoder; the clock only supplies fallback timestamps.
#[derive(Clone)]
pub struct WireDecoder {
    clock: Arc<dyn Clock>,
}

impl WireDecoder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Decode one sensor line into a hit record.
    ///
    /// Never panics; every unrecognized line comes back as a [`DecodeError`].
    pub fn decode(&self, raw_line: &str) -> Result<HitRecord, DecodeError> {
        let line = raw_line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(DecodeError::Empty);
        }

        if let Some((x, y)) = parse_annotated_capture(line) {
            return Ok(HitRecord {
                x,
                y,
                captured_at_millis: Timestamp::new(self.clock.now_millis()),
                raw_text: line.to_string(),
                source_format: SourceFormat::LegacyBluetoothFrame,
            });
        }

        if let Some((x, y, captured_at)) = parse_delimited_pair(line) {
            let captured_at = captured_at.unwrap_or_else(|| self.clock.now_millis());
            return Ok(HitRecord {
                x,
                y,
                captured_at_millis: Timestamp::new(captured_at),
                raw_text: line.to_string(),
                source_format: SourceFormat::DelimitedPair,
            });
        }

        if line.contains(CAPTURE_MARKER) {
            Err(DecodeError::MalformedCapture(line.to_string()))
        } else {
            Err(DecodeError::UnrecognizedFormat(line.to_string()))
        }
    }
}

/// `... Bullet Hit Coordinate ... (a, b) ...` -> `(a, b)`
fn parse_annotated_capture(line: &str) -> Option<(f64, f64)> {
    let marker_at = line.find(CAPTURE_MARKER)?;
    let after_marker = &line[marker_at + CAPTURE_MARKER.len()..];

    let open = after_marker.find('(')?;
    let inner_start = &after_marker[open + 1..];
    let close = inner_start.find(')')?;
    let inner = &inner_start[..close];

    let (a, b) = inner.split_once(',')?;
    let x: u32 = a.trim().parse().ok()?;
    let y: u32 = b.trim().parse().ok()?;
    Some((f64::from(x), f64::from(y)))
}

/// `x<sep>y[<sep>t]` -> `(x, y, t?)`
fn parse_delimited_pair(line: &str) -> Option<(f64, f64, Option<i64>)> {
    let line = line.trim();
    PAIR_SEPARATORS
        .iter()
        .filter(|sep| line.contains(**sep))
        .find_map(|sep| split_fields(line, *sep))
}

fn split_fields(line: &str, separator: char) -> Option<(f64, f64, Option<i64>)> {
    let fields: Vec<&str> = line.split(separator).map(str::trim).collect();
    match fields.as_slice() {
        [x, y] => Some((parse_coordinate(x)?, parse_coordinate(y)?, None)),
        [x, y, t] => Some((
            parse_coordinate(x)?,
            parse_coordinate(y)?,
            Some(t.parse::<i64>().ok()?),
        )),
        _ => None,
    }
}

fn parse_coordinate(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|value| value.is_finite())
}
