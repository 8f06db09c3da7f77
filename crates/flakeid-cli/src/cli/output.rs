use std::{io::Write, time::Duration};

use anyhow::Context;
use chrono::{DateTime, SecondsFormat};
use flakeid::SnowflakeId;
use serde::Serialize;

/// An ID unpacked into its fields, with the timestamp resolved against an
/// epoch.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DecodedId {
    pub id: u64,
    /// Milliseconds since the custom epoch, as stored in the ID.
    pub timestamp: u64,
    /// Milliseconds since the Unix epoch.
    pub unix_ms: i64,
    /// RFC 3339 rendering of `unix_ms` in UTC.
    pub time: String,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl DecodedId {
    pub fn new(id: SnowflakeId, epoch: Duration) -> anyhow::Result<Self> {
        let unix_ms = i64::try_from(id.unix_millis(epoch))
            .with_context(|| format!("id {id} resolves to a time beyond i64 milliseconds"))?;
        let time = DateTime::from_timestamp_millis(unix_ms)
            .with_context(|| format!("id {id} resolves to an unrepresentable time"))?
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        Ok(Self {
            id: id.to_raw(),
            timestamp: id.timestamp(),
            unix_ms,
            time,
            datacenter_id: id.datacenter_id(),
            worker_id: id.worker_id(),
            sequence: id.sequence(),
        })
    }
}

/// Writes a freshly minted ID: the bare decimal value, or the decoded JSON
/// object.
pub fn write_generated<W: Write>(
    out: &mut W,
    id: SnowflakeId,
    epoch: Duration,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        write_json(out, &DecodedId::new(id, epoch)?)
    } else {
        writeln!(out, "{id}")?;
        Ok(())
    }
}

/// Writes a decoded ID as `key=value` pairs or as a JSON object.
pub fn write_decoded<W: Write>(out: &mut W, decoded: &DecodedId, json: bool) -> anyhow::Result<()> {
    if json {
        return write_json(out, decoded);
    }
    writeln!(
        out,
        "id={} time={} timestamp={} datacenter={} worker={} sequence={}",
        decoded.id,
        decoded.time,
        decoded.timestamp,
        decoded.datacenter_id,
        decoded.worker_id,
        decoded.sequence
    )?;
    Ok(())
}

fn write_json<W: Write>(out: &mut W, decoded: &DecodedId) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, decoded)?;
    writeln!(out)?;
    Ok(())
}
