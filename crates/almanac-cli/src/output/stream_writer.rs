//! NDJSON event stream written by `--stream`.
//!
//! One event per line, `seq` gap-free from 1. The stream closes with a single
//! `end` event and the writer refuses anything after it.

use std::io::Write;

use almanac_core::{EnvelopeError, EnvelopeStatus, UtcDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    Progress,
    Chunk,
    Error,
    End,
}

/// Counts carried by `progress` and `end` events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub row_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

#[derive(Serialize)]
struct Progress<'a> {
    phase: &'a str,
    #[serde(flatten)]
    tally: Tally,
}

#[derive(Serialize)]
struct Closing {
    status: EnvelopeStatus,
    #[serde(flatten)]
    tally: Tally,
}

#[derive(Serialize)]
struct Event<'a, D> {
    event: EventKind,
    seq: u64,
    ts: UtcDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a EnvelopeError>,
}

pub struct NdjsonStreamWriter<W: Write> {
    writer: W,
    next_seq: u64,
    ended: bool,
}

impl<W: Write> NdjsonStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            next_seq: 1,
            ended: false,
        }
    }

    pub fn start(&mut self, data: &Value) -> Result<(), CliError> {
        self.emit(EventKind::Start, Some(data), None)
    }

    pub fn progress(&mut self, phase: &str, tally: Tally) -> Result<(), CliError> {
        self.emit(EventKind::Progress, Some(Progress { phase, tally }), None)
    }

    pub fn chunk(&mut self, data: &Value) -> Result<(), CliError> {
        self.emit(EventKind::Chunk, Some(data), None)
    }

    pub fn error(&mut self, error: &EnvelopeError) -> Result<(), CliError> {
        self.emit(EventKind::Error, None::<()>, Some(error))
    }

    pub fn end(&mut self, status: EnvelopeStatus, tally: Tally) -> Result<(), CliError> {
        self.emit(EventKind::End, Some(Closing { status, tally }), None)?;
        self.ended = true;
        Ok(())
    }

    fn emit<D: Serialize>(
        &mut self,
        event: EventKind,
        data: Option<D>,
        error: Option<&EnvelopeError>,
    ) -> Result<(), CliError> {
        if self.ended {
            return Err(CliError::Stream(format!(
                "cannot emit {event:?} event after end (seq {})",
                self.next_seq
            )));
        }

        let line = serde_json::to_string(&Event {
            event,
            seq: self.next_seq,
            ts: UtcDateTime::now(),
            data,
            error,
        })?;
        self.next_seq += 1;

        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }
}
