// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! TFRecord framing.
//!
//! Each record is laid out as:
//!
//! ```text
//! u64   length (little endian)
//! u32   masked crc32c of length
//! [u8]  payload (length bytes)
//! u32   masked crc32c of payload
//! ```
//!
//! The checksums are read and discarded.

use std::io::{self, Read};

use thiserror::Error;

const LENGTH_SIZE: usize = 8;
const CRC_SIZE: usize = 4;

/// Upper bound for a single record, to fail fast on files that are not
/// TFRecord-framed instead of trying to allocate a garbage length.
pub const MAX_RECORD_SIZE: u64 = 256 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("read failed: {0}")]
    Io(#[from] io::Error),
    /// The stream ended inside a record.
    #[error("truncated record")]
    Truncated,
    /// The length header is larger than `MAX_RECORD_SIZE`.
    #[error("record length {0} exceeds limit")]
    Oversized(u64),
}

/// Iterates over the payloads of a TFRecord stream.
pub struct RecordReader<R> {
    inner: R,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    fn read_record(&mut self) -> Result<Option<Vec<u8>>, RecordError> {
        let mut header = [0u8; LENGTH_SIZE];
        match read_full(&mut self.inner, &mut header)? {
            0 => return Ok(None),
            n if n < LENGTH_SIZE => return Err(RecordError::Truncated),
            _ => {}
        }
        let length = u64::from_le_bytes(header);
        if length > MAX_RECORD_SIZE {
            return Err(RecordError::Oversized(length));
        }

        let mut crc = [0u8; CRC_SIZE];
        if read_full(&mut self.inner, &mut crc)? < CRC_SIZE {
            return Err(RecordError::Truncated);
        }

        let length = usize::try_from(length).map_err(|_| RecordError::Oversized(length))?;
        let mut payload = vec![0u8; length];
        if read_full(&mut self.inner, &mut payload)? < length {
            return Err(RecordError::Truncated);
        }

        if read_full(&mut self.inner, &mut crc)? < CRC_SIZE {
            return Err(RecordError::Truncated);
        }

        Ok(Some(payload))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Vec<u8>, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(payload)) => Some(Ok(payload)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Like `read_exact`, but reports how many bytes were read before EOF instead
/// of failing.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, RecordError> {
    let mut filled = 0;
    while filled < buf.len() {
        let Some(rest) = buf.get_mut(filled..) else {
            break;
        };
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Frames `payload` as a TFRecord with zeroed checksums.
#[cfg(test)]
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + LENGTH_SIZE + 2 * CRC_SIZE);
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&[0u8; CRC_SIZE]);
    out.extend_from_slice(payload);
    out.extend_from_slice(&[0u8; CRC_SIZE]);
    out
}
