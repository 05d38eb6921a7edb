//! Environment image encoding and decoding

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use super::{ByteOrder, CRC_SIZE, DEFAULT_ENV_SIZE, REDUNDANT_FLAG};
use crate::error::{Error, Result};

/// Parameters of an environment image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvImageBuilder {
    /// Total image size in bytes
    pub size: usize,
    /// Reserve and set the redundancy flag byte
    pub redundant: bool,
    /// Byte order of the checksum
    pub byte_order: ByteOrder,
    /// Byte used to pad the payload
    pub fill: u8,
}

impl Default for EnvImageBuilder {
    fn default() -> Self {
        Self {
            size: DEFAULT_ENV_SIZE,
            redundant: false,
            byte_order: ByteOrder::Little,
            fill: 0x00,
        }
    }
}

impl EnvImageBuilder {
    /// Builder for an image of `size` bytes with default options
    pub fn new(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Set whether the storage holds redundant copies
    pub fn redundant(mut self, redundant: bool) -> Self {
        self.redundant = redundant;
        self
    }

    /// Set the checksum byte order
    pub fn byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    /// Set the padding byte
    pub fn fill(mut self, fill: u8) -> Self {
        self.fill = fill;
        self
    }

    /// Bytes in front of the payload
    pub fn header_len(&self) -> usize {
        CRC_SIZE + usize::from(self.redundant)
    }

    /// Payload bytes available for variables
    pub fn capacity(&self) -> Result<usize> {
        self.size
            .checked_sub(self.header_len())
            .ok_or(Error::EnvironmentTooSmall {
                size: self.size,
                header: self.header_len(),
            })
    }

    /// Build an image from env text, one `key=value` per line
    pub fn build_text(&self, text: &str) -> Result<EnvImage> {
        self.build(text.lines())
    }

    /// Build an image from `key=value` lines
    ///
    /// Empty lines and lines starting with `#` are skipped. Nothing is
    /// produced if the variables do not fit.
    pub fn build<'a, I>(&self, lines: I) -> Result<EnvImage>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let capacity = self.capacity()?;
        let mut payload = Payload::new(capacity, self.fill);
        let mut variables = 0;

        for line in lines {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            payload.push_variable(line)?;
            variables += 1;
            log::debug!("Added variable: {} at position {}", line.trim(), payload.cursor);
        }

        let checksum = crc32fast::hash(&payload.buf);
        let mut data = Vec::with_capacity(self.size);
        data.extend_from_slice(&self.byte_order.encode(checksum));
        if self.redundant {
            data.push(REDUNDANT_FLAG);
        }
        data.extend_from_slice(&payload.buf);

        Ok(EnvImage {
            data,
            header_len: self.header_len(),
            checksum,
            used: payload.cursor,
            variables,
        })
    }
}

/// Payload area with an explicit write cursor
struct Payload {
    buf: Vec<u8>,
    cursor: usize,
}

impl Payload {
    fn new(capacity: usize, fill: u8) -> Self {
        Self {
            buf: vec![fill; capacity],
            cursor: 0,
        }
    }

    /// Append `line` plus its NUL terminator
    fn push_variable(&mut self, line: &str) -> Result<()> {
        let bytes = line.as_bytes();
        let needed = self.cursor + bytes.len() + 1;
        if needed > self.buf.len() {
            return Err(Error::EnvironmentOverflow {
                needed,
                capacity: self.buf.len(),
            });
        }

        self.buf[self.cursor..self.cursor + bytes.len()].copy_from_slice(bytes);
        self.buf[needed - 1] = 0;
        self.cursor = needed;
        Ok(())
    }
}

/// A finished environment image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvImage {
    data: Vec<u8>,
    header_len: usize,
    checksum: u32,
    used: usize,
    variables: usize,
}

impl EnvImage {
    /// The complete image
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the image, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Total image size
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the image has zero length
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Payload area (everything after the header)
    pub fn payload(&self) -> &[u8] {
        &self.data[self.header_len..]
    }

    /// Checksum stored in the header
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Payload bytes taken by variables
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of variables stored
    pub fn variable_count(&self) -> usize {
        self.variables
    }

    /// Parse and verify an existing image
    pub fn decode(data: &[u8], redundant: bool, byte_order: ByteOrder) -> Result<DecodedEnv> {
        let header_len = CRC_SIZE + usize::from(redundant);
        if data.len() < header_len {
            return Err(Error::EnvironmentTooSmall {
                size: data.len(),
                header: header_len,
            });
        }

        let stored = byte_order.decode([data[0], data[1], data[2], data[3]]);
        let payload = &data[header_len..];
        let computed = crc32fast::hash(payload);
        if stored != computed {
            return Err(Error::ChecksumMismatch { stored, computed });
        }

        // Variables end at the first empty string or at the fill run
        let variables = payload
            .split(|b| *b == 0)
            .take_while(|s| !s.is_empty() && s.contains(&b'='))
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();

        Ok(DecodedEnv {
            checksum: stored,
            flag: redundant.then(|| data[CRC_SIZE]),
            variables,
        })
    }
}

/// Contents of a verified environment image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEnv {
    /// Checksum (verified)
    pub checksum: u32,
    /// Redundancy flag, for redundant images
    pub flag: Option<u8>,
    /// `key=value` strings in storage order
    pub variables: Vec<String>,
}
