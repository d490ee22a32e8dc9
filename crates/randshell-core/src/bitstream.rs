//! Bitstream ingestion: fixed-size chunking with bit counting, and the
//! ASCII-binary packing converter.
//!
//! A [`BitstreamReader`] pulls exactly `buffer_size_bytes` per chunk from a
//! regular file or character device, counting one/zero bits as it goes. Each
//! [`BitstreamBuffer`] is handed to the test plugin by value — the one place
//! the engine gives up ownership of a resource it allocated; the buffer is
//! dropped when the plugin's execute call finishes with it.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, ShellError};

// ---------------------------------------------------------------------------
// Buffers
// ---------------------------------------------------------------------------

/// One fixed-size chunk of bitstream input plus its bit counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitstreamBuffer {
    pub bytes: Vec<u8>,
    pub num_ones: u64,
    pub num_zeros: u64,
}

impl BitstreamBuffer {
    /// Wrap raw bytes, counting one/zero bits per byte.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let num_ones: u64 = bytes.iter().map(|b| b.count_ones() as u64).sum();
        let num_zeros = bytes.len() as u64 * 8 - num_ones;
        Self {
            bytes,
            num_ones,
            num_zeros,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Chunked reader over any byte source.
#[derive(Debug)]
pub struct BitstreamReader<R: Read> {
    source: R,
    buffer_size_bytes: usize,
}

impl BitstreamReader<File> {
    /// Open a regular file or character device for chunked reading.
    ///
    /// A missing path or a zero-length regular file fails with
    /// `EmptyOrMissingFile`; character devices report a zero length and are
    /// accepted as-is.
    pub fn open(path: &Path, buffer_size_bytes: usize) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|_| {
            ShellError::EmptyOrMissingFile(path.display().to_string())
        })?;
        if metadata.is_file() && metadata.len() == 0 {
            return Err(ShellError::EmptyOrMissingFile(path.display().to_string()));
        }
        let file = File::open(path)?;
        Self::new(file, buffer_size_bytes)
    }
}

impl<R: Read> BitstreamReader<R> {
    /// Wrap an already-open source.
    pub fn new(source: R, buffer_size_bytes: usize) -> Result<Self> {
        if buffer_size_bytes == 0 {
            return Err(ShellError::InvalidArgument(
                "buffer size must be at least 1 byte".into(),
            ));
        }
        Ok(Self {
            source,
            buffer_size_bytes,
        })
    }

    /// Declared chunk size in bytes.
    pub fn buffer_size_bytes(&self) -> usize {
        self.buffer_size_bytes
    }

    /// Read the next full chunk.
    ///
    /// Returns `Ok(None)` on a clean end of input. A trailing partial chunk
    /// is not a test input and fails with `BufferSizeMismatch`.
    pub fn next_buffer(&mut self) -> Result<Option<BitstreamBuffer>> {
        let mut bytes = vec![0u8; self.buffer_size_bytes];
        let mut filled = 0usize;
        while filled < self.buffer_size_bytes {
            let n = self.source.read(&mut bytes[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        match filled {
            0 => Ok(None),
            n if n == self.buffer_size_bytes => Ok(Some(BitstreamBuffer::from_bytes(bytes))),
            n => Err(ShellError::BufferSizeMismatch {
                expected: self.buffer_size_bytes,
                actual: n,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ASCII-binary conversion
// ---------------------------------------------------------------------------

/// Pack ASCII '0'/'1' characters into bytes, MSB first.
///
/// ASCII whitespace is skipped; any other character fails with
/// `InvalidArgument`. Trailing characters beyond a multiple of 8 are
/// silently discarded.
pub fn ascii_to_bytes(input: &[u8]) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(input.len());
    for &c in input {
        match c {
            b'0' => bits.push(0u8),
            b'1' => bits.push(1u8),
            b' ' | b'\t' | b'\r' | b'\n' => {}
            other => {
                return Err(ShellError::InvalidArgument(format!(
                    "unexpected byte 0x{other:02x} in ASCII bitstream"
                )));
            }
        }
    }
    bits.truncate(bits.len() - bits.len() % 8);

    let mut bytes = Vec::with_capacity(bits.len() / 8);
    for chunk in bits.chunks_exact(8) {
        let mut byte = 0u8;
        for &bit in chunk {
            byte = (byte << 1) | bit;
        }
        bytes.push(byte);
    }
    Ok(bytes)
}

/// Convert an ASCII bitstream file to packed binary. Returns the number of
/// bytes written.
pub fn convert_ascii_file(source: &Path, destination: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(source)
        .map_err(|_| ShellError::EmptyOrMissingFile(source.display().to_string()))?;
    if metadata.len() == 0 {
        return Err(ShellError::EmptyOrMissingFile(source.display().to_string()));
    }
    let text = std::fs::read(source)?;
    let packed = ascii_to_bytes(&text)?;
    std::fs::write(destination, &packed)?;
    Ok(packed.len() as u64)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
