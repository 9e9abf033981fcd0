//! `std::io` adapters.

use crate::digest::Digest;
use crate::error::Blake2bError;
use crate::params::HashConfig;
use crate::state::Blake2bState;
use std::io::{self, Read, Write};

/// Read buffer size used by [`hash_reader`].
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

impl Write for Blake2bState {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Hash everything `reader` yields until EOF.
///
/// # Errors
///
/// Returns [`Blake2bError::Io`] if reading fails.
pub fn hash_reader<R: Read>(config: &HashConfig, reader: R) -> Result<Digest, Blake2bError> {
    hash_reader_buffered(config, reader, READ_BUFFER_SIZE)
}

/// [`hash_reader`] with an explicit read buffer size (at least one byte).
///
/// # Errors
///
/// Returns [`Blake2bError::Io`] if reading fails.
pub fn hash_reader_buffered<R: Read>(
    config: &HashConfig,
    mut reader: R,
    buffer_size: usize,
) -> Result<Digest, Blake2bError> {
    let mut state = config.to_state();
    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        state.update(&buf[..n])?;
    }
    Ok(state.finalize()?)
}
