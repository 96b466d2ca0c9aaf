//! Sequential byte input over any [`std::io::Read`].

use std::io::{self, Read};

use crate::result::{Error, Result};

/// A thin sequential reader. Buffering, if desired, is the caller's
/// responsibility (wrap the inner reader in a [`std::io::BufReader`]), the
/// same way every other stream in this codebase leaves it to the caller.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads exactly `n` bytes, failing with [`Error::EndOfStream`] if the
    /// source is exhausted first.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Reads exactly `buf.len()` bytes into `buf`.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(Error::EndOfStream),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Discards exactly `n` bytes.
    pub fn skip(&mut self, mut n: usize) -> Result<()> {
        let mut scratch = [0u8; 256];
        while n > 0 {
            let chunk = n.min(scratch.len());
            self.read_into(&mut scratch[..chunk])?;
            n -= chunk;
        }
        Ok(())
    }
}
