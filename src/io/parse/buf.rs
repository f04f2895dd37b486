use std::{
    cmp::{max, min},
    fmt,
    io::{self, Read},
    ops,
};

use super::{Error, Input};


/// The initial size of the buffer in bytes.
const START_BUFFER_SIZE: usize = 8 * 1024;

/// The maximum size the internal buffer can grow to.
///
/// Parsers never need a large chunk of data at once: a header line, an ASCII
/// literal or a binary value are all tiny. The window only grows beyond the
/// start size for unusually long header lines. A file that needs more than
/// this (e.g. a multi megabyte "number") is rejected with `LookAheadTooBig`.
pub(crate) const MAX_BUFFER_SIZE: usize = 4 * 1024 * 1024;

// The correctness of some code depends on this.
static_assertions::const_assert!(START_BUFFER_SIZE <= MAX_BUFFER_SIZE);

/// A parse buffer wrapping an `io::Read`. Dereferences to the currently
/// prefetched, unconsumed bytes.
///
/// The buffer does its own buffering, so wrapping the reader in a
/// `BufReader` is unnecessary.
pub(crate) struct Buffer<R: Read> {
    reader: R,

    buf: Vec<u8>,

    /// Points to the first byte in `buf` that is real data. Invariants:
    /// - `0 <= start <= end`
    start: usize,

    /// Points to the byte after the last byte of real data. Invariants:
    /// - `0 <= end <= buf.len()`
    /// - `start <= end`
    end: usize,

    consumed_total: usize,
}

impl<R: Read> fmt::Debug for Buffer<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Buffer {{ consumed_total: {}, .. }}", self.consumed_total)
    }
}

impl<R: Read> Buffer<R> {
    pub(crate) fn new(reader: R) -> Result<Self, Error> {
        let mut out = Self {
            buf: vec![0; START_BUFFER_SIZE],
            reader,
            start: 0,
            end: 0,
            consumed_total: 0,
        };

        // Read once to prefill the buffer.
        out.fill_buf_by(1)?;

        Ok(out)
    }

    // =======================================================================
    // ===== Internal methods
    // =======================================================================

    fn cap(&self) -> usize {
        self.buf.len()
    }

    /// Makes sure there is space for at least `additional` more bytes after
    /// `self.end`, either by moving the data to the front or by growing the
    /// buffer.
    #[inline(never)]
    fn grow_buf(&mut self, additional: usize) -> Result<(), Error> {
        let len = self.end - self.start;
        let space_after = self.cap() - self.end;
        let space_before = self.start;

        if space_after >= additional {
            return Ok(());
        }

        // Moving is only worth it if the data is small compared to the
        // buffer. Otherwise alternating big and small reads would make us
        // copy almost the whole buffer every other read.
        if space_after + space_before >= additional && len < self.cap() / 2 {
            self.buf.copy_within(self.start..self.end, 0);
        } else {
            if len + additional > MAX_BUFFER_SIZE {
                return Err(Error::LookAheadTooBig);
            }

            // At least twice the current size to keep reallocations rare.
            let new_len = min(max(len + additional, self.cap() * 2), MAX_BUFFER_SIZE);

            let mut new = Vec::with_capacity(new_len);
            new.extend_from_slice(&self.buf[self.start..self.end]);
            new.resize(new_len, 0);
            self.buf = new;
        }

        // In both cases, the data starts at the very beginning now.
        self.end -= self.start;
        self.start = 0;

        Ok(())
    }

    /// Reads until `additional` new bytes are in the buffer or the reader is
    /// exhausted. Returns the number of bytes read.
    #[inline(never)]
    fn fill_buf_by(&mut self, additional: usize) -> Result<usize, Error> {
        self.grow_buf(additional)?;

        // We ignore `Interrupted` errors and just continue.
        let mut bytes_read = 0;
        while bytes_read < additional {
            match self.reader.read(&mut self.buf[self.end + bytes_read..]) {
                // `self.buf[self.end + bytes_read..]` is not empty (ensured
                // by `grow_buf`), so the reader is exhausted.
                Ok(0) => break,
                Ok(n) => bytes_read += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.end += bytes_read;
        Ok(bytes_read)
    }
}

impl<R: Read> ops::Deref for Buffer<R> {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.buf[self.start..self.end]
    }
}

impl<R: Read> Input for Buffer<R> {
    fn prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        #[cold]
        #[inline(never)]
        fn fill(this: &mut Buffer<impl Read>, diff: usize) -> Result<(), Error> {
            let bytes_read = this.fill_buf_by(diff)?;

            if bytes_read < diff {
                return Err(Error::UnexpectedEof(this.offset() + this.len()));
            }

            Ok(())
        }

        if self.len() < num_bytes {
            return fill(self, num_bytes - self.len());
        }

        Ok(())
    }

    fn saturating_prepare(&mut self, num_bytes: usize) -> Result<(), Error> {
        if self.len() < num_bytes {
            let diff = num_bytes - self.len();
            self.fill_buf_by(diff)?;
        }

        Ok(())
    }

    fn consume(&mut self, num_bytes: usize) {
        assert!(self.start + num_bytes <= self.end);

        self.start += num_bytes;
        self.consumed_total += num_bytes;

        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
    }

    fn is_eof(&mut self) -> Result<bool, Error> {
        if self.len() == 0 {
            Ok(self.fill_buf_by(1)? == 0)
        } else {
            Ok(false)
        }
    }

    fn offset(&self) -> usize {
        self.consumed_total
    }
}
