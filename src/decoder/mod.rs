//! The decoder: components B through I assembled into one stateful,
//! single-threaded state machine.
//!
//! `Decoder<R>` owns the byte source, the dual-mode block-data reader, and
//! the handle table. Decoding a nested record recurses on the same
//! instance (§5) — that recursion is the only concurrency this type
//! permits.

mod class_desc;
mod object;

use std::io::Read;

use log::{debug, trace};

use crate::config::DecoderConfig;
use crate::constants::{self, STREAM_MAGIC, STREAM_VERSION};
use crate::handle::HandleTable;
use crate::record::{BlockDataRecord, HeaderRecord, Record, StringRecord};
use crate::result::{Error, Result};
use crate::source::ByteSource;

/// Decodes a wire-protocol byte stream into a tree of [`Record`]s.
pub struct Decoder<R> {
    source: ByteSource<R>,
    config: DecoderConfig,
    handles: HandleTable,
    header: HeaderRecord,

    block_mode: bool,
    frame: Vec<u8>,
    pos: usize,
    end: usize,

    depth: usize,
}

impl<R: Read> Decoder<R> {
    /// Opens `reader`, validating the 4-byte stream header, and returns a
    /// decoder ready to pull top-level records via [`Decoder::next`].
    pub fn open(reader: R) -> Result<Self> {
        Self::with_config(reader, DecoderConfig::default())
    }

    pub fn with_config(reader: R, config: DecoderConfig) -> Result<Self> {
        let mut decoder = Self {
            source: ByteSource::new(reader),
            config,
            handles: HandleTable::new(),
            header: HeaderRecord::new(0, 0),
            block_mode: false,
            frame: Vec::new(),
            pos: 0,
            end: 0,
            depth: 0,
        };
        decoder.header = decoder.read_header()?;
        Ok(decoder)
    }

    pub fn header(&self) -> &HeaderRecord {
        &self.header
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    fn read_header(&mut self) -> Result<HeaderRecord> {
        let magic = self.read_u16()?;
        let version = self.read_u16()?;
        if magic != STREAM_MAGIC || version != STREAM_VERSION {
            return Err(Error::HeaderMismatch {
                magic,
                version,
                expected_magic: STREAM_MAGIC,
                expected_version: STREAM_VERSION,
            });
        }
        debug!("stream header ok: magic=0x{magic:04X} version={version}");
        Ok(HeaderRecord::new(magic, version))
    }

    /// Pulls the next top-level record, or `None` at a clean end of stream
    /// (an EOF or a zero tag byte at tag position, per the grammar's
    /// stream-level termination rule).
    pub fn next(&mut self) -> Result<Option<Record>> {
        self.decode_record()
    }

    /// Drains every remaining top-level record into a vector.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.next()? {
            records.push(record);
        }
        Ok(records)
    }

    // ---- tag dispatch (component F) -----------------------------------

    /// Reads one tag byte and produces the record it selects, or `None` on
    /// a clean stream-level termination (EOF / zero tag). Used both as the
    /// stream driver's top-level pull and, recursively, by every decoder
    /// that embeds "one more record" in its grammar.
    fn decode_record(&mut self) -> Result<Option<Record>> {
        let tag = match self.try_read_tag()? {
            Some(tag) => tag,
            None => return Ok(None),
        };
        if tag == 0 {
            return Ok(None);
        }
        self.enter_recursive_decode()?;
        let record = self.dispatch_tag(tag);
        self.depth -= 1;
        record
    }

    /// Like [`Decoder::decode_record`], but a clean termination is itself
    /// an error: used wherever the grammar requires "a record" rather than
    /// "maybe a record".
    fn decode_required_record(&mut self, expected: &'static str) -> Result<Record> {
        self.decode_record()?.ok_or(Error::UnexpectedRecord {
            expected,
            actual: "end of stream",
        })
    }

    fn enter_recursive_decode(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(Error::RecursionLimitExceeded(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    /// Unlike [`Decoder::decode_record`], a clean termination here only
    /// ever originates from `TC_RESET` folding through to one: every other
    /// arm produces a record or an error.
    fn dispatch_tag(&mut self, tag: u8) -> Result<Option<Record>> {
        trace!("tag dispatch: 0x{tag:02X}");
        match tag {
            constants::TC_NULL => Ok(Some(Record::Null)),
            constants::TC_REFERENCE => self.decode_reference().map(Some),
            constants::TC_CLASSDESC => self.decode_new_class_desc().map(Record::ClassDesc).map(Some),
            constants::TC_OBJECT => self.decode_new_object().map(Some),
            constants::TC_STRING => {
                let record = self.decode_short_string().map(Record::String)?;
                self.handles.assign(record.clone());
                Ok(Some(record))
            }
            constants::TC_ARRAY => self.decode_new_array().map(Some),
            constants::TC_CLASS => self.decode_new_class().map(Some),
            constants::TC_BLOCKDATA => self.decode_block_data(false).map(Record::BlockData).map(Some),
            constants::TC_ENDBLOCKDATA => Ok(Some(Record::EndBlockData)),
            constants::TC_RESET => self.decode_reset(),
            constants::TC_BLOCKDATALONG => self.decode_block_data(true).map(Record::BlockDataLong).map(Some),
            constants::TC_EXCEPTION => self.decode_exception().map(Some),
            constants::TC_LONGSTRING => {
                let record = self.decode_long_string().map(Record::LongString)?;
                self.handles.assign(record.clone());
                Ok(Some(record))
            }
            constants::TC_PROXYCLASSDESC => self.decode_proxy_class_desc().map(Record::ClassDesc).map(Some),
            constants::TC_ENUM => self.decode_enum().map(Some),
            other => Err(Error::UnknownTag(other)),
        }
    }

    fn decode_reference(&mut self) -> Result<Record> {
        let raw_handle = self.read_u32()?;
        let target = self.handles.resolve(raw_handle)?.clone();
        Ok(Record::Reference(crate::record::ReferenceRecord::new(raw_handle, target)))
    }

    fn decode_reset(&mut self) -> Result<Option<Record>> {
        if !self.config.honor_reset {
            return Err(Error::UnknownTag(constants::TC_RESET));
        }
        debug!("TC_RESET: clearing {} handle(s)", self.handles.len());
        self.handles.clear();
        // TC_RESET has no payload of its own; its own grammar position
        // folds straight through to whatever follows it, including a clean
        // stream termination if nothing does.
        self.decode_record()
    }

    fn decode_block_data(&mut self, long: bool) -> Result<BlockDataRecord> {
        let len = if long { self.read_i32()? as usize } else { self.read_u8()? as usize };
        let bytes = self.read_raw(len)?;
        Ok(BlockDataRecord::new(bytes))
    }

    // ---- strings (component J) ------------------------------------------

    fn decode_short_string(&mut self) -> Result<StringRecord> {
        let len = self.read_u16()? as usize;
        self.decode_string_content(len)
    }

    fn decode_long_string(&mut self) -> Result<StringRecord> {
        let len = self.read_i64()?;
        if len < 0 {
            return Err(Error::UnexpectedRecord {
                expected: "non-negative long-string length",
                actual: "negative length",
            });
        }
        self.decode_string_content(len as usize)
    }

    fn decode_string_content(&mut self, byte_len: usize) -> Result<StringRecord> {
        let bytes = self.read_raw(byte_len)?;
        let content = crate::modified_utf8::decode(&bytes, self.config.strict_modified_utf8)
            .map_err(|_| Error::InvalidModifiedUtf8)?;
        Ok(StringRecord::new(content))
    }

    // ---- byte source plumbing & the dual-mode reader (components B, C) --

    fn try_read_tag(&mut self) -> Result<Option<u8>> {
        match self.read_u8() {
            Ok(tag) => Ok(Some(tag)),
            Err(Error::EndOfStream) if !self.block_mode => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn set_block_mode(&mut self, enable: bool) -> Result<()> {
        if enable == self.block_mode {
            return Ok(());
        }
        if enable {
            self.pos = 0;
            self.end = 0;
            self.frame.clear();
        } else {
            let unread = self.unread();
            if unread > 0 {
                return Err(Error::UnreadBlockData(unread));
            }
        }
        self.block_mode = enable;
        Ok(())
    }

    fn unread(&self) -> usize {
        self.end - self.pos
    }

    /// Discards any unread bytes of the current frame, decodes exactly one
    /// `BlockData`/`BlockDataLong` record in stream mode, and adopts its
    /// bytes as the new frame.
    fn refill(&mut self) -> Result<()> {
        self.pos = self.end;
        self.block_mode = false;
        let record = self.decode_required_record("BlockData or BlockDataLong (block-frame refill)")?;
        let frame = match record {
            Record::BlockData(b) | Record::BlockDataLong(b) => b.into_bytes(),
            other => {
                return Err(Error::UnexpectedRecord {
                    expected: "BlockData or BlockDataLong",
                    actual: other.kind(),
                })
            }
        };
        self.block_mode = true;
        trace!("block-data refill: {} byte(s)", frame.len());
        self.frame = frame;
        self.pos = 0;
        self.end = self.frame.len();
        Ok(())
    }

    fn read_raw(&mut self, n: usize) -> Result<Vec<u8>> {
        if !self.block_mode {
            return self.source.read_exact(n);
        }
        let mut out = Vec::with_capacity(n);
        let mut remaining = n;
        while remaining > 0 {
            if self.pos == self.end {
                self.refill()?;
            }
            let available = self.end - self.pos;
            let take = available.min(remaining);
            out.extend_from_slice(&self.frame[self.pos..self.pos + take]);
            self.pos += take;
            remaining -= take;
        }
        Ok(out)
    }

    // ---- composed primitives (§4.2) -------------------------------------

    fn read_u8(&mut self) -> Result<u8> {
        let bytes = self.read_raw(1)?;
        Ok(bytes[0])
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    fn read_u16(&mut self) -> Result<u16> {
        let high = self.read_u8()? as u16;
        let low = self.read_u8()? as u16;
        Ok((high << 8) | low)
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(self.read_u16()? as i16)
    }

    fn read_char(&mut self) -> Result<u16> {
        self.read_u16()
    }

    fn read_u32(&mut self) -> Result<u32> {
        let high = self.read_u16()? as u32;
        let low = self.read_u16()? as u32;
        Ok((high << 16) | low)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.read_u32()? as i32)
    }

    fn read_u64(&mut self) -> Result<u64> {
        let high = self.read_u32()? as u64;
        let low = self.read_u32()? as u64;
        Ok((high << 32) | low)
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(self.read_u64()? as i64)
    }

    fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    fn read_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64()?))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Builds a decoder past a valid header, positioned at `body`.
    fn open_after_header(body: &[u8]) -> Decoder<Cursor<Vec<u8>>> {
        let mut bytes = vec![0xAC, 0xED, 0x00, 0x05];
        bytes.extend_from_slice(body);
        Decoder::open(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn block_mode_primitive_read_straddles_a_refill() {
        // frame 1: `00 00`, frame 2: `00 05` -- concatenated, the big-endian
        // i32 `5`. Reading it in one call must trigger two refills.
        let mut decoder = open_after_header(&[
            0x77, 0x02, 0x00, 0x00,
            0x77, 0x02, 0x00, 0x05,
        ]);
        decoder.set_block_mode(true).unwrap();
        assert_eq!(decoder.read_i32().unwrap(), 5);
    }

    #[test]
    fn block_mode_refills_transparently_across_consecutive_frames() {
        let mut decoder = open_after_header(&[
            0x77, 0x04, 0xFF, 0xFF, 0xFF, 0xFF, // frame 1: four bytes
            0x77, 0x01, 0x2A,                   // frame 2: one byte
        ]);
        decoder.set_block_mode(true).unwrap();
        assert_eq!(decoder.read_u32().unwrap(), 0xFFFFFFFF);
        assert_eq!(decoder.read_u8().unwrap(), 0x2A);
    }

    #[test]
    fn leaving_block_mode_with_unread_bytes_pending_is_rejected() {
        let mut decoder = open_after_header(&[0x77, 0x02, 0xAB, 0xCD]);
        decoder.set_block_mode(true).unwrap();
        decoder.read_u8().unwrap();
        assert_matches::assert_matches!(decoder.set_block_mode(false), Err(Error::UnreadBlockData(1)));
    }

    #[test]
    fn stream_mode_reads_pass_through_to_the_byte_source_untouched() {
        let mut decoder = open_after_header(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(decoder.read_u32().unwrap(), 0x01020304);
    }
}
