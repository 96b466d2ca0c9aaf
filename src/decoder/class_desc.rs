//! Component G: class-descriptor decoding (§4.4.1, §4.4.2, §4.4.7, §4.4.9).

use std::io::Read;

use log::trace;

use crate::constants::{is_object_code, is_recognized_code};
use crate::record::{
    ClassDescBody, ClassDescFlags, ClassDescRecord, FieldRecord, NewClassDescRecord, ProxyClassDescRecord, Record,
};
use crate::result::{Error, Result};

use super::Decoder;

impl<R: Read> Decoder<R> {
    /// Reads a `ClassDesc` grammar position: `Null`, `NewClassDesc`,
    /// `ProxyClassDesc`, or a `Reference` to one of those, already resolved.
    pub(super) fn decode_class_desc_value(&mut self) -> Result<ClassDescRecord> {
        let record = self
            .decode_required_record("ClassDesc (Null, NewClassDesc, ProxyClassDesc, or a Reference to one)")?
            .resolved();
        match record {
            Record::Null => Ok(ClassDescRecord::null()),
            Record::ClassDesc(desc) => Ok(desc),
            other => Err(Error::UnexpectedRecord {
                expected: "ClassDesc (Null, NewClassDesc, ProxyClassDesc, or a Reference to one)",
                actual: other.kind(),
            }),
        }
    }

    pub(super) fn decode_new_class_desc(&mut self) -> Result<ClassDescRecord> {
        let name = self.decode_short_string()?.into_content();
        let uid = self.read_u64()?;
        let handle = self.handles.reserve();
        trace!("NewClassDesc '{name}' assigned handle 0x{handle:06X}");
        let flags = ClassDescFlags::from_bytes([self.read_u8()?]);
        let field_count = self.read_u16()? as usize;
        let mut fields = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            fields.push(self.decode_field()?);
        }
        let annotations = self.decode_annotation_region()?;
        let super_desc = self.decode_class_desc_value()?;
        let body = NewClassDescRecord::new(name, uid, flags, fields, annotations, super_desc);
        let desc = ClassDescRecord::new(ClassDescBody::NewClassDesc(body));
        self.handles.finish(handle, Record::ClassDesc(desc.clone()));
        Ok(desc)
    }

    pub(super) fn decode_proxy_class_desc(&mut self) -> Result<ClassDescRecord> {
        let handle = self.handles.reserve();
        let interface_count = self.read_u32()? as usize;
        let mut interfaces = Vec::with_capacity(interface_count);
        for _ in 0..interface_count {
            interfaces.push(self.decode_short_string()?.into_content());
        }
        let annotations = self.decode_annotation_region()?;
        let super_desc = self.decode_class_desc_value()?;
        let body = ProxyClassDescRecord::new(interfaces, annotations, super_desc);
        let desc = ClassDescRecord::new(ClassDescBody::ProxyClassDesc(body));
        self.handles.finish(handle, Record::ClassDesc(desc.clone()));
        Ok(desc)
    }

    fn decode_field(&mut self) -> Result<FieldRecord> {
        let code = self.read_u8()?;
        if !is_recognized_code(code) {
            return Err(Error::InvalidTypeCode(code));
        }
        let name = self.decode_short_string()?.into_content();
        let element_type = if is_object_code(code) {
            let signature = self
                .decode_required_record("field signature (String or a Reference to one)")?
                .resolved();
            match signature {
                Record::String(_) | Record::LongString(_) => Some(signature),
                other => {
                    return Err(Error::UnexpectedRecord {
                        expected: "field signature (String or a Reference to one)",
                        actual: other.kind(),
                    })
                }
            }
        } else {
            None
        };
        Ok(FieldRecord::new(code, name, element_type))
    }

    /// Consumes records, via ordinary tag dispatch against the stream, up to
    /// (but excluding) an `EndBlockData` terminator. Shared by
    /// `NewClassDesc`, `ProxyClassDesc`, and class-data decoding for classes
    /// with a custom write method (§4.4.8).
    ///
    /// This is a plain tag-dispatch loop, not the dual-mode primitive
    /// reader (§4.2): the records an annotation region contains — including
    /// `BlockData`/`BlockDataLong` frames — are decoded as ordinary tagged
    /// values, never interpreted as a primitive byte stream.
    pub(super) fn decode_annotation_region(&mut self) -> Result<Vec<Record>> {
        let mut annotations = Vec::new();
        loop {
            let record = self.decode_required_record(
                "a record, or EndBlockData terminating an annotation region",
            )?;
            if matches!(record, Record::EndBlockData) {
                break;
            }
            annotations.push(record);
        }
        if !self.config.retain_annotations {
            annotations.clear();
        }
        Ok(annotations)
    }
}
