//! Component H: object, array, exception, and enum decoding (§4.4.3-§4.4.6,
//! §4.4.8).

use std::io::Read;

use crate::constants::{self, is_primitive_code};
use crate::record::{
    ClassDescBody, ClassDescRecord, EnumRecord, ExceptionRecord, NewArrayRecord, NewClassDescRecord,
    NewClassRecord, NewObjectRecord, Record, Value,
};
use crate::result::{Error, Result};

use super::Decoder;

impl<R: Read> Decoder<R> {
    pub(super) fn decode_new_class(&mut self) -> Result<Record> {
        let desc = self.decode_class_desc_value()?;
        let record = Record::NewClass(NewClassRecord::new(desc));
        self.handles.assign(record.clone());
        Ok(record)
    }

    pub(super) fn decode_new_object(&mut self) -> Result<Record> {
        let desc = self.decode_class_desc_value()?;
        let handle = self.handles.reserve();
        let (slot_values, annotations) = self.decode_class_data(&desc)?;
        let record = Record::NewObject(NewObjectRecord::new(desc, slot_values, annotations));
        self.handles.finish(handle, record.clone());
        Ok(record)
    }

    pub(super) fn decode_new_array(&mut self) -> Result<Record> {
        let wrapper = self.decode_class_desc_value()?;
        let desc = match wrapper.body().as_ref() {
            ClassDescBody::NewClassDesc(d) if d.name().starts_with('[') => d.clone(),
            other => {
                return Err(Error::UnexpectedRecord {
                    expected: "NewClassDesc with an array class name",
                    actual: class_desc_body_kind(other),
                })
            }
        };
        let handle = self.handles.reserve();
        let (component, element_type) = array_component(desc.name())?;
        let size = self.read_i32()?;
        if size < 0 {
            return Err(Error::UnexpectedRecord {
                expected: "non-negative array size",
                actual: "negative size",
            });
        }
        let mut elements = Vec::with_capacity(size as usize);
        for _ in 0..size {
            elements.push(self.decode_array_element(component)?);
        }
        let record = Record::NewArray(NewArrayRecord::new(desc, element_type, size as u32, elements));
        self.handles.finish(handle, record.clone());
        Ok(record)
    }

    fn decode_array_element(&mut self, component: u8) -> Result<Value> {
        if is_primitive_code(component) {
            self.decode_primitive_value(component)
        } else {
            let record = self.decode_required_record("array element")?.resolved();
            Ok(Value::Object(record))
        }
    }

    pub(super) fn decode_exception(&mut self) -> Result<Record> {
        let thrown = self.decode_required_record("exception payload")?.resolved();
        Ok(Record::Exception(ExceptionRecord::new(thrown)))
    }

    pub(super) fn decode_enum(&mut self) -> Result<Record> {
        let desc = self.decode_class_desc_value()?;
        let handle = self.handles.reserve();
        let name_record = self
            .decode_required_record("enum constant name (String, LongString, or a Reference to one)")?
            .resolved();
        let name = match name_record {
            Record::String(s) | Record::LongString(s) => s.into_content(),
            other => {
                return Err(Error::UnexpectedRecord {
                    expected: "enum constant name (String, LongString, or a Reference to one)",
                    actual: other.kind(),
                })
            }
        };
        let record = Record::Enum(EnumRecord::new(desc, name));
        self.handles.finish(handle, record.clone());
        Ok(record)
    }

    // ---- class-data (§4.4.8) -------------------------------------------

    fn decode_class_data(&mut self, desc: &ClassDescRecord) -> Result<(Vec<Value>, Vec<Record>)> {
        match desc.body().as_ref() {
            ClassDescBody::Null => Ok((Vec::new(), Vec::new())),
            // Dynamic-proxy instances carry no declared fields of their own.
            ClassDescBody::ProxyClassDesc(_) => Ok((Vec::new(), Vec::new())),
            ClassDescBody::NewClassDesc(d) => self.decode_new_class_data(d),
        }
    }

    fn decode_new_class_data(&mut self, desc: &NewClassDescRecord) -> Result<(Vec<Value>, Vec<Record>)> {
        let (mut values, mut annotations) = match desc.super_desc().body().as_ref() {
            ClassDescBody::NewClassDesc(super_desc) => self.decode_new_class_data(super_desc)?,
            _ => (Vec::new(), Vec::new()),
        };
        for field in desc.fields() {
            let value = if field.is_primitive() {
                self.decode_primitive_value(*field.code())?
            } else {
                let record = self.decode_required_record("object/array field value")?.resolved();
                Value::Object(record)
            };
            values.push(value);
        }
        if desc.has_write_method() || desc.has_block_data() {
            annotations.extend(self.decode_annotation_region()?);
        }
        Ok((values, annotations))
    }

    fn decode_primitive_value(&mut self, code: u8) -> Result<Value> {
        Ok(match code {
            constants::TYPE_BYTE => Value::Byte(self.read_u8()? as i8),
            constants::TYPE_CHAR => Value::Char(self.read_char()?),
            constants::TYPE_DOUBLE => Value::Double(self.read_f64()?),
            constants::TYPE_FLOAT => Value::Float(self.read_f32()?),
            constants::TYPE_INT => Value::Int(self.read_i32()?),
            constants::TYPE_LONG => Value::Long(self.read_i64()?),
            constants::TYPE_SHORT => Value::Short(self.read_i16()?),
            constants::TYPE_BOOLEAN => Value::Boolean(self.read_bool()?),
            other => return Err(Error::InvalidTypeCode(other)),
        })
    }
}

fn class_desc_body_kind(body: &ClassDescBody) -> &'static str {
    match body {
        ClassDescBody::Null => "Null",
        ClassDescBody::NewClassDesc(_) => "NewClassDesc (non-array name)",
        ClassDescBody::ProxyClassDesc(_) => "ProxyClassDesc",
    }
}

/// Derives the array's component type code and its human-readable label
/// (e.g. `"int"` for `[I`, or the element class name for `[Ljava...;`) from
/// the array class's wire name. Nested arrays are out of scope (§4.4.4).
fn array_component(name: &str) -> Result<(u8, String)> {
    let bytes = name.as_bytes();
    let code = *bytes.get(1).ok_or(Error::UnexpectedRecord {
        expected: "array class name with a component-type character",
        actual: "empty or truncated name",
    })?;
    if is_primitive_code(code) {
        return Ok((code, primitive_type_label(code).to_string()));
    }
    if code == constants::TYPE_OBJECT {
        let rest = &name[2..];
        let end = rest.find(';').ok_or(Error::UnexpectedRecord {
            expected: "';'-terminated object array class name",
            actual: "missing terminator",
        })?;
        return Ok((code, rest[..end].to_string()));
    }
    Err(Error::UnexpectedRecord {
        expected: "primitive or object array component type (nested arrays unsupported)",
        actual: "nested array component",
    })
}

fn primitive_type_label(code: u8) -> &'static str {
    match code {
        constants::TYPE_BYTE => "byte",
        constants::TYPE_CHAR => "char",
        constants::TYPE_DOUBLE => "double",
        constants::TYPE_FLOAT => "float",
        constants::TYPE_INT => "int",
        constants::TYPE_LONG => "long",
        constants::TYPE_SHORT => "short",
        constants::TYPE_BOOLEAN => "boolean",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_array_component_is_labeled_by_java_type_name() {
        let (code, label) = array_component("[I").unwrap();
        assert_eq!(code, constants::TYPE_INT);
        assert_eq!(label, "int");
    }

    #[test]
    fn object_array_component_label_strips_signature_wrapper() {
        let (code, label) = array_component("[Ljava/lang/String;").unwrap();
        assert_eq!(code, constants::TYPE_OBJECT);
        assert_eq!(label, "java/lang/String");
    }

    #[test]
    fn nested_array_component_is_rejected() {
        assert!(array_component("[[I").is_err());
    }

    #[test]
    fn truncated_array_name_is_rejected() {
        assert!(array_component("[").is_err());
    }
}
