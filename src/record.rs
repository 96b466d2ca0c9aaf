//! The decoded record tree (component E): one type per wire construct.
//!
//! Every non-trivial variant is a dedicated struct with generated getters so
//! callers get read-only, by-reference access to variant-specific fields
//! without matching out tuple positions.

use derive_getters::Getters;
use modular_bitfield::prelude::*;

/// The class-descriptor flags byte (`SC_*` in `constants`), modeled as a
/// packed bitfield the same way every status/properties byte in this
/// codebase's lineage is, rather than as loose bitmask constants tested
/// with `&`.
#[bitfield(bits = 8)]
#[derive(Debug, Clone, Copy)]
pub struct ClassDescFlags {
    pub write_method: bool,
    pub serializable: bool,
    pub externalizable: bool,
    pub block_data: bool,
    pub enum_type: bool,
    #[skip]
    padding: B3,
}

impl PartialEq for ClassDescFlags {
    fn eq(&self, other: &Self) -> bool {
        self.into_bytes() == other.into_bytes()
    }
}

/// A single decoded record. Recursive payloads are boxed only where needed
/// to keep the type finite; collections (`Vec<Record>`, `Vec<Value>`) do not
/// need boxing since they are already heap-allocated.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Null,
    String(StringRecord),
    LongString(StringRecord),
    Reference(ReferenceRecord),
    Field(FieldRecord),
    ClassDesc(ClassDescRecord),
    NewClass(NewClassRecord),
    NewObject(NewObjectRecord),
    NewArray(NewArrayRecord),
    Enum(EnumRecord),
    BlockData(BlockDataRecord),
    BlockDataLong(BlockDataRecord),
    EndBlockData,
    Exception(ExceptionRecord),
    Header(HeaderRecord),
}

impl Record {
    /// Name of the variant, for diagnostics and `UnexpectedRecord` errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Null => "Null",
            Record::String(_) => "String",
            Record::LongString(_) => "LongString",
            Record::Reference(_) => "Reference",
            Record::Field(_) => "Field",
            Record::ClassDesc(_) => "ClassDesc",
            Record::NewClass(_) => "NewClass",
            Record::NewObject(_) => "NewObject",
            Record::NewArray(_) => "NewArray",
            Record::Enum(_) => "Enum",
            Record::BlockData(_) => "BlockData",
            Record::BlockDataLong(_) => "BlockDataLong",
            Record::EndBlockData => "EndBlockData",
            Record::Exception(_) => "Exception",
            Record::Header(_) => "Header",
        }
    }

    /// Follows a `Reference` to its target, leaving every other variant
    /// untouched. Used wherever the grammar allows "a record, or a
    /// back-reference to one" and the caller wants the referred-to value.
    pub fn resolved(self) -> Record {
        match self {
            Record::Reference(r) => *r.target,
            other => other,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            Record::String(s) | Record::LongString(s) => Some(&s.content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StringRecord {
    content: String,
}

impl StringRecord {
    pub fn new(content: String) -> Self {
        Self { content }
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ReferenceRecord {
    handle: u32,
    target: Box<Record>,
}

impl ReferenceRecord {
    pub fn new(handle: u32, target: Record) -> Self {
        Self {
            handle,
            target: Box::new(target),
        }
    }
}

/// One entry of a class descriptor's field list (§4.4.7).
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct FieldRecord {
    code: u8,
    name: String,
    element_type: Option<Box<Record>>,
}

impl FieldRecord {
    pub fn new(code: u8, name: String, element_type: Option<Record>) -> Self {
        Self {
            code,
            name,
            element_type: element_type.map(Box::new),
        }
    }

    pub fn is_primitive(&self) -> bool {
        crate::constants::is_primitive_code(self.code)
    }
}

/// The body of a `ClassDesc`: either absent, a concrete descriptor, or a
/// dynamic-proxy descriptor. A `Reference` to one of these is resolved
/// transparently before being wrapped here (§3).
#[derive(Debug, Clone, PartialEq)]
pub enum ClassDescBody {
    Null,
    NewClassDesc(NewClassDescRecord),
    ProxyClassDesc(ProxyClassDescRecord),
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ClassDescRecord {
    body: Box<ClassDescBody>,
}

impl ClassDescRecord {
    pub fn new(body: ClassDescBody) -> Self {
        Self { body: Box::new(body) }
    }

    pub fn null() -> Self {
        Self::new(ClassDescBody::Null)
    }

    /// The descriptor's `NewClassDesc`, if it is not `Null` and not a proxy.
    pub fn as_new_class_desc(&self) -> Option<&NewClassDescRecord> {
        match self.body.as_ref() {
            ClassDescBody::NewClassDesc(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NewClassDescRecord {
    name: String,
    uid: u64,
    flags: ClassDescFlags,
    fields: Vec<FieldRecord>,
    annotations: Vec<Record>,
    super_desc: ClassDescRecord,
}

#[allow(clippy::too_many_arguments)]
impl NewClassDescRecord {
    pub fn new(
        name: String,
        uid: u64,
        flags: ClassDescFlags,
        fields: Vec<FieldRecord>,
        annotations: Vec<Record>,
        super_desc: ClassDescRecord,
    ) -> Self {
        Self {
            name,
            uid,
            flags,
            fields,
            annotations,
            super_desc,
        }
    }

    pub fn has_write_method(&self) -> bool {
        self.flags.write_method()
    }

    pub fn has_block_data(&self) -> bool {
        self.flags.block_data()
    }

    pub fn is_enum(&self) -> bool {
        self.flags.enum_type()
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ProxyClassDescRecord {
    interfaces: Vec<String>,
    annotations: Vec<Record>,
    super_desc: ClassDescRecord,
}

impl ProxyClassDescRecord {
    pub fn new(interfaces: Vec<String>, annotations: Vec<Record>, super_desc: ClassDescRecord) -> Self {
        Self {
            interfaces,
            annotations,
            super_desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NewClassRecord {
    desc: ClassDescRecord,
}

impl NewClassRecord {
    pub fn new(desc: ClassDescRecord) -> Self {
        Self { desc }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NewObjectRecord {
    desc: ClassDescRecord,
    slot_values: Vec<Value>,
    /// Trailing per-class annotation data (§4.4.8 step 3), concatenated
    /// super-first, for classes with a custom write method.
    annotations: Vec<Record>,
}

impl NewObjectRecord {
    pub fn new(desc: ClassDescRecord, slot_values: Vec<Value>, annotations: Vec<Record>) -> Self {
        Self {
            desc,
            slot_values,
            annotations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct NewArrayRecord {
    desc: NewClassDescRecord,
    element_type: String,
    size: u32,
    elements: Vec<Value>,
}

impl NewArrayRecord {
    pub fn new(desc: NewClassDescRecord, element_type: String, size: u32, elements: Vec<Value>) -> Self {
        Self {
            desc,
            element_type,
            size,
            elements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct EnumRecord {
    desc: ClassDescRecord,
    name: String,
}

impl EnumRecord {
    pub fn new(desc: ClassDescRecord, name: String) -> Self {
        Self { desc, name }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct BlockDataRecord {
    bytes: Vec<u8>,
}

impl BlockDataRecord {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[derive(Debug, Clone, PartialEq, Getters)]
pub struct ExceptionRecord {
    record: Box<Record>,
}

impl ExceptionRecord {
    pub fn new(record: Record) -> Self {
        Self {
            record: Box::new(record),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct HeaderRecord {
    magic: u16,
    version: u16,
}

impl HeaderRecord {
    pub fn new(magic: u16, version: u16) -> Self {
        Self { magic, version }
    }
}

/// A slot value: either a primitive or a fully-resolved record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(Record),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Byte(_) => "byte",
            Value::Char(_) => "char",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Object(_) => "object",
        }
    }
}
