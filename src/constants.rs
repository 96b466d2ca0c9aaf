//! Stream tags, class-descriptor flag bits, and type codes.

/// First tag value in the stream grammar.
pub const TC_BASE: u8 = 0x70;
/// Null object reference.
pub const TC_NULL: u8 = 0x70;
/// Reference to an object already written into the stream.
pub const TC_REFERENCE: u8 = 0x71;
/// New class descriptor.
pub const TC_CLASSDESC: u8 = 0x72;
/// New object.
pub const TC_OBJECT: u8 = 0x73;
/// New string.
pub const TC_STRING: u8 = 0x74;
/// New array.
pub const TC_ARRAY: u8 = 0x75;
/// Reference to a `Class` object.
pub const TC_CLASS: u8 = 0x76;
/// Block of optional data; the byte following the tag is its length.
pub const TC_BLOCKDATA: u8 = 0x77;
/// End of optional block-data blocks for an object.
pub const TC_ENDBLOCKDATA: u8 = 0x78;
/// Reset stream context: clears the handle table.
pub const TC_RESET: u8 = 0x79;
/// Long block of optional data; the `i32` following the tag is its length.
pub const TC_BLOCKDATALONG: u8 = 0x7A;
/// An exception thrown while the peer was writing the stream.
pub const TC_EXCEPTION: u8 = 0x7B;
/// New long string.
pub const TC_LONGSTRING: u8 = 0x7C;
/// New dynamic-proxy class descriptor.
pub const TC_PROXYCLASSDESC: u8 = 0x7D;
/// New enum constant.
pub const TC_ENUM: u8 = 0x7E;

/// Stream header magic.
pub const STREAM_MAGIC: u16 = 0xACED;
/// Stream header version.
pub const STREAM_VERSION: u16 = 5;

/// Max length of a short block-data frame.
pub const MAX_BLOCK_SIZE: usize = 255;

/// Handle assigned to the first registered record.
pub const BASE_WIRE_HANDLE: u32 = 0x7E0000;

/// Indicates a Serializable class defines its own `writeObject` method.
pub const SC_WRITE_METHOD: u8 = 0x01;
/// Indicates the class is Serializable.
pub const SC_SERIALIZABLE: u8 = 0x02;
/// Indicates the class is Externalizable.
pub const SC_EXTERNALIZABLE: u8 = 0x04;
/// Indicates Externalizable data is written in block-data mode.
pub const SC_BLOCK_DATA: u8 = 0x08;
/// Indicates the class is an enum type.
pub const SC_ENUM: u8 = 0x10;

pub const TYPE_BYTE: u8 = b'B';
pub const TYPE_CHAR: u8 = b'C';
pub const TYPE_DOUBLE: u8 = b'D';
pub const TYPE_FLOAT: u8 = b'F';
pub const TYPE_INT: u8 = b'I';
pub const TYPE_LONG: u8 = b'J';
pub const TYPE_SHORT: u8 = b'S';
pub const TYPE_BOOLEAN: u8 = b'Z';
/// Object field type code: signature is a class name.
pub const TYPE_OBJECT: u8 = b'L';
/// Array field type code: signature is an array class name.
pub const TYPE_ARRAY: u8 = b'[';

#[inline]
pub fn is_primitive_code(code: u8) -> bool {
    matches!(
        code,
        TYPE_BYTE | TYPE_CHAR | TYPE_DOUBLE | TYPE_FLOAT | TYPE_INT | TYPE_LONG | TYPE_SHORT | TYPE_BOOLEAN
    )
}

#[inline]
pub fn is_object_code(code: u8) -> bool {
    matches!(code, TYPE_OBJECT | TYPE_ARRAY)
}

#[inline]
pub fn is_recognized_code(code: u8) -> bool {
    is_primitive_code(code) || is_object_code(code)
}
