//! A decoder for the handle-based, self-describing object-serialization
//! wire protocol: the one that class descriptors, primitive/reference
//! fields, arrays, enums, and dynamic proxies are written onto by a
//! widely-deployed object stream writer.
//!
//! Construct a [`Decoder`] over anything implementing [`std::io::Read`],
//! then pull records with [`Decoder::next`] or drain the whole stream with
//! [`Decoder::read_all`].
//!
//! ```no_run
//! use objstream::Decoder;
//!
//! # fn run() -> objstream::Result<()> {
//! let file = std::fs::File::open("capture.ser")?;
//! let mut decoder = Decoder::open(std::io::BufReader::new(file))?;
//! for record in decoder.read_all()? {
//!     println!("{:?}", record);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
mod decoder;
mod handle;
mod modified_utf8;
pub mod record;
pub mod result;
mod source;

pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use record::{Record, Value};
pub use result::{Error, Result};
