//! # dex
//!
//! A parser, data model and printer for the DeX format.
//!
//! ## What is DeX?
//!
//! DeX is a compact, self-describing structured-data interchange format — a
//! hybrid of JSON-style nesting and a tagged, TOML-like surface syntax. It
//! is built for configuration and data files that round-trip into native
//! object graphs:
//!
//! ```text
//! MAYU : vocaloid {
//!     taglist { yandere, lolita, gothic }
//!
//!     gender   : female
//!     age      : 15
//!     company  : EXIT TUNES
//! }
//! ```
//!
//! One structure — the [`Table`] — uniformly represents ordered maps and
//! positional arrays, with an optional *tag* acting as a type discriminator
//! for the [`Serialization`] registry.
//!
//! ## Key Features
//!
//! - **Uniform tables**: `{1, 2, 3}` and `{a : 1, b : 2}` are the same
//!   entity; [`Table::is_array`] is derived from the key set.
//! - **Immutable results**: parsing and the one-shot [`Builder`] both
//!   produce immutable tables, so sharing across threads needs no locks.
//! - **Rich diagnostics**: every [`ParseError`] carries the byte offset,
//!   line number and a caret-marked source window.
//! - **Tagged typing**: a tag before `{` names the table's type; the
//!   [`Serialization`] registry maps tags to native types and back.
//! - **No unsafe code**: written entirely in safe Rust.
//!
//! ## Quick Start
//!
//! ```rust
//! let doc = dex::from_str(
//!     "MAYU : vocaloid {\n  gender : female\n  age : 15\n}",
//! ).unwrap();
//!
//! let mayu = doc.get_table("MAYU").unwrap();
//! assert_eq!(mayu.tag(), "vocaloid");
//! assert_eq!(mayu.get_str("gender").unwrap(), "female");
//! assert_eq!(mayu.get_i64("age").unwrap(), 15);
//! ```
//!
//! ### Building and printing
//!
//! ```rust
//! use dex::Table;
//!
//! let table = Table::builder_tagged("vec")
//!     .put("x", 1)
//!     .put("y", 2)
//!     .create();
//!
//! assert_eq!(dex::to_string(&table), r#"vec{"x":1,"y":2}"#);
//! assert_eq!(dex::to_string_pretty(&table), "vec {\n  x : 1\n  y : 2\n}");
//!
//! // Printed tables parse back; the file level wraps them as entry 0.
//! let back = dex::from_str(&dex::to_string(&table)).unwrap();
//! assert_eq!(back.get_table("vec").unwrap().get_i64("x").unwrap(), 1);
//! ```
//!
//! ### The `dex!` macro
//!
//! ```rust
//! use dex::dex;
//!
//! let value = dex!({
//!     "name": "Alice",
//!     "scores": [10, 20, 30]
//! });
//! assert!(value.as_table().unwrap().get_table("scores").unwrap().is_array());
//! ```
//!
//! ## Format notes
//!
//! - Bare tokens are numbers when they parse as numeric literals
//!   (including `0x`/`0o`/`0b` radix forms, `NaN` and `Infinity`),
//!   booleans when they are `true`/`false`, strings otherwise. Quoted
//!   tokens are always strings.
//! - Entries are separated by commas or newlines; a keyless entry gets the
//!   next positional index.
//! - A keyless entry holding a tagged table is keyed by the tag:
//!   `list { x, y }` is `list : { x, y }`.
//! - `+name` / `-name` as a keyless token is shorthand for
//!   `name : true` / `name : false`.
//! - Duplicate keys in one scope are an error unless
//!   [`ParseOptions::check_duplicates`] is disabled for trusted input.
//!
//! ## Concurrency
//!
//! Each parse call owns its whole state; parallel parses need no
//! synchronization. Compiled tables are immutable, so unsynchronized reads
//! are safe by construction — "modification" means cloning into a new
//! [`Builder`] via [`Table::to_builder`].

pub mod array;
pub mod de;
pub mod error;
pub mod macros;
pub mod map;
pub mod number;
pub mod ser;
pub mod serialize;
pub mod table;
pub mod value;

pub use array::ArrayView;
pub use de::ParseOptions;
pub use error::{CoerceError, ParseError, ParseErrorKind, Result};
pub use map::Key;
pub use number::parse_number;
pub use ser::{to_string, to_string_pretty};
pub use serialize::{ComposeError, DexSerialize, Serialization};
pub use table::{Builder, Table};
pub use value::Value;

use std::io;

/// Parses a DeX document into its file-level [`Table`].
///
/// The file level is itself a table scope: top-level entries land in the
/// returned table, so `{1,2,3}` yields an outer table whose entry `0` is
/// the array.
///
/// # Errors
///
/// Returns a [`ParseError`] with source position context on any grammar
/// violation; no partial table is ever returned.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Table> {
    de::parse_str(s, ParseOptions::default())
}

/// Parses with explicit [`ParseOptions`].
///
/// # Errors
///
/// Returns a [`ParseError`] on any grammar violation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: ParseOptions) -> Result<Table> {
    de::parse_str(s, options)
}

/// Parses a DeX document from raw bytes.
///
/// # Errors
///
/// Returns a [`ParseError`] if the bytes are not valid UTF-8 or not valid
/// DeX.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<Table> {
    let s = std::str::from_utf8(v).map_err(|e| ParseError::io(e))?;
    from_str(s)
}

/// Parses a DeX document from a reader. The input is consumed eagerly;
/// there is no streaming mode.
///
/// # Errors
///
/// Returns a [`ParseError`] if reading fails or the input is not valid DeX.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Table> {
    let mut buf = String::new();
    reader.read_to_string(&mut buf).map_err(|e| ParseError::io(e))?;
    from_str(&buf)
}

/// Writes the compact form of `table` to a writer.
///
/// # Errors
///
/// Returns any I/O error from the writer; printing itself cannot fail.
pub fn to_writer<W: io::Write>(mut writer: W, table: &Table) -> io::Result<()> {
    writer.write_all(to_string(table).as_bytes())
}
