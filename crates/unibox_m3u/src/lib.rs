//! Reading and writing of the extended M3U playlists served to and by unibox.
//!
//! The parser is deliberately lenient: it never fails, it only skips what it
//! does not understand.

mod parse;
mod tag;
mod write;

pub use parse::{Entry, Location, parse};
pub use tag::Tag;
pub use write::{ExportEntry, write_playlist};
