//! # arcfs
//!
//! A read-only virtual filesystem over heterogeneous containers.
//!
//! This crate lets callers open "a member file inside container X" through one
//! uniform API, whatever X is: a plain directory, a tar archive, a zip archive
//! or a tree of resources served over HTTP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use arcfs::{Archive, Result};
//!
//! fn main() -> Result<()> {
//!     // type is sniffed from the content
//!     let archive = Archive::open("assets.tar")?;
//!
//!     for member in archive.list()? {
//!         println!("{member}");
//!     }
//!
//!     let data = archive.open_member("tiles/0/0/0.bin")?.read_all()?;
//!     println!("{} bytes", data.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Hints
//!
//! Archives are often wrapped in one top-level directory whose name is not
//! known in advance. A [`FileHint`] names a file expected at the logical root;
//! the directory in front of the first match becomes the root and every member
//! path is reported relative to it.
//!
//! ```rust,no_run
//! use arcfs::{Archive, OpenOptions};
//!
//! # fn main() -> arcfs::Result<()> {
//! // bundle.tar contains "export-2024/manifest.json" and "export-2024/data.bin"
//! let archive = Archive::open_with_options(
//!     "bundle.tar",
//!     OpenOptions::new().hint("manifest.json"),
//! )?;
//! assert!(archive.exists("data.bin"));
//! assert_eq!(archive.used_hint().as_deref(), Some("export-2024/manifest.json"));
//!
//! // the same hint given inline
//! let archive = Archive::open_with_options(
//!     "bundle.tar#manifest.json",
//!     OpenOptions::new().inline_hint('#'),
//! )?;
//! # let _ = archive;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Member streams read their container through positioned reads on a shared
//! handle (see [`range`]), so an [`Archive`] can be shared between threads and
//! any number of members can be read at the same time.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `zip` | Yes | Zip archive backend |
//! | `http` | Yes | HTTP(S) backend (blocking `reqwest`) |
//! | `cli` | No | The `arcfs` command line tool |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Probing operations ([`Archive::exists`],
//! [`Archive::find_file`]) report absence as `false`/`None`; only structural
//! problems are errors. See [`error`] for details.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod archive;
pub mod backend;
pub mod detect;
pub mod error;
pub mod hint;
pub mod index;
pub mod options;
pub mod range;
pub mod safety;
pub mod stat;
pub mod stream;

pub use archive::Archive;
pub use backend::{BackendKind, Detail};
pub use error::{Error, Result};
pub use hint::{FileHint, Matcher};
pub use options::{OpenOptions, split_inline_hint};
pub use range::{ByteRange, ReadAt, SubStream};
pub use safety::LimitedReader;
pub use stat::FileStat;
pub use stream::{BoxedReader, FilterInit, MemberStream};
