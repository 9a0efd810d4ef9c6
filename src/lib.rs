//! # rsytmpl - rsyslog template log parser
//!
//! A Rust library that turns rsyslog-style templates into log line parsers.
//!
//! This library provides functionality to:
//! - Keep a catalog of named, numbered template definitions (`$template Name,"..."`)
//! - Compile a template such as `%TIMESTAMP% %HOSTNAME% %syslogtag%%msg%` into a regex
//! - Parse log lines into ordered field records, reporting non-matching lines
//!   as empty records instead of stopping the stream
//! - Extend the catalog with user templates named in a configuration file
//!
//! ## Quick Start
//!
//! ```rust
//! use rsytmpl::{Reader, Selector, TemplateCatalog, TemplateCompiler};
//! use std::io::Cursor;
//!
//! let catalog = TemplateCatalog::builtin()?;
//! let def = catalog.select(&Selector::Default)?; // TraditionalFileFormat
//! let template = TemplateCompiler::new().compile_definition(def)?;
//!
//! let log_data = "Oct 11 14:01:13 myhost sshd[1234]: Accepted password for alice\n";
//! for record in Reader::new(Cursor::new(log_data), template) {
//!     let record = record?;
//!     println!("host: {}", record.field("HOSTNAME")?);
//!     println!("tag:  {}", record.field("syslogtag")?);
//! }
//! # Ok::<(), rsytmpl::Error>(())
//! ```
//!
//! ## Supported fields
//!
//! `HOSTNAME`, `TIMESTAMP`, `syslogtag`, `msg`, `PRI`, `NUM` and `bracket`.
//! Property options (`%msg:::drop-last-lf%`) are accepted and ignored: fields
//! are extracted verbatim. A field used twice gets a numeric suffix on its
//! second use (`msg`, `msg1`, ...). More fields can be added per compiler with
//! [`FieldDictionary::with_field`].

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod error;
pub mod fields;
pub mod reader;
pub mod record;
pub mod registry;

// Re-export main types for convenience
pub use catalog::{Selector, TemplateCatalog, TemplateDefinition, DEFAULT_TEMPLATE_DEFS};
pub use compiler::{decompose, CompiledTemplate, Segment, TemplateCompiler};
pub use config::Config;
pub use error::{Error, Result};
pub use fields::FieldDictionary;
pub use reader::{ReadStats, Reader};
pub use record::{Fields, Record};
pub use registry::ParserRegistry;
