//! Haricot Field Schemas
//!
//! A declarative registry for tabbed settings panels. A [`Manager`] collects
//! sections (tabs), settings (typed values with defaults and sanitizers) and
//! controls (inputs binding one setting into one section), checks them as
//! they are registered, and hands them to a renderer in declaration order.
//!
//! ## Features
//!
//! - **Referential integrity**: controls must name a registered section and setting
//! - **Ordered iteration**: sections and controls come back in registration order
//! - **Nested choices**: option groups, palettes and image choices keep their shape
//! - **Batch validation**: `validate()` reports every problem at once
//! - **Documents**: managers can be written in TOML or JSON
//!
//! ## Registration flow
//!
//! ```text
//! host hook ──► run_registration(manager, registrars, context)
//!                 ├── every registrar: register_sections
//!                 ├── every registrar: register_settings
//!                 └── every registrar: register_controls
//!               manager.validate()  ──► Vec<Violation>
//!               manager.freeze()    ──► read-only, shareable
//! ```

pub mod checksum;
pub mod config;
pub mod document;
pub mod error;
pub mod example;
pub mod export;
pub mod hooks;
pub mod registry;
pub mod sanitize;
pub mod schema;
pub mod value;

pub use checksum::Checksum;
pub use config::{HaricotConfig, OutputFormat};
pub use document::ManagerDocument;
pub use error::{EntityKind, Result, SchemaError};
pub use export::ManagerSnapshot;
pub use hooks::{run_registration, Registrar};
pub use registry::{DuplicatePolicy, Manager, Violation, ViolationKind};
pub use sanitize::{BuiltinSanitizer, Sanitizer};
pub use schema::{Choice, ChoiceOption, Control, ControlType, Section, Setting};
pub use value::{SettingValue, ValueType};
