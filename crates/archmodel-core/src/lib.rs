//! Archmodel Core Types
//!
//! This crate provides the leaf types shared by the archmodel workspace:
//!
//! - **Identifiers**: Typed element and relationship ids plus the model-owned
//!   [`identifier::IdGenerator`]
//! - **Tags**: Well-known tag names and the ordered [`tags::Tags`] collection
//! - **URLs**: Absolute URL validation ([`url`] module)
//! - **Layout**: Renderer-facing value types such as [`layout::Vertex`] and
//!   [`layout::PaperSize`]

pub mod identifier;
pub mod layout;
pub mod tags;
pub mod url;
