//! # Page Builder Model
//!
//! Value types for an editable page: sections, components, styles and the
//! patches that update them, plus id allocation.
//!
//! Everything here is plain data. Values are cloned into new snapshots by
//! the editor, never mutated behind a snapshot's back.

pub mod component;
pub mod document;
pub mod error;
pub mod ids;
pub mod patch;
pub mod style;

pub use component::{Component, ComponentContent, ComponentType, FormField, InputKind};
pub use document::{ComponentLocation, PageDocument, Section, SectionKind};
pub use error::ModelError;
pub use ids::{page_seed, IdGenerator, NodeId, PageId};
pub use patch::{ComponentPatch, SectionPatch};
pub use style::{Styles, TextAlign};
