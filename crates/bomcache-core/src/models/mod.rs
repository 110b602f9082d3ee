//! Data models for bills of materials.
//!
//! These are plain value records shared with the web front end:
//!
//! - `BaseModel`: identity shared by every record (`uuid`, absent until persisted)
//! - `Bom`: a named bill of materials
//! - `Item`: a line item weakly linked to a `Bom` through `bom_uuid`
//!
//! The `default_*` factories produce the canonical empty records. Nothing here
//! validates or persists data; that belongs to the application using them.

pub mod bom;
pub mod item;

pub use bom::{default_base_model, default_bom, BaseModel, Bom};
pub use item::{default_item, Item};
