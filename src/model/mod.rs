//! Model layer
//!
//! - `group` - device groups and the drafts the forms submit
//! - `tree` - folder tree built from slash-delimited paths

pub mod group;
pub mod tree;
