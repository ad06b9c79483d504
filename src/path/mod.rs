//! Path handling
//!
//! Normalizes logical paths and translates them to SharePoint addressing.

pub mod translator;

pub use translator::{PathTranslator, basename, dirname, normalize};
