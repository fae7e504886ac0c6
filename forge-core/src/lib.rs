//! Forge Core - HTML authoring core for puzzle descriptions
//!
//! This crate holds the pure, host-independent parts of the Forge editor:
//! the allowed-element policy, the container normalizer, the rich-text
//! marker annotator, the rich-text/canonical converter and the sanitizing
//! preview renderer, along with the puzzle package helpers (scaffolds and
//! properties), configuration, errors and editor events.
//!
//! Every conversion parses into its own tree and drops it before returning,
//! so none of the HTML functions hold state between calls.

pub mod annotator;
pub mod config;
pub mod converter;
pub mod dom;
pub mod error;
pub mod event;
pub mod export;
pub mod mode;
pub mod normalizer;
pub mod policy;
pub mod properties;
pub mod sanitizer;
pub mod scaffold;

// Re-export commonly used types
pub use annotator::{annotate, deannotate, marker_for};
pub use config::{Config, EditorConfig, ServerConfig};
pub use converter::{to_canonical_html, to_rich_text};
pub use error::{ErrorSeverity, ForgeError, Result};
pub use event::{EditorEvent, EditorEventHandler, EventLog};
pub use export::{check_import_name, decode_import, ExportTarget, IMPORT_EXTENSIONS};
pub use mode::EditorMode;
pub use normalizer::{
    ensure_container, has_complete_container, minimal_seed, seed_template, to_canonical_form,
    to_editable_form,
};
pub use policy::{
    allowed_elements, block_descriptor, block_elements, is_allowed, BlockDescriptor,
    CONTAINER_TAG,
};
pub use properties::{Difficulty, Language, PropertyFiles, PuzzleProperties};
pub use sanitizer::render_preview;
pub use scaffold::{ScaffoldKind, ScaffoldReport, ScaffoldTemplate};
