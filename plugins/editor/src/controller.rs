//! Dual-mode controller
//!
//! Owns whichever sub-editor is mounted (the rich-text surface or the raw
//! source editor, never both) and the canonical value derived from it.
//! Every edit recomputes the canonical form and the sanitized preview;
//! toggling converts the current value once and mounts the other editor.

use std::path::Path;

use forge_core::config::EditorConfig;
use forge_core::converter::{to_canonical_html, to_rich_text};
use forge_core::event::{EditorEvent, EditorEventHandler};
use forge_core::export::ExportTarget;
use forge_core::normalizer::{has_complete_container, seed_template};
use forge_core::sanitizer::render_preview;
use forge_core::{annotator, EditorMode, Result};

use crate::document::{import_bytes, read_document, ExportedFile, ImportedDocument};
use crate::keyboard::{Key, KeyOutcome};
use crate::source_editor::SourceEditor;
use crate::surface::EditingSurface;
use crate::EditorError;

/// The mounted sub-editor
enum ActiveEditor {
    Rich(EditingSurface),
    Source(SourceEditor),
}

pub struct DualModeController {
    editor: ActiveEditor,
    canonical: String,
    preview: String,
    config: EditorConfig,
    handlers: Vec<Box<dyn EditorEventHandler>>,
}

impl DualModeController {
    /// Controller in rich mode, seeded with the starter template
    pub fn new(config: EditorConfig) -> Self {
        Self::with_content(&seed_template(), config)
    }

    /// Controller in rich mode holding `canonical_html`
    pub fn with_content(canonical_html: &str, config: EditorConfig) -> Self {
        let mut surface = EditingSurface::with_tab_text(&config.tab_text);
        surface.load(&to_rich_text(canonical_html));

        let mut controller = Self {
            editor: ActiveEditor::Rich(surface),
            canonical: String::new(),
            preview: String::new(),
            config,
            handlers: Vec::new(),
        };
        controller.recompute();
        controller
    }

    pub fn subscribe(&mut self, handler: Box<dyn EditorEventHandler>) {
        tracing::debug!("Subscribed editor event handler: {}", handler.handler_name());
        self.handlers.push(handler);
    }

    pub fn mode(&self) -> EditorMode {
        match self.editor {
            ActiveEditor::Rich(_) => EditorMode::Rich,
            ActiveEditor::Source(_) => EditorMode::Source,
        }
    }

    /// Current value of the mounted editor (annotated in rich mode, raw in source mode)
    pub fn value(&self) -> String {
        match &self.editor {
            ActiveEditor::Rich(surface) => surface.markup(),
            ActiveEditor::Source(source) => source.value().to_string(),
        }
    }

    /// Save-ready value derived from the last edit
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Sanitized preview of the canonical value
    pub fn preview(&self) -> &str {
        &self.preview
    }

    /// Whether save and export should be enabled
    pub fn is_exportable(&self) -> bool {
        has_complete_container(&self.canonical)
    }

    pub fn surface(&self) -> Option<&EditingSurface> {
        match &self.editor {
            ActiveEditor::Rich(surface) => Some(surface),
            ActiveEditor::Source(_) => None,
        }
    }

    pub fn surface_mut(&mut self) -> Option<&mut EditingSurface> {
        match &mut self.editor {
            ActiveEditor::Rich(surface) => Some(surface),
            ActiveEditor::Source(_) => None,
        }
    }

    pub fn source_editor_mut(&mut self) -> Option<&mut SourceEditor> {
        match &mut self.editor {
            ActiveEditor::Rich(_) => None,
            ActiveEditor::Source(source) => Some(source),
        }
    }

    /// Switch to the other editor, converting the current value once.
    ///
    /// Rich to source strips the markers. Source to rich re-derives the
    /// editable form, so hand-written markup without a container is wrapped.
    pub fn toggle(&mut self) -> EditorMode {
        let next = match &self.editor {
            ActiveEditor::Rich(surface) => {
                let raw = annotator::deannotate(&surface.markup());
                ActiveEditor::Source(SourceEditor::with_tab_text(raw, &self.config.tab_text))
            }
            ActiveEditor::Source(source) => {
                let mut surface = EditingSurface::with_tab_text(&self.config.tab_text);
                surface.load(&to_rich_text(source.value()));
                ActiveEditor::Rich(surface)
            }
        };
        self.editor = next;

        let mode = self.mode();
        tracing::info!("Editor switched to {} mode", mode);
        self.publish(EditorEvent::ModeChanged { mode });
        self.recompute();
        mode
    }

    /// The mounted editor reported a new value
    pub fn on_edit(&mut self, value: &str) {
        match &mut self.editor {
            ActiveEditor::Rich(surface) => {
                surface.load(value);
            }
            ActiveEditor::Source(source) => {
                source.on_input(value);
            }
        }
        self.content_changed();
    }

    /// Insert a toolbar block at the rich-text caret.
    ///
    /// Returns whether anything was inserted; without a caret nothing is.
    pub fn insert_block(&mut self, tag: &str) -> Result<bool> {
        let ActiveEditor::Rich(surface) = &mut self.editor else {
            return Err(EditorError::WrongMode {
                expected: EditorMode::Rich,
                actual: EditorMode::Source,
            }
            .into());
        };

        if surface.insert_block(tag)?.is_none() {
            return Ok(false);
        }
        self.publish(EditorEvent::BlockInserted {
            tag: tag.to_string(),
        });
        self.content_changed();
        Ok(true)
    }

    pub fn handle_key(&mut self, key: &Key) -> KeyOutcome {
        let outcome = match &mut self.editor {
            ActiveEditor::Rich(surface) => surface.handle_key(key),
            ActiveEditor::Source(source) => source.handle_key(key),
        };
        if outcome.value.is_some() {
            self.content_changed();
        }
        outcome
    }

    /// Focus left the mounted editor
    pub fn blur(&mut self) {
        let ActiveEditor::Rich(surface) = &mut self.editor else {
            return;
        };
        if surface.blur().is_some() {
            self.publish(EditorEvent::Reseeded);
            self.content_changed();
        }
    }

    /// Canonical bytes for `target`
    pub fn export(&mut self, target: ExportTarget) -> ExportedFile {
        let file = ExportedFile::from_canonical(&self.canonical, target);
        tracing::info!("Exporting {} ({})", file.file_name, target.label());
        self.publish(EditorEvent::Exported {
            file_name: file.file_name.clone(),
            bytes: file.bytes.len(),
        });
        file
    }

    /// Export to the configured default target
    pub fn export_default(&mut self) -> ExportedFile {
        let target = self.config.default_export;
        self.export(target)
    }

    /// Write the export for `target` into `dir`
    pub fn export_to_dir(&mut self, target: ExportTarget, dir: &Path) -> Result<std::path::PathBuf> {
        self.export(target).write_to_dir(dir)
    }

    /// Replace the content with an uploaded file
    pub fn import(&mut self, file_name: &str, bytes: &[u8]) -> Result<()> {
        let document = import_bytes(file_name, bytes)?;
        self.load_document(document);
        Ok(())
    }

    pub fn import_file(&mut self, path: &Path) -> Result<()> {
        let document = read_document(path)?;
        self.load_document(document);
        Ok(())
    }

    fn load_document(&mut self, document: ImportedDocument) {
        let rich = to_rich_text(&document.content);
        match &mut self.editor {
            ActiveEditor::Rich(surface) => {
                surface.load(&rich);
            }
            ActiveEditor::Source(source) => {
                source.on_input(&annotator::deannotate(&rich));
            }
        }
        tracing::info!("Imported {}", document.file_name);
        self.publish(EditorEvent::Imported {
            file_name: document.file_name,
        });
        self.content_changed();
    }

    fn recompute(&mut self) {
        self.canonical = to_canonical_html(&self.value());
        self.preview = render_preview(&self.canonical);
    }

    fn content_changed(&mut self) {
        self.recompute();
        self.publish(EditorEvent::ContentChanged {
            canonical: self.canonical.clone(),
        });
    }

    fn publish(&self, event: EditorEvent) {
        for handler in &self.handlers {
            if let Err(e) = handler.handle_editor_event(&event) {
                tracing::warn!(
                    "Editor event handler {} failed on {}: {}",
                    handler.handler_name(),
                    event.event_type(),
                    e
                );
            }
        }
    }
}

impl Default for DualModeController {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}
