use ropey::Rope;

use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

pub use crate::lsp::models::{LspDocument, LspDocumentState};

/// Char index of the end of a line's content, before its line break.
fn line_content_end(text: &Rope, line: usize) -> usize {
    let slice = text.line(line);
    let mut len = slice.len_chars();
    if len > 0 && slice.char(len - 1) == '\n' {
        len -= 1;
    }
    if len > 0 && slice.char(len - 1) == '\r' {
        len -= 1;
    }
    text.line_to_char(line) + len
}

/// Converts an LSP position (UTF-16 code units) to a char index in the Rope.
///
/// A line past the end of the document maps to the end of the document; a
/// character past the end of a line maps to the end of that line's content.
fn position_to_char_index(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }

    let line_start = text.line_to_char(line);
    let content_end = line_content_end(text, line);

    let line_start_cu = text.char_to_utf16_cu(line_start);
    let content_end_cu = text.char_to_utf16_cu(content_end);
    let target_cu = (line_start_cu + position.character as usize).min(content_end_cu);
    text.utf16_cu_to_char(target_cu)
}

impl LspDocumentState {
    pub fn new(uri: Url, text: &str, version: i32) -> Self {
        Self {
            uri,
            text: Rope::from_str(text),
            version,
        }
    }

    /// Applies a list of content changes to the document state.
    /// Returns the updated text if the version is newer, otherwise an error.
    pub fn apply(
        &mut self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Result<String, String> {
        if version <= self.version {
            return Err(format!("Version {} not newer than {}", version, self.version));
        }
        for change in &changes {
            if let Some(range) = change.range {
                let start = position_to_char_index(&range.start, &self.text);
                let end = position_to_char_index(&range.end, &self.text);
                let (start, end) = if start <= end { (start, end) } else { (end, start) };
                self.text.remove(start..end);
                self.text.insert(start, &change.text);
            } else {
                self.text = Rope::from_str(&change.text);
            }
        }
        self.version = version;
        Ok(self.text.to_string())
    }
}

impl LspDocument {
    pub fn new(uri: Url, text: &str, version: i32) -> Self {
        Self {
            state: tokio::sync::RwLock::new(LspDocumentState::new(uri, text, version)),
        }
    }

    /// Returns the current text of the document as a string.
    pub async fn text(&self) -> String {
        self.state.read().await.text.to_string()
    }

    /// Returns the current version of the document.
    pub async fn version(&self) -> i32 {
        self.state.read().await.version
    }

    /// Applies changes to the document, returning the new text.
    pub async fn apply(
        &self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Option<String> {
        let mut state = self.state.write().await;
        state.apply(changes, version).ok()
    }
}
