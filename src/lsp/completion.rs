//! Completion candidates
//!
//! Completion ignores the cursor: every request offers the framework's
//! functions, constants and keywords plus the document's own `let` bindings.
//! Details are only computed when the editor resolves a single item.

use std::collections::HashSet;

use tower_lsp::lsp_types::{CompletionItem, CompletionItemKind, Position};

use crate::analysis::extract_variables;
use crate::framework::FrameworkTable;

/// Builds the candidate list for a document.
///
/// Candidates are deduplicated on `(label, kind)`, keeping the first
/// occurrence, so a variable bound twice is offered once.
pub fn complete(text: &str, _cursor: Position, framework: &FrameworkTable) -> Vec<CompletionItem> {
    let variables = extract_variables(text);

    let groups: [(&[String], CompletionItemKind); 4] = [
        (framework.funcs(), CompletionItemKind::FUNCTION),
        (&variables, CompletionItemKind::VARIABLE),
        (framework.vars(), CompletionItemKind::CONSTANT),
        (framework.keyword_other(), CompletionItemKind::KEYWORD),
    ];

    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (group, (labels, kind)) in groups.into_iter().enumerate() {
        for label in labels {
            if seen.insert((label.as_str(), group)) {
                items.push(CompletionItem {
                    label: label.clone(),
                    kind: Some(kind),
                    ..Default::default()
                });
            }
        }
    }

    items
}

/// Detail text shown for a resolved candidate, if its kind has one.
pub fn resolve_detail(label: &str, kind: Option<CompletionItemKind>) -> Option<String> {
    match kind? {
        CompletionItemKind::FUNCTION => Some(format!("fn {}", label)),
        CompletionItemKind::VARIABLE => Some(format!("let {}", label)),
        CompletionItemKind::CONSTANT => Some(format!("const ($)! {}", label)),
        _ => None,
    }
}

/// Fills in the detail of a candidate; kinds without a detail pass through unchanged.
pub fn resolve(mut item: CompletionItem) -> CompletionItem {
    if let Some(detail) = resolve_detail(&item.label, item.kind) {
        item.detail = Some(detail);
    }
    item
}
