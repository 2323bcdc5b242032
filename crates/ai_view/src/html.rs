//! Static HTML rendering of a view.

use ai_conversation::Role;
use ai_preview::Preview;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::{
    projector::to_html,
    tree::{Entry, ViewTree},
};

/// Render `tree` as a standalone HTML document.
///
/// Entries without pre-rendered HTML are rendered from their markdown.
#[must_use]
pub fn page(tree: &ViewTree) -> String {
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Autoimprove" }
            }
            body {
                main data-version=(tree.version) {
                    @for entry in &tree.entries {
                        (entry_markup(entry))
                    }
                }
            }
        }
    };

    markup.into_string()
}

/// Render a standalone document holding only the sandboxed preview.
#[must_use]
pub fn preview_page(preview: &Preview) -> Option<String> {
    let frame = preview.markup()?;
    let markup = html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Preview" }
            }
            body { (PreEscaped(frame)) }
        }
    };

    Some(markup.into_string())
}

fn entry_markup(entry: &Entry) -> Markup {
    let body = entry
        .html
        .clone()
        .unwrap_or_else(|| to_html(&entry.markdown));

    html! {
        section.turn.(role_class(entry.role)) data-index=(entry.index) aria-busy=[entry.in_progress.then_some("true")] {
            @if entry.loading {
                p.loading { "…" }
            } @else {
                div.content { (PreEscaped(body)) }
            }
            @if let Some(markup) = entry.preview.as_deref().and_then(|p| p.markup()) {
                div.preview { (PreEscaped(markup)) }
            }
        }
    }
}

fn role_class(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}
