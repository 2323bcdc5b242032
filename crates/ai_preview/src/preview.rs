use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::extract::{CodeBlock, first_code_block};

/// Sandbox permissions granted to previewed code.
pub const SANDBOX: &str = "allow-scripts allow-forms allow-modals";

/// The derived preview of one finalized assistant turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    /// The content has no fenced code block.
    Empty,

    /// The first code block, wrapped in a sandboxed frame.
    Sandbox {
        language: Option<String>,
        code: String,
        markup: String,
    },
}

impl Preview {
    #[must_use]
    pub fn from_content(content: &str) -> Self {
        first_code_block(content).map_or(Self::Empty, Self::from_block)
    }

    #[must_use]
    pub fn from_block(block: CodeBlock) -> Self {
        let CodeBlock { language, code, .. } = block;
        let document = document(language.as_deref(), &code);
        let markup = html! {
            iframe class="preview" sandbox=(SANDBOX) srcdoc=(document) {}
        };

        Self::Sandbox {
            language,
            code,
            markup: markup.into_string(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The sandbox markup, if there is anything to preview.
    #[must_use]
    pub fn markup(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Sandbox { markup, .. } => Some(markup),
        }
    }

    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Sandbox { code, .. } => Some(code),
        }
    }
}

/// Build the framed document for a block of the given language.
fn document(language: Option<&str>, code: &str) -> String {
    let language = language.map(str::to_ascii_lowercase);

    let body = match language.as_deref() {
        None | Some("html" | "htm" | "xhtml") => return code.to_owned(),
        Some("js" | "javascript" | "mjs" | "jsx") => html! {
            script type="module" { (PreEscaped(code)) }
        },
        Some("css") => html! {
            style { (PreEscaped(code)) }
        },
        Some(_) => html! {
            pre { code { (code) } }
        },
    };

    wrap(body).into_string()
}

fn wrap(body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head { meta charset="utf-8"; }
            body { (body) }
        }
    }
}

#[cfg(test)]
#[path = "preview_tests.rs"]
mod tests;
