/// A fenced code block found in markdown content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// First word of the info string, if any.
    pub language: Option<String>,

    /// The block's lines, without the fences.
    pub code: String,

    /// Whether a closing fence was found. An unterminated block runs to the
    /// end of the content.
    pub terminated: bool,
}

/// Find the first fenced code block in `content`.
#[must_use]
pub fn first_code_block(content: &str) -> Option<CodeBlock> {
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        let Some(fence) = Fence::open(line) else {
            continue;
        };

        let mut code = vec![];
        let mut terminated = false;
        for line in lines.by_ref() {
            if fence.closes(line) {
                terminated = true;
                break;
            }

            code.push(fence.dedent(line));
        }

        return Some(CodeBlock {
            language: fence.language().map(str::to_owned),
            code: code.join("\n"),
            terminated,
        });
    }

    None
}

#[derive(Debug)]
struct Fence<'a> {
    marker: char,
    len: usize,
    indent: usize,
    info: &'a str,
}

impl<'a> Fence<'a> {
    fn open(line: &'a str) -> Option<Self> {
        let (indent, rest) = split_indent(line)?;
        let marker = rest.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let len = run_length(rest, marker);
        if len < 3 {
            return None;
        }

        let info = rest[len..].trim();
        if marker == '`' && info.contains('`') {
            return None;
        }

        Some(Self {
            marker,
            len,
            indent,
            info,
        })
    }

    fn closes(&self, line: &str) -> bool {
        let Some((_, rest)) = split_indent(line) else {
            return false;
        };

        let len = run_length(rest, self.marker);
        len >= self.len && rest[len..].trim().is_empty()
    }

    fn language(&self) -> Option<&'a str> {
        self.info.split_whitespace().next()
    }

    /// Strip up to the fence's own indentation from a content line.
    fn dedent<'l>(&self, line: &'l str) -> &'l str {
        let spaces = line.len() - line.trim_start_matches(' ').len();
        &line[spaces.min(self.indent)..]
    }
}

/// Split off up to three spaces of indentation.
fn split_indent(line: &str) -> Option<(usize, &str)> {
    let rest = line.trim_start_matches(' ');
    let indent = line.len() - rest.len();

    (indent <= 3).then_some((indent, rest))
}

fn run_length(s: &str, marker: char) -> usize {
    s.len() - s.trim_start_matches(marker).len()
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
