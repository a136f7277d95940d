//! Text rendering primitives shared by the synthesizers.

pub mod csharp;

use crate::config::{GeneratorConfig, LineEnding};

/// Layout settings for generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Line terminator.
    pub line_ending: LineEnding,
    /// Spaces per indentation level.
    pub indent_width: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for RenderOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            line_ending: config.line_ending,
            indent_width: config.indent_width,
        }
    }
}

/// Line-oriented writer that tracks brace indentation.
#[derive(Debug)]
pub struct SourceWriter {
    buffer: String,
    depth: usize,
    options: RenderOptions,
}

impl SourceWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self {
            buffer: String::with_capacity(2048),
            depth: 0,
            options,
        }
    }

    /// Writes one indented line. Empty text produces a bare line break.
    pub fn line(&mut self, text: &str) {
        if !text.is_empty() {
            let width = self.depth * self.options.indent_width;
            self.buffer.extend(std::iter::repeat_n(' ', width));
            self.buffer.push_str(text);
        }
        self.buffer.push_str(self.options.line_ending.as_str());
    }

    /// Writes an empty line.
    pub fn blank(&mut self) {
        self.line("");
    }

    /// Writes `header` and an opening brace, then indents.
    pub fn open(&mut self, header: &str) {
        self.open_with::<&str>(header, &[]);
    }

    /// Like [`Self::open`], with continuation lines (`where` clauses, a
    /// constructor initializer) indented between the header and the brace.
    pub fn open_with<S: AsRef<str>>(&mut self, header: &str, continuations: &[S]) {
        self.line(header);
        self.indented(|w| {
            for continuation in continuations {
                w.line(continuation.as_ref());
            }
        });
        self.line("{");
        self.depth += 1;
    }

    /// Dedents and writes a closing brace.
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// Writes documentation text as `///` lines, one per source line.
    pub fn doc(&mut self, doc: Option<&str>) {
        let Some(text) = doc else {
            return;
        };
        for doc_line in text.lines() {
            if doc_line.is_empty() {
                self.line("///");
            } else {
                self.line(&format!("/// {doc_line}"));
            }
        }
    }

    /// Runs `body` one indentation level deeper.
    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth = self.depth.saturating_sub(1);
    }

    /// Returns the accumulated text.
    #[must_use]
    pub fn finish(self) -> String {
        self.buffer
    }
}
