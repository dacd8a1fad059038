//! Indented line output shared by the generators.

const INDENT: &str = "    ";

/// Accumulates generated source text with a current indentation level.
#[derive(Debug, Default)]
pub struct CodeWriter {
    output: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one indented line.
    pub fn line(&mut self, s: impl AsRef<str>) {
        let s = s.as_ref();
        if !s.is_empty() {
            for _ in 0..self.indent {
                self.output.push_str(INDENT);
            }
            self.output.push_str(s);
        }
        self.output.push('\n');
    }

    /// Write one line indented one level deeper than the current level.
    pub fn line_indented(&mut self, s: impl AsRef<str>) {
        self.indent();
        self.line(s);
        self.dedent();
    }

    pub fn blank(&mut self) {
        self.output.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Write `{` on its own line and indent.
    pub fn open_brace(&mut self) {
        self.line("{");
        self.indent();
    }

    /// Dedent and write `}` followed by `suffix`.
    pub fn close_brace(&mut self, suffix: &str) {
        self.dedent();
        self.line(format!("}}{suffix}"));
    }

    /// Write the auto-generated banner as `//` comments.
    pub fn preamble(&mut self) {
        const RULE: &str =
            "// ----------------------------------------------------------------------------";
        self.line(RULE);
        self.line("// <auto-generated>");
        self.line("// This is autogenerated code by astbridge.");
        self.line("// Do not edit this file or all your changes will be lost after re-generation.");
        self.line("// </auto-generated>");
        self.line(RULE);
    }

    pub fn finish(self) -> String {
        self.output
    }
}
