/// Accumulates output lines, owning the newline and indentation
/// discipline. Indent strings are cached per depth.
pub(crate) struct LineWriter {
    out: String,
    indent_unit: String,
    indent_cache: Vec<String>,
}

impl LineWriter {
    pub fn new(indent_size: usize) -> Self {
        Self {
            out: String::new(),
            indent_unit: " ".repeat(indent_size),
            indent_cache: vec![String::new()],
        }
    }

    pub fn push_line(&mut self, depth: usize, prefix: &str, content: &str) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        if depth > 0 && !self.indent_unit.is_empty() {
            self.ensure_indent_cache(depth);
            self.out.push_str(&self.indent_cache[depth]);
        }
        self.out.push_str(prefix);
        self.out.push_str(content);
    }

    fn ensure_indent_cache(&mut self, depth: usize) {
        while self.indent_cache.len() <= depth {
            let mut next = self.indent_cache.last().cloned().unwrap_or_default();
            next.push_str(&self.indent_unit);
            self.indent_cache.push(next);
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}
