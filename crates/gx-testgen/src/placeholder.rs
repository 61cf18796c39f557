/// How tabstop numbers run across the fragments of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderNumbering {
    /// Every fragment starts again at `$1`.
    #[default]
    PerFragment,
    /// Numbers keep increasing from one fragment to the next.
    Continuous,
}

/// Hands out numbered snippet tabstops: `$n` or `${n|a,b|}`.
#[derive(Debug, Clone, Default)]
pub struct TabstopAllocator {
    count: usize,
}

impl TabstopAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tabstops handed out so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next_plain(&mut self) -> String {
        self.count += 1;
        format!("${}", self.count)
    }

    /// Choice tabstop over `options`, or a plain one when there are none.
    pub fn next_choice<S: AsRef<str>>(&mut self, options: &[S]) -> String {
        if options.is_empty() {
            return self.next_plain();
        }
        self.count += 1;
        let choices = options
            .iter()
            .map(|option| escape_choice(option.as_ref()))
            .collect::<Vec<_>>()
            .join(",");
        format!("${{{}|{}|}}", self.count, choices)
    }
}

fn escape_choice(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | ',' | '|') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
