//! lint findings and their rendering
//!
//! A [Report] collects every [Error] one rule produced for one input.
//! Error order is insertion order and is kept stable so output is
//! reproducible for a given input.

/// Rule identifiers as they appear in rendered output
pub mod rule {
    /// indentation monotonicity ([crate::indent])
    pub const INDENT: &str = "indent";
    /// repeated mapping keys ([crate::dupkeys])
    pub const DUPLICATE_KEY: &str = "dupkey";
    /// sibling group variable conflicts ([crate::conflicts])
    pub const GROUP_VARS: &str = "groupvars";
}

/// A single finding
///
/// `line` is 1-based and absent for document-level findings (a broken
/// inventory, an unparseable document, a conflict spanning two files).
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Error {
    pub line: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// All findings of one rule for one input
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Report {
    /// source identifier, usually a path (`<stdin>` for standard input)
    pub path: String,
    pub rule: &'static str,
    pub errors: Vec<Error>,
}

impl Report {
    pub fn empty(path: impl Into<String>, rule: &'static str) -> Self {
        Self::new(path.into(), rule, Vec::new())
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render one line per error
    ///
    /// `path:line: [rule] message <original line text>`
    ///
    /// The line number and line text are omitted when no line number applies.
    /// `source` is the input text the findings refer to; without it the line
    /// text is left out.
    pub fn render(&self, source: Option<&str>) -> String {
        self.errors
            .iter()
            .map(|error| match error.line {
                Some(line) => {
                    let text = source
                        .and_then(|source| source.lines().nth(line - 1))
                        .unwrap_or_default();
                    format!("{}:{}: [{}] {} {}", self.path, line, self.rule, error.message, text)
                }
                None => format!("{}: [{}] {}", self.path, self.rule, error.message),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
