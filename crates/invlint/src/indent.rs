//! Quick and dirty YAML indentation checker
//!
//! Verifies that lines only increase indentation by 2 and that lines
//! starting `- ` don't have additional indentation. Blank lines are ignored.
//!
//! GOOD:
//!
//! ```yaml
//! - tasks:
//!   - name: hello world
//!     command: echo hello
//!
//!   - name: another task
//!     debug:
//!       msg: hello
//! ```
//!
//! BAD:
//!
//! ```yaml
//! - tasks:
//!    # comment in random indentation
//!     - name: hello world
//!       debug:
//!           msg: hello
//! ```
//!
//! Block scalar introductions (`: |`, `: >`, optionally followed by a single
//! digit) suspend checking until the next blank line.
//!
//! This is intentionally a heuristic, not a full grammar: it catches the
//! common mistake of inconsistent nesting, not all malformed documents.
use crate::report::Error;

/// Single left-to-right pass over `text`, one [Error] per offending line
pub fn check(text: &str) -> Vec<Error> {
    let mut errors = Vec::new();
    let mut previous_indent = "";
    let mut verbatim = false;

    for (index, line) in text.lines().enumerate() {
        let lineno = index + 1;

        if is_block_scalar_intro(line) {
            verbatim = true;
        }

        let (indent, rest) = split_indent(line);
        if rest.is_empty() {
            verbatim = false;
            continue;
        }
        if verbatim {
            // the intro line itself is skipped too and does not update state
            continue;
        }

        let offset = indent.len() as isize - previous_indent.len() as isize;
        if offset > 0 && offset != 2 {
            if indent.ends_with("- ") {
                errors.push(Error::new(
                    Some(lineno),
                    "lines starting with '- ' should have same or less \
                     indentation than previous line"
                        .to_string(),
                ));
            } else {
                errors.push(Error::new(
                    Some(lineno),
                    "indentation should increase by 2 chars".to_string(),
                ));
            }
        }

        previous_indent = indent;
    }

    errors
}

/// Split a line into its leading indent (optionally ending in a `- ` list
/// marker) and the remaining content
fn split_indent(line: &str) -> (&str, &str) {
    let mut end = line.len() - line.trim_start().len();
    if line[end..].starts_with("- ") {
        end += 2;
    }
    line.split_at(end)
}

/// Does this line open a block scalar (`key: |`, `key: >2`, ...)?
fn is_block_scalar_intro(line: &str) -> bool {
    let line = line
        .strip_suffix(|c: char| c.is_ascii_digit())
        .unwrap_or(line);
    line.ends_with(": |") || line.ends_with(": >")
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines_with_errors(text: &str) -> Vec<usize> {
        check(text).iter().filter_map(|error| error.line).collect()
    }

    #[test]
    fn consistent_two_space_steps_pass() {
        assert_eq!(
            lines_with_errors("- tasks:\n  - name: x\n    command: y\n"),
            Vec::<usize>::new()
        );
    }

    #[test]
    fn list_item_with_extra_indentation() {
        let errors = check("- tasks:\n    - name: x\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, Some(2));
        assert_eq!(
            errors[0].message,
            "lines starting with '- ' should have same or less indentation than previous line"
        );
    }

    #[test]
    fn odd_indentation_step() {
        let errors = check("key:\n   nested: 1\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, Some(2));
        assert_eq!(errors[0].message, "indentation should increase by 2 chars");
    }

    #[test]
    fn dedent_is_never_checked() {
        assert_eq!(
            lines_with_errors("a:\n  b:\n    c: 1\nd: 2\n"),
            Vec::<usize>::new()
        );
    }

    #[test]
    fn verbatim_suppresses_checks_until_blank_line() {
        let text = "script: |\n        arbitrarily indented\n   more\n\nkey: 1\n  nested: 2\n";
        assert_eq!(lines_with_errors(text), Vec::<usize>::new());
    }

    #[test]
    fn verbatim_ends_at_blank_line() {
        // after the blank line checking resumes
        let text = "script: >2\n   folded\n\nkey:\n     bad: 1\n";
        assert_eq!(lines_with_errors(text), vec![5]);
    }

    #[test]
    fn blank_lines_do_not_update_state() {
        assert_eq!(
            lines_with_errors("a:\n  b: 1\n\n  c: 2\n"),
            Vec::<usize>::new()
        );
    }

    #[test]
    fn block_scalar_intro_detection() {
        assert!(is_block_scalar_intro("key: |"));
        assert!(is_block_scalar_intro("key: >"));
        assert!(is_block_scalar_intro("key: |2"));
        assert!(!is_block_scalar_intro("key: value"));
        assert!(!is_block_scalar_intro("key: |23"));
        assert!(!is_block_scalar_intro("key:|"));
    }
}
