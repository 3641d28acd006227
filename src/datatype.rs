//! Pretty-printer for nested datatype descriptors.
//!
//! Turns a compact type string such as `STRUCT(a INTEGER, b VARCHAR[])` into
//! indented multi-line text for display inside a diagram node. The scan is a
//! single forward pass over the characters; the input is never validated and
//! any string produces some output.

/// Spaces per nesting level.
pub const INDENT_SIZE: usize = 2;

/// Datatype formatter with a configurable indent width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatatypeFormatter {
    indent: usize,
}

impl Default for DatatypeFormatter {
    fn default() -> Self {
        Self {
            indent: INDENT_SIZE,
        }
    }
}

impl DatatypeFormatter {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Format a datatype descriptor.
    ///
    /// Non-empty `(...)` / `[...]` groups open onto a new, deeper indented
    /// line and close on a line of their own. Empty groups stay compact.
    /// A comma followed directly by an item pushes that item to a new line;
    /// a `", "` separator is kept as is.
    pub fn format(&self, datatype: &str) -> String {
        let chars: Vec<char> = datatype.chars().collect();
        let mut out = String::with_capacity(datatype.len() * 2);
        let mut level = 0usize;

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();

            match c {
                '(' | '[' => {
                    out.push(c);
                    if next.is_some_and(|n| !is_closer(n)) {
                        level += 1;
                        self.break_line(&mut out, level);
                    }
                }
                ')' | ']' => {
                    // `prev` being an opener is the only signal for an empty group
                    if level > 0 && !prev.is_some_and(is_opener) {
                        level -= 1;
                        self.break_line(&mut out, level);
                    }
                    out.push(c);
                }
                ',' => {
                    out.push(c);
                    match next {
                        Some(' ') => {
                            out.push(' ');
                            i += 1;
                        }
                        Some(n) if !is_closer(n) => self.break_line(&mut out, level),
                        _ => {}
                    }
                }
                _ => out.push(c),
            }
            i += 1;
        }

        out
    }

    fn break_line(&self, out: &mut String, level: usize) {
        out.push('\n');
        out.extend(std::iter::repeat_n(' ', level * self.indent));
    }
}

/// Format a datatype descriptor with the default two-space indent.
pub fn format_datatype(datatype: &str) -> String {
    DatatypeFormatter::default().format(datatype)
}

fn is_opener(c: char) -> bool {
    c == '(' || c == '['
}

fn is_closer(c: char) -> bool {
    c == ')' || c == ']'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(format_datatype(""), "");
    }

    #[test]
    fn test_flat_type_unchanged() {
        assert_eq!(format_datatype("INTEGER"), "INTEGER");
        assert_eq!(format_datatype("TIMESTAMP WITH TIME ZONE"), "TIMESTAMP WITH TIME ZONE");
        assert_eq!(format_datatype("a, b, c"), "a, b, c");
    }

    #[test]
    fn test_empty_groups_stay_compact() {
        assert_eq!(format_datatype("ARRAY()"), "ARRAY()");
        assert_eq!(format_datatype("ARRAY[]"), "ARRAY[]");
        assert_eq!(format_datatype("INTEGER[][]"), "INTEGER[][]");
    }

    #[test]
    fn test_single_level() {
        assert_eq!(format_datatype("STRUCT(a,b)"), "STRUCT(\n  a,\n  b\n)");
    }

    #[test]
    fn test_two_levels() {
        assert_eq!(format_datatype("A(B(c))"), "A(\n  B(\n    c\n  )\n)");
    }

    #[test]
    fn test_space_after_comma_preserved() {
        assert_eq!(format_datatype("A(x, y)"), "A(\n  x, y\n)");
    }

    #[test]
    fn test_comma_before_closer() {
        assert_eq!(format_datatype("A(x,)"), "A(\n  x,\n)");
        assert_eq!(format_datatype("x,"), "x,");
    }

    #[test]
    fn test_bare_comma_breaks_at_top_level() {
        assert_eq!(format_datatype("a,b"), "a,\nb");
    }

    #[test]
    fn test_nested_struct_with_array() {
        assert_eq!(
            format_datatype("ARRAY(STRUCT(a INT, b ARRAY(INT)))"),
            "ARRAY(\n  STRUCT(\n    a INT, b ARRAY(\n      INT\n    )\n  )\n)"
        );
    }

    #[test]
    fn test_empty_group_inside_group() {
        assert_eq!(format_datatype("A(B())"), "A(\n  B()\n)");
        assert_eq!(
            format_datatype("STRUCT(a INTEGER, b VARCHAR[])"),
            "STRUCT(\n  a INTEGER, b VARCHAR[]\n)"
        );
    }

    #[test]
    fn test_mixed_brackets_share_one_counter() {
        assert_eq!(format_datatype("MAP[K(v)]"), "MAP[\n  K(\n    v\n  )\n]");
    }

    #[test]
    fn test_unmatched_opener_keeps_indent() {
        assert_eq!(format_datatype("A(B"), "A(\n  B");
        assert_eq!(format_datatype("("), "(");
    }

    #[test]
    fn test_unmatched_closer_at_top_level() {
        assert_eq!(format_datatype("A)"), "A)");
        assert_eq!(format_datatype("))]"), "))]");
        assert_eq!(format_datatype("A(b))"), "A(\n  b\n))");
    }

    #[test]
    fn test_non_ascii_passthrough() {
        assert_eq!(format_datatype("名前(ä,ö)"), "名前(\n  ä,\n  ö\n)");
    }

    #[test]
    fn test_custom_indent() {
        let f = DatatypeFormatter::new(4);
        assert_eq!(f.format("A(B(c))"), "A(\n    B(\n        c\n    )\n)");
        assert_eq!(DatatypeFormatter::new(0).format("A(b)"), "A(\nb\n)");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_format_emits_no_events() {
        use std::io;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(move || writer.clone())
            .finish();

        let out = tracing::subscriber::with_default(subscriber, || {
            tracing::trace!("marker");
            format_datatype("STRUCT(a MAP(K,V), b INT[])")
        });
        assert_eq!(out, "STRUCT(\n  a MAP(\n    K,\n    V\n  ), b INT[]\n)");

        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logged.lines().count(), 1);
        assert!(logged.contains("marker"));
    }
}
