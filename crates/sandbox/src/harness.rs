//! Fixed wrapper around user snippets.
//!
//! The wrapped program always writes valid JSON to stdout or nothing at
//! all: the snippet body runs under `try` with the standard-library
//! `json` module pre-imported, and any raised exception is converted to
//! `{"error": "<message>"}` on stdout.

/// Wrap a snippet in the execution harness.
pub fn wrap_snippet(code: &str) -> String {
    let mut wrapped = String::with_capacity(code.len() + 96);
    wrapped.push_str("import json\n");
    wrapped.push_str("try:\n");

    let mut has_body = false;
    for line in code.lines() {
        has_body = true;
        wrapped.push_str("    ");
        wrapped.push_str(line);
        wrapped.push('\n');
    }
    if !has_body {
        wrapped.push_str("    pass\n");
    }

    wrapped.push_str("except Exception as e:\n");
    wrapped.push_str("    print(json.dumps({\"error\": str(e)}))\n");
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_single_line() {
        let wrapped = wrap_snippet("print(json.dumps({\"x\": 1}))");
        assert!(wrapped.starts_with("import json\ntry:\n"));
        assert!(wrapped.contains("    print(json.dumps({\"x\": 1}))\n"));
        assert!(wrapped.ends_with("    print(json.dumps({\"error\": str(e)}))\n"));
    }

    #[test]
    fn test_indents_every_line() {
        let wrapped = wrap_snippet("a = 1\nb = a + 1\nprint(json.dumps({\"b\": b}))");
        for line in wrapped.lines().skip(2).take(3) {
            assert!(line.starts_with("    "), "unindented body line: {:?}", line);
        }
    }

    #[test]
    fn test_empty_snippet_gets_a_pass_body() {
        let wrapped = wrap_snippet("");
        assert!(wrapped.contains("try:\n    pass\n"));
    }
}
