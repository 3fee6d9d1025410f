//! Locate a JSON value inside noisy model output.
//!
//! Models wrap their JSON in Markdown fences, prefix it with "Here is the
//! result:" or append commentary. The scanner walks the text once, tracking
//! bracket depth outside string literals, and yields the balanced objects
//! and arrays that actually parse.

/// Upper bound on how much of a response is scanned.
pub const MAX_SCAN_BYTES: usize = 1 << 20;

/// Return the first balanced `{...}` or `[...]` span in `text` that parses as JSON.
///
/// Brackets inside string literals (including escaped quotes) are ignored.
/// Spans that balance but fail to parse are skipped in favour of the next
/// span by opening position.
pub fn locate_json(text: &str) -> Option<&str> {
    json_spans(text).next().map(|(span, _)| span)
}

/// Every balanced span that parses as JSON, with its value, ordered by
/// opening position. Outer spans come before the spans they contain.
///
/// Bracket matching is a single pass over at most [`MAX_SCAN_BYTES`].
pub fn json_spans(text: &str) -> impl Iterator<Item = (&str, serde_json::Value)> {
    let limit = floor_char_boundary(text, MAX_SCAN_BYTES);
    let mut spans = balanced_spans(&text.as_bytes()[..limit]);
    spans.sort_unstable_by_key(|&(open, _)| open);
    spans.into_iter().filter_map(move |(open, close)| {
        let candidate = &text[open..=close];
        serde_json::from_str(candidate)
            .ok()
            .map(|value| (candidate, value))
    })
}

/// `(open, close)` byte positions of every matched bracket pair.
///
/// A closing bracket that does not match the innermost open one poisons
/// every bracket still open, so the stack is cleared. Quotes outside any
/// bracket are prose and do not start a string.
fn balanced_spans(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut stack: Vec<(usize, u8)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' if !stack.is_empty() => in_string = true,
            b'{' => stack.push((i, b'}')),
            b'[' => stack.push((i, b']')),
            b'}' | b']' => match stack.pop() {
                Some((open, expected)) if expected == b => spans.push((open, i)),
                Some(_) => stack.clear(),
                None => {}
            },
            _ => {}
        }
    }
    spans
}

fn floor_char_boundary(text: &str, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }
    let mut idx = max;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object() {
        assert_eq!(locate_json(r#"{"R": [], "L": []}"#), Some(r#"{"R": [], "L": []}"#));
    }

    #[test]
    fn fenced_with_commentary() {
        let text = "Sure! Here you go:\n```json\n{\"R\": [], \"L\": []}\n```\nLet me know if you need more.";
        assert_eq!(locate_json(text), Some("{\"R\": [], \"L\": []}"));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = r#"note {"event": "she drew a } and a \" {", "n": [1]} trailing"#;
        assert_eq!(
            locate_json(text),
            Some(r#"{"event": "she drew a } and a \" {", "n": [1]}"#)
        );
    }

    #[test]
    fn top_level_array() {
        assert_eq!(locate_json("result: [1, 2, 3]."), Some("[1, 2, 3]"));
    }

    #[test]
    fn skips_balanced_but_invalid_span() {
        // `{not json}` balances but does not parse; the real object follows.
        let text = "{not json} then {\"ok\": true}";
        assert_eq!(locate_json(text), Some("{\"ok\": true}"));
    }

    #[test]
    fn unbalanced_returns_none() {
        assert_eq!(locate_json("{\"R\": [ {\"E1\": \"A\""), None);
        assert_eq!(locate_json("no json here at all"), None);
        assert_eq!(locate_json(""), None);
    }

    #[test]
    fn mismatched_brackets_fall_through_to_inner_value() {
        assert_eq!(locate_json("{ [1] ]"), Some("[1]"));
    }

    #[test]
    fn later_spans_are_reachable() {
        let spans: Vec<&str> = json_spans("Step [1]: {\"R\": []}").map(|(s, _)| s).collect();
        assert_eq!(spans, ["[1]", "{\"R\": []}", "[]"]);
    }

    #[test]
    fn stray_quote_in_prose_is_ignored() {
        assert_eq!(locate_json("It is 5\" tall: {\"a\": 1}"), Some("{\"a\": 1}"));
    }

    #[test]
    fn unclosed_brackets_scan_in_one_pass() {
        let mut text = "{".repeat(100_000);
        assert_eq!(locate_json(&text), None);
        text.push_str("{\"ok\": true}");
        assert_eq!(locate_json(&text), Some("{\"ok\": true}"));
    }

    #[test]
    fn scan_is_bounded() {
        let mut text = " ".repeat(MAX_SCAN_BYTES);
        text.push_str("{\"late\": 1}");
        assert_eq!(locate_json(&text), None);
    }
}
