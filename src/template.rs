//! Template variable substitution
//!
//! Replaces `{{NAME}}` tokens with values from the active environment.
//! Unknown tokens are left verbatim; substitution never mutates the stored
//! request, it is applied to a copy immediately before dispatch.

use crate::models::{KeyValue, SavedRequest};

/// Substitute `{{NAME}}` tokens in `text`. NAME is any run of characters
/// other than `}`, with surrounding whitespace trimmed. Exact key match,
/// first match wins.
pub fn resolve(text: &str, variables: &[KeyValue]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            // Not a token if a stray '}' appears inside the name
            Some(end) if !after[..end].contains('}') => {
                let name = after[..end].trim();
                match variables.iter().find(|v| v.key == name) {
                    Some(var) => out.push_str(&var.value),
                    None => out.push_str(&rest[start..start + end + 4]),
                }
                rest = &after[end + 2..];
            }
            _ => {
                out.push_str("{{");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Apply substitution to every templated part of a request: URL, header
/// values, body, and query parameter values. Keys are not substituted.
pub fn resolve_request(request: &SavedRequest, variables: &[KeyValue]) -> SavedRequest {
    let mut resolved = request.clone();
    resolved.url = resolve(&request.url, variables);
    resolved.body = resolve(&request.body, variables);
    for header in &mut resolved.headers {
        header.value = resolve(&header.value, variables);
    }
    for param in &mut resolved.query_params {
        param.value = resolve(&param.value, variables);
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<KeyValue> {
        pairs.iter().map(|(k, v)| KeyValue::new(*k, *v)).collect()
    }

    #[test]
    fn substitutes_known_tokens() {
        let v = vars(&[("A", "x"), ("B", "y")]);
        assert_eq!(resolve("{{A}}/{{B}}", &v), "x/y");
    }

    #[test]
    fn unknown_token_left_verbatim() {
        assert_eq!(resolve("{{MISSING}}", &[]), "{{MISSING}}");
    }

    #[test]
    fn trims_whitespace_inside_token() {
        let v = vars(&[("HOST", "api.example.com")]);
        assert_eq!(resolve("https://{{ HOST }}/v1", &v), "https://api.example.com/v1");
    }

    #[test]
    fn first_match_wins_on_duplicates() {
        let v = vars(&[("K", "first"), ("K", "second")]);
        assert_eq!(resolve("{{K}}", &v), "first");
    }

    #[test]
    fn idempotent_when_values_contain_no_tokens() {
        let v = vars(&[("A", "x")]);
        let once = resolve("{{A}} and {{GONE}}", &v);
        assert_eq!(resolve(&once, &v), once);
    }

    #[test]
    fn unterminated_braces_pass_through() {
        let v = vars(&[("A", "x")]);
        assert_eq!(resolve("{{A", &v), "{{A");
        assert_eq!(resolve("{{a}b}} tail", &v), "{{a}b}} tail");
    }

    #[test]
    fn resolve_request_leaves_original_untouched() {
        let v = vars(&[("TOKEN", "abc"), ("HOST", "h")]);
        let mut req = SavedRequest::default();
        req.url = String::from("https://{{HOST}}/users");
        req.headers = vec![KeyValue::new("Authorization", "Bearer {{TOKEN}}")];
        req.query_params = vec![KeyValue::new("t", "{{TOKEN}}")];
        req.body = String::from("{\"token\":\"{{TOKEN}}\"}");

        let resolved = resolve_request(&req, &v);
        assert_eq!(resolved.url, "https://h/users");
        assert_eq!(resolved.headers[0].value, "Bearer abc");
        assert_eq!(resolved.query_params[0].value, "abc");
        assert_eq!(resolved.body, "{\"token\":\"abc\"}");
        // stored request unchanged
        assert_eq!(req.url, "https://{{HOST}}/users");
        assert_eq!(req.headers[0].value, "Bearer {{TOKEN}}");
    }
}
