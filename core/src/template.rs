//! `{{placeholder}}` expansion for url templates.
//!
//! Parameters whose name appears as a placeholder are consumed as path
//! segments; everything else is left over for the query string. A parameter
//! without a matching placeholder is not an error.

use crate::error::ApiError;
use crate::types::{ParamValue, Params};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Result of expanding a url template.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub url: String,
    /// Parameters no placeholder consumed.
    pub remaining: Params,
}

/// The placeholder token for `name`.
pub fn placeholder(name: &str) -> String {
    format!("{OPEN}{name}{CLOSE}")
}

/// Whether `text` contains the placeholder token for `name`.
pub fn check_placeholder(name: &str, text: &str) -> bool {
    text.contains(&placeholder(name))
}

/// Expand every placeholder in `template` that has a value in `params`.
///
/// Substitution is a single left-to-right pass, so substituted values are
/// never re-scanned and repeated tokens are all replaced. A `{{` that does not
/// open a known `{{name}}` token is copied one brace at a time, so stray or
/// doubled braces never hide a token that follows them.
pub fn resolve(template: &str, params: &Params) -> Resolved {
    let mut url = String::with_capacity(template.len());
    let mut consumed: Vec<&str> = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        url.push_str(&rest[..start]);
        let candidate = &rest[start..];
        match token_at(candidate, params) {
            Some((name, value)) => {
                url.push_str(&value.to_string());
                consumed.push(name);
                rest = &candidate[OPEN.len() + name.len() + CLOSE.len()..];
            }
            None => {
                url.push('{');
                rest = &candidate[1..];
            }
        }
    }
    url.push_str(rest);

    let remaining = params
        .iter()
        .filter(|(key, _)| !consumed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Resolved { url, remaining }
}

/// The parameter whose `{{name}}` token starts `text`, if any.
fn token_at<'p>(text: &str, params: &'p Params) -> Option<(&'p str, &'p ParamValue)> {
    let inner = text.strip_prefix(OPEN)?;
    params.iter().find_map(|(name, value)| {
        inner
            .strip_prefix(name.as_str())
            .filter(|after| after.starts_with(CLOSE))
            .map(|_| (name.as_str(), value))
    })
}

/// Expand placeholders and discard the leftover parameters.
pub fn populate(template: &str, params: &Params) -> String {
    resolve(template, params).url
}

/// Form-encode `params` as `?k=v&...`, or an empty string when there are none.
pub fn to_query_string(params: &Params) -> Result<String, ApiError> {
    if params.is_empty() {
        return Ok(String::new());
    }
    let pairs: Vec<(&str, String)> = params
        .iter()
        .map(|(key, value)| (key.as_str(), value.to_string()))
        .collect();
    Ok(format!("?{}", serde_urlencoded::to_string(pairs)?))
}

/// Append `params` to `url`, continuing an existing query if there is one.
pub fn append_query(url: &str, params: &Params) -> Result<String, ApiError> {
    let query = to_query_string(params)?;
    if query.is_empty() {
        return Ok(url.to_string());
    }
    if url.contains('?') {
        Ok(format!("{url}&{}", &query[1..]))
    } else {
        Ok(format!("{url}{query}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, ParamValue)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn consumes_matched_and_keeps_the_rest() {
        let p = params(&[("id", 5.into()), ("verbose", true.into())]);
        let resolved = resolve("/users/{{id}}", &p);
        assert_eq!(resolved.url, "/users/5");
        assert_eq!(resolved.remaining, params(&[("verbose", true.into())]));
        assert_eq!(
            append_query(&resolved.url, &resolved.remaining).unwrap(),
            "/users/5?verbose=true"
        );
    }

    #[test]
    fn replaces_repeated_and_multiple_tokens() {
        let p = params(&[("a", "x".into()), ("b", 2.into())]);
        let resolved = resolve("/{{a}}/{{b}}/{{a}}", &p);
        assert_eq!(resolved.url, "/x/2/x");
        assert!(resolved.remaining.is_empty());
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let p = params(&[("a", "{{b}}".into()), ("b", "nope".into())]);
        let resolved = resolve("/{{a}}", &p);
        assert_eq!(resolved.url, "/{{b}}");
        assert_eq!(resolved.remaining, params(&[("b", "nope".into())]));
    }

    #[test]
    fn unknown_and_unterminated_tokens_are_left_alone() {
        let p = params(&[("id", 1.into())]);
        assert_eq!(populate("/{{other}}/{{id}}", &p), "/{{other}}/1");
        assert_eq!(populate("/{{id}}/{{open", &p), "/1/{{open");
    }

    #[test]
    fn stray_braces_do_not_hide_a_later_token() {
        let p = params(&[("id", 5.into())]);
        let resolved = resolve("/{{a/{{id}}", &p);
        assert_eq!(resolved.url, "/{{a/5");
        assert!(resolved.remaining.is_empty());

        let resolved = resolve("/x/{{{id}}}", &p);
        assert_eq!(resolved.url, "/x/{5}");
        assert!(resolved.remaining.is_empty());
    }

    #[test]
    fn resolve_agrees_with_check_placeholder() {
        let p = params(&[("id", 5.into())]);
        for template in ["/{{id}}", "/{{a/{{id}}", "/{{{id}}}", "{{{{id}}}}"] {
            assert!(check_placeholder("id", template));
            assert!(!resolve(template, &p).url.contains("{{id}}"), "{template}");
        }
    }

    #[test]
    fn helpers() {
        assert_eq!(placeholder("id"), "{{id}}");
        assert!(check_placeholder("id", "/users/{{id}}"));
        assert!(!check_placeholder("id", "/users/id"));
    }

    #[test]
    fn query_string_is_encoded_and_sorted() {
        let p = params(&[("q", "a b&c".into()), ("page", 2.into())]);
        assert_eq!(to_query_string(&p).unwrap(), "?page=2&q=a+b%26c");
        assert_eq!(to_query_string(&Params::new()).unwrap(), "");
    }

    #[test]
    fn existing_query_is_continued() {
        let p = params(&[("b", 2.into())]);
        assert_eq!(append_query("/x?a=1", &p).unwrap(), "/x?a=1&b=2");
        assert_eq!(append_query("/x", &Params::new()).unwrap(), "/x");
    }
}
