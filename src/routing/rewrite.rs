//! Path rewrite module
//!
//! Applies the ordered prefix rewrite table to paths bound for the upstream.

use crate::config::RewriteRule;

/// Find the first rule whose prefix matches the path
pub fn match_rule<'a>(path: &str, rules: &'a [RewriteRule]) -> Option<&'a RewriteRule> {
    rules.iter().find(|rule| path.starts_with(rule.prefix.as_str()))
}

/// Rewrite a path with the first matching rule, leaving it unchanged if none match
///
/// The result always starts with `/`, so stripping `/api` from `/api` yields `/`.
///
/// # Examples
/// ```
/// use devgate::config::RewriteRule;
/// use devgate::routing::rewrite_path;
///
/// let rules = vec![RewriteRule::new("/api", "")];
/// assert_eq!(rewrite_path("/api/users", &rules), "/users");
/// assert_eq!(rewrite_path("/assets/app.js", &rules), "/assets/app.js");
/// ```
pub fn rewrite_path(path: &str, rules: &[RewriteRule]) -> String {
    let Some(rule) = match_rule(path, rules) else {
        return path.to_owned();
    };

    let rewritten = format!("{}{}", rule.replacement, &path[rule.prefix.len()..]);
    if rewritten.starts_with('/') {
        rewritten
    } else {
        format!("/{rewritten}")
    }
}

/// Rewrite the path of a path-and-query, keeping the query string as is
pub fn rewrite_path_and_query(path: &str, query: Option<&str>, rules: &[RewriteRule]) -> String {
    let rewritten = rewrite_path(path, rules);
    match query {
        Some(q) => format!("{rewritten}?{q}"),
        None => rewritten,
    }
}
