use std::sync::OnceLock;

use regex::Regex;

/// Scheme (`http`, `https`, `ftp`, `ftps`), host of ASCII alphanumerics, dots,
/// hyphens and underscores (starting and ending alphanumeric), optional port,
/// optional path + query from a restricted character set.
const URL_PATTERN: &str =
    r"^(ht|f)tps?://[0-9a-zA-Z]([-.0-9a-zA-Z_]*[0-9a-zA-Z])*(:[0-9]+)?/?([a-zA-Z0-9.?,'/\\+&%$#_=-]*)?$";

static URL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn url_regex() -> Option<&'static Regex> {
    URL_RE.get_or_init(|| Regex::new(URL_PATTERN).ok()).as_ref()
}

/// Whether `text` looks like a URL we are willing to shorten.
///
/// Never fails: an empty input or a pattern that cannot be compiled both yield `false`.
pub fn is_valid_url(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    url_regex().is_some_and(|re| re.is_match(text))
}
