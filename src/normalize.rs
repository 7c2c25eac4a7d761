use url::Url;

const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// Coerces user input into a schemed URL string.
///
/// Input that already parses as an absolute URL is returned unchanged.
/// Everything else gets `https://` prepended; malformed input is left for the
/// fetcher to reject.
pub fn normalize_target_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        return trimmed.to_owned();
    }
    format!("{DEFAULT_SCHEME_PREFIX}{trimmed}")
}

fn has_scheme(input: &str) -> bool {
    let Ok(url) = Url::parse(input) else {
        return false;
    };
    let Some(rest) = input
        .get(url.scheme().len()..)
        .and_then(|rest| rest.strip_prefix(':'))
    else {
        return false;
    };
    if rest.starts_with("//") {
        return true;
    }
    // `localhost:8080` parses with scheme "localhost"; a port is not an opaque path.
    !rest.starts_with(|c: char| c.is_ascii_digit())
}
