//! URL normalization helpers.
//!
//! Classification is invariant under `www.` prefixing: both the registrable
//! domain and the normalized URL strip a leading `www.`, keeping every
//! other subdomain intact.

use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::warn;
use url::Url;

/// Extract the registrable domain of a URL.
///
/// Adds a scheme when missing, takes the host, and strips a leading
/// `www.`. Other subdomains are kept intact. Returns an empty string for
/// URLs with no parseable host; callers treat that as "no domain", not as
/// an error.
#[must_use]
pub fn registrable_domain(url: &str) -> String {
    let with_scheme: Cow<'_, str> =
        if url.starts_with("http://") || url.starts_with("https://") {
            Cow::Borrowed(url)
        } else {
            Cow::Owned(format!("https://{url}"))
        };

    match Url::parse(&with_scheme) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.strip_prefix("www.").unwrap_or(host).to_string(),
            None => {
                warn!(url, "URL has no host");
                String::new()
            }
        },
        Err(error) => {
            warn!(url, %error, "failed to parse URL for domain extraction");
            String::new()
        }
    }
}

/// Normalize a URL for rule matching by stripping `www.` after the scheme.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    static WWW_PREFIX: OnceLock<regex::Regex> = OnceLock::new();
    let pattern = WWW_PREFIX.get_or_init(|| {
        regex::RegexBuilder::new(r"^(https?://)www\.")
            .case_insensitive(true)
            .build()
            .expect("valid www-prefix pattern")
    });

    pattern.replace(url, "$1").into_owned()
}
