//! Pagination link extraction

use reqwest::header::LINK;

use super::ResponseMetadata;

/// Next-page information extracted from a response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paging {
    /// URL of the next page, if any
    pub next: Option<String>,
}

/// Extracts the next-page link from a paginated REST response
pub trait Pager: Send + Sync {
    /// Parse pagination info out of response metadata
    fn parse(&self, metadata: &ResponseMetadata) -> Paging;
}

/// Pager reading RFC 8288 `Link` headers, e.g.
/// `<https://api.newrelic.com/v2/alerts_policies.json?page=2>; rel="next"`
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkHeaderPager;

impl Pager for LinkHeaderPager {
    fn parse(&self, metadata: &ResponseMetadata) -> Paging {
        let next = metadata
            .headers
            .get_all(LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .find_map(next_link);

        Paging { next }
    }
}

fn next_link(entry: &str) -> Option<String> {
    let mut parts = entry.split(';');
    let url = parts
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;

    let is_next = parts
        .filter_map(|param| param.split_once('='))
        .any(|(key, value)| {
            key.trim().eq_ignore_ascii_case("rel")
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel.eq_ignore_ascii_case("next"))
        });

    (is_next && !url.is_empty()).then(|| url.to_string())
}
