use std::collections::BTreeMap;

use reqwest::header::{HeaderMap, HeaderValue};

/// Uniform view over the two header shapes the engine meets: a typed
/// [`HeaderMap`] from a live response and a plain string map from
/// configuration. Lookup is case-insensitive in both variants and extraction
/// never fails; values that are not valid UTF-8 render lossily.
#[derive(Debug, Clone, Copy)]
pub enum HeaderSource<'headers> {
    Typed(&'headers HeaderMap),
    Plain(&'headers BTreeMap<String, String>),
}

impl HeaderSource<'_> {
    /// Case-insensitive single-header lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        match self {
            HeaderSource::Typed(map) => map.get(name).map(render_value),
            HeaderSource::Plain(map) => map
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.clone()),
        }
    }

    /// All header pairs as a plain string map.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        match self {
            HeaderSource::Typed(map) => map
                .iter()
                .map(|(name, value)| (name.as_str().to_owned(), render_value(value)))
                .collect(),
            HeaderSource::Plain(map) => (*map).clone(),
        }
    }
}

fn render_value(value: &HeaderValue) -> String {
    value.to_str().map_or_else(
        |_| String::from_utf8_lossy(value.as_bytes()).into_owned(),
        ToOwned::to_owned,
    )
}
