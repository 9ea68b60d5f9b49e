use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{Method, Url};
use serde_json::Value;

use super::Client;
use crate::http::HttpAgent;

impl<A: HttpAgent> Client<A> {
    /// Fetches a collection and follows every `next` link.
    ///
    /// Returns the first page with the `results` of all later pages appended.
    /// An error on any page aborts the walk; pages already fetched are dropped.
    #[tracing::instrument(skip(self))]
    pub async fn get_all(&mut self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut response = self.get(path, params).await?;
        let mut next = next_page(&response);
        let mut pages = 1;

        while let Some(link) = next {
            debug!("Following page {} at {}...", pages + 1, link);
            let url = Url::parse(&link).with_context(|| format!("Invalid next page URL: {}", link))?;
            let page = self.dispatch(Method::GET, url, None).await?;
            next = next_page(&page);
            append_results(&mut response, page);
            pages += 1;
        }

        debug!("Fetched {} page(s) from {}", pages, path);
        Ok(response)
    }
}

/// The `next` link of a page, if it is a non-empty string.
fn next_page(page: &Value) -> Option<String> {
    page.get("next")
        .and_then(Value::as_str)
        .filter(|link| !link.is_empty())
        .map(str::to_string)
}

fn append_results(target: &mut Value, page: Value) {
    let items = match page {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(items)) => items,
            _ => return,
        },
        _ => return,
    };

    let Some(target) = target.as_object_mut() else {
        warn!("First page is not an object; dropping {} result(s)", items.len());
        return;
    };

    let results = target
        .entry("results")
        .or_insert_with(|| Value::Array(Vec::new()));
    if results.is_null() {
        *results = Value::Array(Vec::new());
    }
    match results {
        Value::Array(existing) => existing.extend(items),
        _ => warn!("`results` is not an array; dropping {} result(s)", items.len()),
    }
}
