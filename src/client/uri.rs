use anyhow::{Context, Result};
use reqwest::Url;

/// Parses the API origin, making sure relative paths join beneath it.
pub fn parse_base(api_url: &str) -> Result<Url> {
    let mut base = Url::parse(api_url).with_context(|| format!("Invalid API URL: {}", api_url))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Joins `path` onto `base` and appends `params` as a form-encoded query.
///
/// The path is not validated; a bad path surfaces as an HTTP error later.
pub fn build_uri(base: &Url, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = base
        .join(path)
        .with_context(|| format!("Invalid request path: {}", path))?;
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}
