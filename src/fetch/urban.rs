use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct UrbanEntry {
    pub word: String,
    pub definition: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub thumbs_up: i64,
    #[serde(default)]
    pub thumbs_down: i64,
    #[serde(default)]
    pub permalink: String,
}

#[derive(Debug, Deserialize)]
struct UrbanResponse {
    list: Vec<UrbanEntry>,
}

/// Top Urban Dictionary definition for a term; `None` when the term has no
/// entries at all.
pub async fn define(client: &reqwest::Client, term: &str) -> Result<Option<UrbanEntry>> {
    let url = format!(
        "https://api.urbandictionary.com/v0/define?term={}",
        urlencoding::encode(term)
    );
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        bail!("urban dictionary returned status {}", response.status());
    }
    let body: UrbanResponse = response.json().await?;
    Ok(body.list.into_iter().next())
}
