use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

pub async fn random_joke(client: &reqwest::Client) -> Result<Joke> {
    let response = client
        .get("https://official-joke-api.appspot.com/random_joke")
        .send()
        .await?;
    if !response.status().is_success() {
        bail!("joke api returned status {}", response.status());
    }
    let joke: Joke = response.json().await?;
    if joke.setup.is_empty() {
        bail!("joke api returned an empty joke");
    }
    Ok(joke)
}
