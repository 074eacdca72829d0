use anyhow::{Result, bail};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct DogApiResponse {
    status: String,
    message: String,
}

/// Random dog picture from dog.ceo. Returns the image URL.
pub async fn random_image(client: &reqwest::Client) -> Result<String> {
    let response = client
        .get("https://dog.ceo/api/breeds/image/random")
        .send()
        .await?;
    if !response.status().is_success() {
        bail!("dog.ceo returned status {}", response.status());
    }
    let body: DogApiResponse = response.json().await?;
    if body.status != "success" || body.message.is_empty() {
        bail!("dog.ceo returned an unexpected payload");
    }
    Ok(body.message)
}
