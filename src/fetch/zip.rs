use anyhow::Result;
use rand::Rng;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ZipResponse {
    places: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(rename = "place name")]
    name: String,
    #[serde(rename = "state abbreviation")]
    state: String,
}

const MAX_ATTEMPTS: usize = 10;

/// Try random 5-digit zips against zippopotam.us until one resolves.
/// Returns `(zip, "City, ST")`, or `None` when every attempt missed.
pub async fn random_us_zip(client: &reqwest::Client) -> Result<Option<(String, String)>> {
    for _ in 0..MAX_ATTEMPTS {
        let zip = format!("{:05}", rand::thread_rng().gen_range(10000..=99999));
        let response = match client
            .get(format!("https://api.zippopotam.us/us/{}", zip))
            .send()
            .await
        {
            Ok(response) => response,
            Err(_) => continue,
        };
        if !response.status().is_success() {
            continue;
        }
        let Ok(body) = response.json::<ZipResponse>().await else {
            continue;
        };
        if let Some(place) = body.places.first() {
            return Ok(Some((zip, format!("{}, {}", place.name, place.state))));
        }
    }
    Ok(None)
}
