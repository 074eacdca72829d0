use anyhow::Result;
use reqwest::header;

use super::{BROWSER_UA, decode_entities, first_capture};

#[derive(Debug, Clone)]
pub struct Card {
    pub name: String,
    pub image: Option<String>,
}

const RANDOM_PAGE: &str = "https://starwarscardtrader.fandom.com/wiki/Special:Random";
const MAX_ATTEMPTS: usize = 10;

/// Roll the wiki's random-page endpoint until it lands on a card page
/// (identified by its infobox). `None` when every attempt hit a non-card
/// page.
pub async fn random_card(client: &reqwest::Client) -> Result<Option<Card>> {
    for _ in 0..MAX_ATTEMPTS {
        let response = client
            .get(RANDOM_PAGE)
            .header(header::USER_AGENT, BROWSER_UA)
            .send()
            .await?;
        if !response.status().is_success() {
            continue;
        }
        let html = response.text().await?;
        if let Some(card) = extract_card(&html) {
            return Ok(Some(card));
        }
    }
    Ok(None)
}

pub fn extract_card(html: &str) -> Option<Card> {
    // Only card pages carry the portable infobox.
    if !html.contains("portable-infobox") {
        return None;
    }
    let name = first_capture(html, r#"<h2[^>]*pi-title[^>]*>([^<]+)</h2>"#)
        .map(|n| decode_entities(n.trim()))
        .filter(|n| !n.is_empty())?;
    let image = first_capture(html, r#"(?s)pi-image[^>]*>.*?<img[^>]+src="([^"]+)""#);
    Some(Card { name, image })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_card_from_an_infobox_page() {
        let html = r##"
            <aside class="portable-infobox pi-theme-card">
            <h2 class="pi-item pi-title">Darth Vader &#39;s Saber</h2>
            <figure class="pi-item pi-image"><a href="#"><img src="https://img.example/card.png"></a></figure>
            </aside>"##;
        let card = extract_card(html).unwrap();
        assert_eq!(card.name, "Darth Vader 's Saber");
        assert_eq!(card.image.as_deref(), Some("https://img.example/card.png"));
    }

    #[test]
    fn non_card_pages_are_rejected() {
        assert!(extract_card("<html><body>Community portal</body></html>").is_none());
    }
}
