use anyhow::{Context, Result, bail};
use reqwest::header;

use super::{BROWSER_UA, decode_entities, first_capture};

/// What one scrape of a product page yields. `price` is the raw price text
/// as rendered (e.g. `$39.99`); comparison normalization happens in the
/// tracker, not here.
#[derive(Debug, Clone)]
pub struct ProductSnapshot {
    pub title: String,
    pub price: String,
    pub image: Option<String>,
    pub url: String,
}

pub async fn scrape_product(client: &reqwest::Client, url: &str) -> Result<ProductSnapshot> {
    let response = client
        .get(url)
        .header(header::USER_AGENT, BROWSER_UA)
        .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await
        .context("amazon request failed")?;

    if !response.status().is_success() {
        bail!("amazon returned status {}", response.status());
    }

    let html = response.text().await.context("amazon response unreadable")?;
    extract_product(&html, url).context("product page missing title or price")
}

/// Pull title, price and image out of a product page. Amazon's markup moves
/// around a lot; the title span and the first offscreen price are the
/// stable anchors.
pub fn extract_product(html: &str, url: &str) -> Option<ProductSnapshot> {
    let title = first_capture(html, r#"(?s)id="productTitle"[^>]*>([^<]+)<"#)
        .map(|t| decode_entities(t.trim()))
        .filter(|t| !t.is_empty())?;
    let price = first_capture(html, r#"class="a-offscreen">([^<]+)<"#)
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())?;
    let image = first_capture(html, r#"(?s)id="landingImage"[^>]*?src="([^"]+)""#)
        .or_else(|| first_capture(html, r#""hiRes":"([^"]+)""#));

    Some(ProductSnapshot {
        title,
        price,
        image,
        url: url.to_string(),
    })
}

/// Stable key for a product URL: the ASIN when the URL carries one,
/// otherwise the host and path flattened into a single token.
pub fn tracking_key(raw_url: &str) -> String {
    if let Some(asin) = first_capture(raw_url, r"/(?:dp|gp/product)/([A-Z0-9]{10})") {
        return asin;
    }
    match url::Url::parse(raw_url) {
        Ok(parsed) => format!(
            "{}{}",
            parsed.host_str().unwrap_or("unknown"),
            parsed.path()
        )
        .replace(['/', '.'], "-"),
        Err(_) => raw_url.replace(['/', '.', ':'], "-"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <html><body>
        <span id="productTitle" class="a-size-large">  Widget Deluxe &amp; Co  </span>
        <span class="a-price"><span class="a-offscreen">$39.99</span></span>
        <img id="landingImage" data-old-hires="x" src="https://img.example/widget.jpg">
        </body></html>"#;

    #[test]
    fn extracts_title_price_and_image() {
        let snapshot = extract_product(SAMPLE, "https://www.amazon.com/dp/B00TEST123").unwrap();
        assert_eq!(snapshot.title, "Widget Deluxe & Co");
        assert_eq!(snapshot.price, "$39.99");
        assert_eq!(
            snapshot.image.as_deref(),
            Some("https://img.example/widget.jpg")
        );
    }

    #[test]
    fn page_without_price_yields_none() {
        let html = r#"<span id="productTitle">Thing</span>"#;
        assert!(extract_product(html, "https://www.amazon.com/x").is_none());
    }

    #[test]
    fn tracking_key_prefers_the_asin() {
        assert_eq!(
            tracking_key("https://www.amazon.com/Widget/dp/B00TEST123/ref=sr_1_1"),
            "B00TEST123"
        );
        assert_eq!(
            tracking_key("https://www.amazon.com/gp/product/B07XYZABCD?th=1"),
            "B07XYZABCD"
        );
    }

    #[test]
    fn tracking_key_falls_back_to_host_and_path() {
        let key = tracking_key("https://www.amazon.com/some/listing");
        assert_eq!(key, "www-amazon-com-some-listing");
    }
}
