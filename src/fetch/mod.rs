//! One module per upstream source. Each exposes a typed fetch function and
//! keeps its parsing separate from the network call so the parsers can be
//! tested against canned payloads.

pub mod amazon;
pub mod dog;
pub mod joke;
pub mod swcard;
pub mod urban;
pub mod weather;
pub mod words;
pub mod zip;

use regex::Regex;

/// Desktop user agent for the scraped sources; both Amazon and Fandom serve
/// stripped-down or interstitial pages to unknown clients.
pub(crate) const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) fn first_capture(haystack: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).unwrap();
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Undo the handful of HTML entities that show up in scraped titles.
pub(crate) fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
