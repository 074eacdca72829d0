use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: i64,
    pub pressure: i64,
}

#[derive(Debug, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct Current {
    pub name: String,
    pub weather: Vec<Condition>,
    pub main: Readings,
    pub wind: Wind,
    #[serde(default)]
    pub visibility: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotMain {
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Slot {
    pub dt: i64,
    pub main: SlotMain,
    pub weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct City {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Forecast {
    pub city: City,
    pub list: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub min_c: f64,
    pub max_c: f64,
    pub description: String,
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{}@2x.png", icon)
}

pub fn c_to_f(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub async fn current(client: &reqwest::Client, api_key: &str, zip: &str) -> Result<Current> {
    let url = format!(
        "https://api.openweathermap.org/data/2.5/weather?zip={},us&appid={}&units=metric",
        urlencoding::encode(zip),
        api_key
    );
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        bail!("openweathermap returned status {}", response.status());
    }
    Ok(response.json().await?)
}

pub async fn forecast(client: &reqwest::Client, api_key: &str, zip: &str) -> Result<Forecast> {
    let url = format!(
        "https://api.openweathermap.org/data/2.5/forecast?zip={},us&appid={}&units=metric",
        urlencoding::encode(zip),
        api_key
    );
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        bail!("openweathermap returned status {}", response.status());
    }
    Ok(response.json().await?)
}

/// Collapse the API's 3-hourly forecast slots into at most `days` daily
/// summaries, keeping the min/max across each day and the first slot's
/// description.
pub fn summarize_days(slots: &[Slot], days: usize) -> Vec<DaySummary> {
    let mut by_day: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    for slot in slots {
        let Some(ts) = DateTime::from_timestamp(slot.dt, 0) else {
            continue;
        };
        let date = ts.date_naive();
        let description = slot
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_default();
        by_day
            .entry(date)
            .and_modify(|day| {
                day.min_c = day.min_c.min(slot.main.temp_min);
                day.max_c = day.max_c.max(slot.main.temp_max);
            })
            .or_insert(DaySummary {
                date,
                min_c: slot.main.temp_min,
                max_c: slot.main.temp_max,
                description,
            });
    }
    by_day.into_values().take(days).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(dt: i64, min: f64, max: f64, desc: &str) -> Slot {
        Slot {
            dt,
            main: SlotMain {
                temp_min: min,
                temp_max: max,
            },
            weather: vec![Condition {
                description: desc.to_string(),
                icon: "01d".to_string(),
            }],
        }
    }

    #[test]
    fn celsius_to_fahrenheit() {
        assert_eq!(c_to_f(0.0), 32.0);
        assert_eq!(c_to_f(100.0), 212.0);
    }

    #[test]
    fn summarize_groups_slots_by_day() {
        const DAY: i64 = 86_400;
        let slots = vec![
            slot(0, 5.0, 9.0, "rain"),
            slot(3 * 3600, 3.0, 12.0, "clouds"),
            slot(DAY, 1.0, 7.0, "snow"),
        ];
        let days = summarize_days(&slots, 5);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].min_c, 3.0);
        assert_eq!(days[0].max_c, 12.0);
        assert_eq!(days[0].description, "rain");
        assert_eq!(days[1].description, "snow");
    }

    #[test]
    fn summarize_caps_the_number_of_days() {
        const DAY: i64 = 86_400;
        let slots: Vec<Slot> = (0..8).map(|i| slot(i * DAY, 0.0, 1.0, "clear")).collect();
        assert_eq!(summarize_days(&slots, 5).len(), 5);
    }
}
