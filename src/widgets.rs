//! Weather and stock ticker pass-through clients.

use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::config::WidgetConfig;
use crate::errors::WidgetError;

pub const STOCK_SYMBOLS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "AMZN", "NVDA"];
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature: i64,
    pub location: String,
    pub description: String,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    pub price: String,
    pub change: String,
    pub change_percent: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: CurrentWeatherMain,
    weather: Vec<WeatherCondition>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherCondition {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct GeoPlace {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    quote: Option<GlobalQuote>,
}

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

#[derive(Clone)]
pub struct WidgetClient {
    client: reqwest::Client,
    config: WidgetConfig,
}

impl WidgetClient {
    pub fn new(client: reqwest::Client, config: WidgetConfig) -> Self {
        Self { client, config }
    }

    pub async fn weather(&self, lat: f64, lon: f64) -> Result<WeatherReport, WidgetError> {
        let api_key = self
            .config
            .openweather_api_key
            .as_deref()
            .ok_or(WidgetError::NotConfigured("Weather"))?;

        let current = self
            .current_weather(api_key, lat, lon)
            .await
            .map_err(WidgetError::Weather)?;
        let location = match self.city_name(api_key, lat, lon).await {
            Ok(Some(name)) => name,
            Ok(None) => UNKNOWN_LOCATION.to_string(),
            Err(e) => {
                log::warn!("reverse geocoding failed: {:#}", e);
                UNKNOWN_LOCATION.to_string()
            }
        };

        let condition = current
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WidgetError::Weather(anyhow!("no weather conditions in response")))?;

        Ok(WeatherReport {
            temperature: current.main.temp.round() as i64,
            location,
            description: condition.description,
            icon: condition.icon,
        })
    }

    async fn current_weather(&self, api_key: &str, lat: f64, lon: f64) -> Result<CurrentWeather> {
        let url = format!("{}/data/2.5/weather", self.config.openweather_url);
        let lat = lat.to_string();
        let lon = lon.to_string();
        let response = self
            .client
            .get(url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "imperial"),
            ])
            .send()
            .await
            .context("Weather service unavailable")?
            .error_for_status()
            .context("Weather service unavailable")?;

        response
            .json()
            .await
            .context("Failed to parse weather response")
    }

    async fn city_name(&self, api_key: &str, lat: f64, lon: f64) -> Result<Option<String>> {
        let url = format!("{}/geo/1.0/reverse", self.config.openweather_url);
        let lat = lat.to_string();
        let lon = lon.to_string();
        let places: Vec<GeoPlace> = self
            .client
            .get(url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("limit", "1"),
                ("appid", api_key),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(places
            .into_iter()
            .next()
            .and_then(|p| p.name)
            .filter(|name| !name.trim().is_empty()))
    }

    /// Quotes for [`STOCK_SYMBOLS`], fetched concurrently. Failed symbols are skipped.
    pub async fn stocks(&self) -> Result<Vec<StockQuote>, WidgetError> {
        let api_key = self
            .config
            .alpha_vantage_api_key
            .as_deref()
            .ok_or(WidgetError::NotConfigured("Stock"))?;

        let quotes = join_all(
            STOCK_SYMBOLS
                .iter()
                .map(|symbol| self.stock_quote(api_key, symbol)),
        )
        .await;

        let quotes: Vec<StockQuote> = quotes
            .into_iter()
            .zip(STOCK_SYMBOLS)
            .filter_map(|(quote, symbol)| match quote {
                Ok(quote) => Some(quote),
                Err(e) => {
                    log::error!("error fetching {symbol}: {:#}", e);
                    None
                }
            })
            .collect();

        if quotes.is_empty() {
            return Err(WidgetError::NoQuotes);
        }
        Ok(quotes)
    }

    async fn stock_quote(&self, api_key: &str, symbol: &str) -> Result<StockQuote> {
        let response: GlobalQuoteResponse = self
            .client
            .get(&self.config.alpha_vantage_url)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", symbol),
                ("apikey", api_key),
            ])
            .send()
            .await
            .context("Stock service unavailable")?
            .error_for_status()
            .context("Stock service unavailable")?
            .json()
            .await
            .context("Failed to parse stock response")?;

        to_stock_quote(symbol, response.quote.ok_or_else(|| anyhow!("Invalid stock data"))?)
    }
}

fn to_stock_quote(symbol: &str, quote: GlobalQuote) -> Result<StockQuote> {
    let price: f64 = quote
        .price
        .ok_or_else(|| anyhow!("Invalid stock data"))?
        .trim()
        .parse()
        .context("Invalid stock price")?;
    let change: f64 = quote
        .change
        .as_deref()
        .unwrap_or("0")
        .trim()
        .parse()
        .context("Invalid stock change")?;
    let change_percent = quote
        .change_percent
        .unwrap_or_default()
        .replace('%', "");

    Ok(StockQuote {
        symbol: symbol.to_string(),
        price: format!("{price:.2}"),
        change: format!("{change:.2}"),
        change_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_quote_formatting() {
        let body = r#"{"Global Quote": {
            "01. symbol": "AAPL",
            "05. price": "189.8400",
            "09. change": "-1.2700",
            "10. change percent": "-0.6620%"
        }}"#;
        let response: GlobalQuoteResponse = serde_json::from_str(body).unwrap();
        let quote = to_stock_quote("AAPL", response.quote.unwrap()).unwrap();

        assert_eq!(quote.price, "189.84");
        assert_eq!(quote.change, "-1.27");
        assert_eq!(quote.change_percent, "-0.6620");

        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["changePercent"], "-0.6620");
    }

    #[test]
    fn test_rate_limited_quote_is_rejected() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}"#;
        let response: GlobalQuoteResponse = serde_json::from_str(body).unwrap();
        assert!(response.quote.is_none());
    }

    #[test]
    fn test_quote_without_price_is_rejected() {
        let body = r#"{"Global Quote": {}}"#;
        let response: GlobalQuoteResponse = serde_json::from_str(body).unwrap();
        assert!(to_stock_quote("MSFT", response.quote.unwrap()).is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_widgets() {
        let client = WidgetClient::new(reqwest::Client::new(), WidgetConfig::default());
        assert!(matches!(
            client.weather(40.7, -74.0).await.unwrap_err(),
            WidgetError::NotConfigured("Weather")
        ));
        assert!(matches!(
            client.stocks().await.unwrap_err(),
            WidgetError::NotConfigured("Stock")
        ));
    }
}
