use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
}

/// Raw query string for `/weather`; coordinates are parsed by the handler.
#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl WeatherParams {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.lat.as_deref()?.trim().parse::<f64>().ok()?;
        let lon = self.lon.as_deref()?.trim().parse::<f64>().ok()?;
        (lat.is_finite() && lon.is_finite()).then_some((lat, lon))
    }
}
