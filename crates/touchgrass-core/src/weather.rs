//! Weather collaborator contract.
//!
//! Weather only ever enables extra recommendation rules, so every failure
//! mode (no location, fetch error, timeout) collapses to `None`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Upper bound on a single weather fetch.
pub const WEATHER_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a fetched snapshot is reused.
pub const WEATHER_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
    Fog,
    Windy,
    Drizzle,
    Rain,
    HeavyRain,
    Thunderstorm,
    Snow,
}

impl WeatherCondition {
    /// Any falling water or snow.
    pub fn is_wet(self) -> bool {
        matches!(
            self,
            WeatherCondition::Drizzle
                | WeatherCondition::Rain
                | WeatherCondition::HeavyRain
                | WeatherCondition::Thunderstorm
                | WeatherCondition::Snow
        )
    }

    pub fn is_severe(self) -> bool {
        matches!(
            self,
            WeatherCondition::HeavyRain | WeatherCondition::Thunderstorm | WeatherCondition::Snow
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::PartlyCloudy => "partly cloudy",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Fog => "foggy",
            WeatherCondition::Windy => "windy",
            WeatherCondition::Drizzle => "drizzling",
            WeatherCondition::Rain => "raining",
            WeatherCondition::HeavyRain => "pouring",
            WeatherCondition::Thunderstorm => "stormy",
            WeatherCondition::Snow => "snowing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_f: f64,
    pub condition: WeatherCondition,
    pub is_daylight: bool,
}

impl WeatherSnapshot {
    /// 50-80°F, dry, daylight.
    pub fn is_ideal_for_outdoor(&self) -> bool {
        (50.0..=80.0).contains(&self.temperature_f) && !self.condition.is_wet() && self.is_daylight
    }

    /// 40-85°F, no heavy rain or snow, daylight.
    pub fn is_acceptable_for_outdoor(&self) -> bool {
        (40.0..=85.0).contains(&self.temperature_f)
            && !self.condition.is_severe()
            && self.is_daylight
    }
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self) -> Option<WeatherSnapshot>;
}

/// Source used when location or weather access is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWeather;

#[async_trait]
impl WeatherSource for NoWeather {
    async fn current_weather(&self) -> Option<WeatherSnapshot> {
        None
    }
}

/// Source that always reports the same conditions.
#[derive(Debug, Clone, Copy)]
pub struct FixedWeather(pub WeatherSnapshot);

#[async_trait]
impl WeatherSource for FixedWeather {
    async fn current_weather(&self) -> Option<WeatherSnapshot> {
        Some(self.0)
    }
}

/// Fetch weather, giving up after `timeout`. The in-flight request is
/// dropped, not cancelled upstream.
pub async fn fetch_weather_with_timeout(
    source: &dyn WeatherSource,
    timeout: Duration,
) -> Option<WeatherSnapshot> {
    match tokio::time::timeout(timeout, source.current_weather()).await {
        Ok(snapshot) => snapshot,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "weather fetch timed out");
            None
        }
    }
}

/// Caches the last successful fetch for [`WEATHER_CACHE_TTL`].
pub struct WeatherCache {
    source: Arc<dyn WeatherSource>,
    ttl: Duration,
    timeout: Duration,
    cached: Option<(Instant, WeatherSnapshot)>,
}

impl WeatherCache {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            ttl: WEATHER_CACHE_TTL,
            timeout: WEATHER_TIMEOUT,
            cached: None,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Cached snapshot if still fresh, otherwise a bounded fetch.
    /// Failed fetches are not cached.
    pub async fn current(&mut self) -> Option<WeatherSnapshot> {
        let now = Instant::now();
        if let Some((fetched_at, snapshot)) = self.cached {
            if now.duration_since(fetched_at) < self.ttl {
                return Some(snapshot);
            }
        }

        let fetched = fetch_weather_with_timeout(self.source.as_ref(), self.timeout).await;
        match fetched {
            Some(snapshot) => {
                debug!(temperature_f = snapshot.temperature_f, "weather refreshed");
                self.cached = Some((now, snapshot));
            }
            None => self.cached = None,
        }
        fetched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn snapshot(temperature_f: f64, condition: WeatherCondition, is_daylight: bool) -> WeatherSnapshot {
        WeatherSnapshot {
            temperature_f,
            condition,
            is_daylight,
        }
    }

    struct SlowWeather;

    #[async_trait]
    impl WeatherSource for SlowWeather {
        async fn current_weather(&self) -> Option<WeatherSnapshot> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Some(snapshot(70.0, WeatherCondition::Clear, true))
        }
    }

    struct CountingWeather(AtomicUsize);

    #[async_trait]
    impl WeatherSource for CountingWeather {
        async fn current_weather(&self) -> Option<WeatherSnapshot> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(snapshot(65.0, WeatherCondition::PartlyCloudy, true))
        }
    }

    #[test]
    fn ideal_weather_bounds() {
        assert!(snapshot(50.0, WeatherCondition::Clear, true).is_ideal_for_outdoor());
        assert!(snapshot(80.0, WeatherCondition::Cloudy, true).is_ideal_for_outdoor());
        assert!(!snapshot(81.0, WeatherCondition::Clear, true).is_ideal_for_outdoor());
        assert!(!snapshot(70.0, WeatherCondition::Drizzle, true).is_ideal_for_outdoor());
        assert!(!snapshot(70.0, WeatherCondition::Clear, false).is_ideal_for_outdoor());
    }

    #[test]
    fn acceptable_weather_tolerates_light_rain() {
        assert!(snapshot(45.0, WeatherCondition::Drizzle, true).is_acceptable_for_outdoor());
        assert!(snapshot(85.0, WeatherCondition::Rain, true).is_acceptable_for_outdoor());
        assert!(!snapshot(60.0, WeatherCondition::HeavyRain, true).is_acceptable_for_outdoor());
        assert!(!snapshot(35.0, WeatherCondition::Clear, true).is_acceptable_for_outdoor());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_source_falls_back_to_none() {
        let result = fetch_weather_with_timeout(&SlowWeather, WEATHER_TIMEOUT).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unavailable_source_yields_none() {
        assert!(fetch_weather_with_timeout(&NoWeather, WEATHER_TIMEOUT).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cache_reuses_fresh_snapshot() {
        let source = Arc::new(CountingWeather(AtomicUsize::new(0)));
        let mut cache = WeatherCache::new(source.clone());

        assert!(cache.current().await.is_some());
        assert!(cache.current().await.is_some());
        assert_eq!(source.0.load(Ordering::SeqCst), 1);

        tokio::time::advance(WEATHER_CACHE_TTL).await;
        assert!(cache.current().await.is_some());
        assert_eq!(source.0.load(Ordering::SeqCst), 2);
    }
}
