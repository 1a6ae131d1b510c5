use url::Url;

/// Candle interval granularity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interval {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    OneDay,
}

impl Interval {
    fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::OneHour => "1h",
            Self::OneDay => "1d",
        }
    }
}

/// Query filters for candle requests.
///
/// Built once with the `with_*` mutators and applied to the request URL
/// before the call; applying the same query twice to different URLs yields
/// the same parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandleQuery {
    interval: Option<Interval>,
    start: Option<String>,
    end: Option<String>,
    limit: Option<u32>,
}

impl CandleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bar granularity.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Sets the inclusive range start (RFC 3339 timestamp).
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Sets the exclusive range end (RFC 3339 timestamp).
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Caps the number of returned bars.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn apply(&self, url: &mut Url) {
        let mut query = url.query_pairs_mut();
        if let Some(interval) = self.interval {
            query.append_pair("interval", interval.as_str());
        }
        if let Some(start) = &self.start {
            query.append_pair("start", start);
        }
        if let Some(end) = &self.end {
            query.append_pair("end", end);
        }
        if let Some(limit) = self.limit {
            query.append_pair("limit", &limit.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{CandleQuery, Interval};

    #[test]
    fn set_filters_are_appended_as_query_pairs() {
        let mut url = Url::parse("https://api.example.com/v1/candles/AAPL").expect("valid url");
        CandleQuery::new()
            .with_interval(Interval::OneHour)
            .with_start("2026-01-02T00:00:00Z")
            .with_limit(50)
            .apply(&mut url);
        let query = url.query().expect("query set");
        assert!(query.contains("interval=1h"));
        assert!(query.contains("start=2026-01-02T00%3A00%3A00Z"));
        assert!(query.contains("limit=50"));
        assert!(!query.contains("end="));
    }

    #[test]
    fn empty_query_adds_no_pairs() {
        let mut url = Url::parse("https://api.example.com/v1/candles/AAPL").expect("valid url");
        CandleQuery::new().apply(&mut url);
        assert_eq!(url.query(), Some(""));
    }
}
