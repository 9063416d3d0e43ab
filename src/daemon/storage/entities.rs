use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    ScreenCapture,
}

/// One observation of what the user was doing. Each sample stands for a whole sampling period.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct ActivitySample {
    pub timestamp: DateTime<Utc>,
    pub description: String,
    pub kind: SampleKind,
    #[serde(with = "duration_ser")]
    pub duration: Duration,
}

impl ActivitySample {
    pub fn duration_minutes(&self) -> f64 {
        self.duration.num_seconds() as f64 / 60.
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp + self.duration
    }
}

/// A non-empty run of samples handed to a summarizer in one go.
#[derive(PartialEq, Eq, Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SampleWindow(Vec<ActivitySample>);

impl SampleWindow {
    pub fn new(samples: Vec<ActivitySample>) -> Option<Self> {
        if samples.is_empty() {
            None
        } else {
            Some(Self(samples))
        }
    }

    pub fn samples(&self) -> &[ActivitySample] {
        &self.0
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Earliest sample timestamp, whatever order the samples are in.
    pub fn start(&self) -> DateTime<Utc> {
        self.0
            .iter()
            .map(|sample| sample.timestamp)
            .fold(self.0[0].timestamp, DateTime::min)
    }

    /// Latest sample end.
    pub fn end(&self) -> DateTime<Utc> {
        self.0
            .iter()
            .map(ActivitySample::end)
            .fold(self.0[0].end(), DateTime::max)
    }

    pub fn total_duration(&self) -> Duration {
        self.0
            .iter()
            .fold(Duration::zero(), |sum, sample| sum + sample.duration)
    }
}

/// What gets stored for every window the summarizer managed to describe.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct WindowSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub sample_count: usize,
    #[serde(with = "duration_ser")]
    pub duration: Duration,
    pub text: String,
}

impl WindowSummary {
    pub fn new(window: &SampleWindow, text: String) -> Self {
        Self {
            start: window.start(),
            end: window.end(),
            sample_count: window.len(),
            duration: window.total_duration(),
            text,
        }
    }
}

mod duration_ser {
    use chrono::Duration;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(s))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use super::{ActivitySample, SampleKind, SampleWindow, WindowSummary};

    const TEST_START_DATE: NaiveDateTime =
        NaiveDateTime::new(NaiveDate::from_ymd_opt(2018, 7, 4).unwrap(), NaiveTime::MIN);

    fn sample(minute: i64) -> ActivitySample {
        ActivitySample {
            timestamp: Utc.from_utc_datetime(&TEST_START_DATE) + Duration::minutes(minute),
            description: format!("minute {minute}"),
            kind: SampleKind::ScreenCapture,
            duration: Duration::minutes(1),
        }
    }

    #[test]
    fn test_empty_window_is_rejected() {
        assert!(SampleWindow::new(vec![]).is_none());
    }

    #[test]
    fn test_summary_spans_the_window() {
        let window = SampleWindow::new(vec![sample(0), sample(1), sample(2)]).unwrap();
        let summary = WindowSummary::new(&window, "Reviewed ledgers".into());

        assert_eq!(summary.start, Utc.from_utc_datetime(&TEST_START_DATE));
        assert_eq!(
            summary.end,
            Utc.from_utc_datetime(&TEST_START_DATE) + Duration::minutes(3)
        );
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.duration, Duration::minutes(3));
    }

    #[test]
    fn test_summary_span_ignores_sample_order() {
        let window = SampleWindow::new(vec![sample(4), sample(1), sample(9), sample(2)]).unwrap();
        let summary = WindowSummary::new(&window, "Reviewed ledgers".into());

        assert_eq!(
            summary.start,
            Utc.from_utc_datetime(&TEST_START_DATE) + Duration::minutes(1)
        );
        assert_eq!(
            summary.end,
            Utc.from_utc_datetime(&TEST_START_DATE) + Duration::minutes(10)
        );
        assert_eq!(summary.duration, Duration::minutes(4));
    }

    #[test]
    fn test_sample_serializes_duration_as_seconds() {
        let value = serde_json::to_value(sample(0)).unwrap();
        assert_eq!(value["duration"], 60);
        assert_eq!(value["kind"], "screen_capture");
        assert_eq!(sample(0).duration_minutes(), 1.);
    }
}
