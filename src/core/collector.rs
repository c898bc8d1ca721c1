//! On-demand registration check exposed as a Prometheus gauge.
//!
//! Every call to [`Collector::collect`] performs one live fetch of the event
//! page and re-evaluates the status from scratch. A failed fetch is logged
//! and leaves the gauge untouched, so the last successful determination keeps
//! being exported. Until the first success the family has no sample at all.

use crate::adapters::html_to_text;
use crate::core::{ConfigProvider, PageFetcher, RegistrationStatus};
use crate::domain::model::event_path;
use crate::utils::error::{ExporterError, Result};
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts};
use tokio::runtime::Handle;
use url::Url;

pub const METRIC_NAME: &str = "promcon_registration_open";
pub const METRIC_HELP: &str = "PromCon registration open.";
pub const LABEL_NAMES: [&str; 2] = ["year", "location"];

/// `{base_url}/{year}-{lowercase(location)}`. A trailing slash on the base is
/// dropped so it does not produce an empty path segment.
pub fn build_target_url(base_url: &str, year: &str, location: &str) -> Result<Url> {
    let raw = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        event_path(year, location)
    );
    Url::parse(&raw).map_err(|source| ExporterError::TargetUrlError { url: raw, source })
}

pub struct RegistrationCollector<F: PageFetcher, C: ConfigProvider> {
    fetcher: F,
    config: C,
    registration_open: GaugeVec,
    runtime: Handle,
}

impl<F: PageFetcher, C: ConfigProvider> RegistrationCollector<F, C> {
    /// `runtime` drives the async fetch from the synchronous `collect()`.
    /// Scrapes must therefore reach `collect()` from outside async context,
    /// e.g. a `spawn_blocking` worker or a plain thread.
    pub fn new(fetcher: F, config: C, runtime: Handle) -> Result<Self> {
        let registration_open =
            GaugeVec::new(Opts::new(METRIC_NAME, METRIC_HELP), &LABEL_NAMES)?;

        Ok(Self {
            fetcher,
            config,
            registration_open,
            runtime,
        })
    }

    pub fn target_url(&self) -> Result<Url> {
        build_target_url(
            self.config.base_url(),
            self.config.year(),
            self.config.location(),
        )
    }

    /// Fetch the page and classify it, without touching the gauge.
    pub fn check(&self) -> Result<RegistrationStatus> {
        let url = self.target_url()?;
        let markup = self.runtime.block_on(self.fetcher.fetch(&url))?;
        let text = html_to_text(&markup);
        Ok(RegistrationStatus::from_page_text(&text, self.config.year()))
    }

    /// One poll: check, then record the outcome on the gauge or log the failure.
    pub fn poll(&self) -> Option<RegistrationStatus> {
        let year = self.config.year();
        let location = self.config.location();

        match self.check() {
            Ok(status) => {
                self.registration_open
                    .with_label_values(&[year, location])
                    .set(status.gauge_value());
                tracing::info!(
                    year,
                    location,
                    status = status.as_str(),
                    "registration for promcon {} in {} is {}",
                    year,
                    location,
                    status
                );
                Some(status)
            }
            Err(e) => {
                let url = self
                    .target_url()
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| self.config.base_url().to_string());
                tracing::error!(
                    url = %url,
                    category = %e.category(),
                    "registration check failed: {}",
                    e
                );
                tracing::debug!("Recovery suggestion: {}", e.recovery_suggestion());
                None
            }
        }
    }
}

impl<F, C> Collector for RegistrationCollector<F, C>
where
    F: PageFetcher + 'static,
    C: ConfigProvider + 'static,
{
    fn desc(&self) -> Vec<&Desc> {
        self.registration_open.desc()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.poll();
        self.registration_open.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::runtime::Runtime;

    const CLOSED_PAGE: &str = r#"<html><body>
        <h1>PromCon 2019</h1>
        <p class="lead">Registration for PromCon 2019 will open soon</p>
    </body></html>"#;

    const OPEN_PAGE: &str = r#"<html><body>
        <h1>PromCon 2019</h1>
        <a href="/register">Register now</a>
    </body></html>"#;

    struct MockConfig {
        base_url: String,
        year: String,
        location: String,
    }

    impl MockConfig {
        fn new(base_url: &str) -> Self {
            Self {
                base_url: base_url.to_string(),
                year: "2019".to_string(),
                location: "Munich".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn base_url(&self) -> &str {
            &self.base_url
        }

        fn year(&self) -> &str {
            &self.year
        }

        fn location(&self) -> &str {
            &self.location
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(1)
        }
    }

    /// Replays scripted responses in order; the last one repeats.
    #[derive(Clone)]
    struct MockFetcher {
        responses: Arc<Mutex<Vec<std::result::Result<String, u16>>>>,
        requested: Arc<Mutex<Vec<String>>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockFetcher {
        fn new(responses: Vec<std::result::Result<&str, u16>>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(
                    responses
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                )),
                requested: Arc::new(Mutex::new(Vec::new())),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &Url) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(url.to_string());

            let next = {
                let mut responses = self.responses.lock().unwrap();
                if responses.len() > 1 {
                    responses.remove(0)
                } else {
                    responses[0].clone()
                }
            };

            next.map_err(|status| ExporterError::UnexpectedStatusError {
                status,
                url: url.to_string(),
            })
        }
    }

    fn collector(
        runtime: &Runtime,
        fetcher: MockFetcher,
    ) -> RegistrationCollector<MockFetcher, MockConfig> {
        RegistrationCollector::new(
            fetcher,
            MockConfig::new("https://promcon.io"),
            runtime.handle().clone(),
        )
        .unwrap()
    }

    /// Gauge value for the configured label pair, if a sample was exported.
    fn exported_value(families: &[MetricFamily]) -> Option<f64> {
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), METRIC_NAME);
        let metrics = families[0].get_metric();
        assert!(metrics.len() <= 1);
        metrics.first().map(|m| {
            let labels: Vec<(&str, &str)> = m
                .get_label()
                .iter()
                .map(|l| (l.get_name(), l.get_value()))
                .collect();
            assert!(labels.contains(&("year", "2019")));
            assert!(labels.contains(&("location", "Munich")));
            m.get_gauge().get_value()
        })
    }

    #[test]
    fn test_build_target_url() {
        let url = build_target_url("https://promcon.io", "2019", "Munich").unwrap();
        assert_eq!(url.as_str(), "https://promcon.io/2019-munich");
    }

    #[test]
    fn test_build_target_url_drops_trailing_slash() {
        let url = build_target_url("https://promcon.io/", "2019", "Munich").unwrap();
        assert_eq!(url.as_str(), "https://promcon.io/2019-munich");
    }

    #[test]
    fn test_build_target_url_rejects_malformed_base() {
        let err = build_target_url("promcon.io", "2019", "Munich").unwrap_err();
        assert!(matches!(err, ExporterError::TargetUrlError { .. }));
    }

    #[test]
    fn test_desc_has_year_and_location_labels_without_fetching() {
        let runtime = Runtime::new().unwrap();
        let fetcher = MockFetcher::new(vec![Ok(OPEN_PAGE)]);
        let collector = collector(&runtime, fetcher.clone());

        let descs = collector.desc();

        assert_eq!(descs.len(), 1);
        assert_eq!(descs[0].fq_name, METRIC_NAME);
        assert_eq!(descs[0].help, METRIC_HELP);
        assert_eq!(descs[0].variable_labels, vec!["year", "location"]);
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_phrase_present_sets_gauge_to_zero() {
        let runtime = Runtime::new().unwrap();
        let collector = collector(&runtime, MockFetcher::new(vec![Ok(CLOSED_PAGE)]));

        let families = collector.collect();

        assert_eq!(exported_value(&families), Some(0.0));
    }

    #[test]
    fn test_phrase_absent_sets_gauge_to_one() {
        let runtime = Runtime::new().unwrap();
        let collector = collector(&runtime, MockFetcher::new(vec![Ok(OPEN_PAGE)]));

        let families = collector.collect();

        assert_eq!(exported_value(&families), Some(1.0));
    }

    #[test]
    fn test_lowercase_phrase_counts_as_open() {
        let runtime = Runtime::new().unwrap();
        let page = "<p>registration for promcon 2019 will open soon</p>";
        let collector = collector(&runtime, MockFetcher::new(vec![Ok(page)]));

        assert_eq!(exported_value(&collector.collect()), Some(1.0));
    }

    #[test]
    fn test_fetch_uses_lowercased_event_url() {
        let runtime = Runtime::new().unwrap();
        let fetcher = MockFetcher::new(vec![Ok(OPEN_PAGE)]);
        let collector = collector(&runtime, fetcher.clone());

        collector.collect();

        let requested = fetcher.requested.lock().unwrap().clone();
        assert_eq!(requested, vec!["https://promcon.io/2019-munich".to_string()]);
    }

    #[test]
    fn test_failure_before_any_success_exports_no_sample() {
        let runtime = Runtime::new().unwrap();
        let collector = collector(&runtime, MockFetcher::new(vec![Err(404)]));

        let families = collector.collect();

        assert_eq!(exported_value(&families), None);
    }

    #[test]
    fn test_failure_holds_last_value() {
        let runtime = Runtime::new().unwrap();
        let collector = collector(
            &runtime,
            MockFetcher::new(vec![Ok(CLOSED_PAGE), Err(404), Err(500)]),
        );

        assert_eq!(exported_value(&collector.collect()), Some(0.0));
        assert_eq!(exported_value(&collector.collect()), Some(0.0));
        assert_eq!(exported_value(&collector.collect()), Some(0.0));
    }

    #[test]
    fn test_each_poll_is_reevaluated() {
        let runtime = Runtime::new().unwrap();
        let collector = collector(
            &runtime,
            MockFetcher::new(vec![Ok(CLOSED_PAGE), Ok(OPEN_PAGE), Ok(CLOSED_PAGE)]),
        );

        assert_eq!(exported_value(&collector.collect()), Some(0.0));
        assert_eq!(exported_value(&collector.collect()), Some(1.0));
        assert_eq!(exported_value(&collector.collect()), Some(0.0));
    }

    #[test]
    fn test_malformed_base_url_is_logged_not_fatal() {
        let runtime = Runtime::new().unwrap();
        let fetcher = MockFetcher::new(vec![Ok(OPEN_PAGE)]);
        let collector = RegistrationCollector::new(
            fetcher.clone(),
            MockConfig::new("not a url"),
            runtime.handle().clone(),
        )
        .unwrap();

        assert_eq!(collector.poll(), None);
        assert_eq!(exported_value(&collector.collect()), None);
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_concurrent_polls_keep_single_series() {
        let runtime = Runtime::new().unwrap();
        let collector = Arc::new(collector(
            &runtime,
            MockFetcher::new(vec![
                Ok(CLOSED_PAGE),
                Ok(OPEN_PAGE),
                Err(503),
                Ok(CLOSED_PAGE),
                Ok(OPEN_PAGE),
            ]),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let collector = Arc::clone(&collector);
                std::thread::spawn(move || collector.collect())
            })
            .collect();

        for handle in handles {
            let families = handle.join().unwrap();
            if let Some(value) = exported_value(&families) {
                assert!(value == 0.0 || value == 1.0);
            }
        }

        let value = exported_value(&collector.collect());
        assert_eq!(value, Some(1.0));
    }
}
