use std::fmt;

/// Whether registration for the configured event has opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    Open,
    Closed,
}

impl RegistrationStatus {
    /// Classify the plain text of the event page.
    ///
    /// The page announces `Registration for PromCon {year} will open soon` until
    /// registration starts. Matching is a case-sensitive substring test: any
    /// page that does not carry the exact phrase counts as open.
    pub fn from_page_text(text: &str, year: &str) -> Self {
        if text.contains(&closed_phrase(year)) {
            RegistrationStatus::Closed
        } else {
            RegistrationStatus::Open
        }
    }

    pub fn gauge_value(self) -> f64 {
        match self {
            RegistrationStatus::Open => 1.0,
            RegistrationStatus::Closed => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStatus::Open => "open",
            RegistrationStatus::Closed => "not open yet",
        }
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn closed_phrase(year: &str) -> String {
    format!("Registration for PromCon {} will open soon", year)
}

/// Path segment of the event page, e.g. `2019-munich`.
pub fn event_path(year: &str, location: &str) -> String {
    format!("{}-{}", year, location.to_lowercase())
}
