use std::fmt;

use thiserror::Error;

/// What a fetch was reading when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchTarget {
    Sponsors,
    Attendees,
    Schedule,
    Page(String),
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchTarget::Sponsors => write!(f, "sponsors"),
            FetchTarget::Attendees => write!(f, "attendees"),
            FetchTarget::Schedule => write!(f, "schedule"),
            FetchTarget::Page(slug) => write!(f, "page '{}'", slug),
        }
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// Network, API, or response-parsing failure while fetching
    #[error("Failed to fetch {target}")]
    Fetch {
        target: FetchTarget,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid event time {0:?} - expected YYYY-M-D H:mm")]
    InvalidEventTime(String),

    #[error("{} of {total} fetches failed: {}", .failed.len(), join_targets(.failed))]
    LoadIncomplete {
        failed: Vec<FetchTarget>,
        total: usize,
    },
}

fn join_targets(targets: &[FetchTarget]) -> String {
    targets
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StoreError {
    pub fn fetch_target(&self) -> Option<&FetchTarget> {
        match self {
            StoreError::Fetch { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_incomplete_message() {
        let err = StoreError::LoadIncomplete {
            failed: vec![FetchTarget::Sponsors, FetchTarget::Page("faqs".to_string())],
            total: 9,
        };
        assert_eq!(err.to_string(), "2 of 9 fetches failed: sponsors, page 'faqs'");
    }

    #[test]
    fn test_fetch_exposes_cause_chain() {
        use std::error::Error as _;

        let source = anyhow::anyhow!("connection reset").context("Failed to send GET request");
        let err = StoreError::Fetch {
            target: FetchTarget::Schedule,
            source,
        };
        assert_eq!(err.to_string(), "Failed to fetch schedule");
        assert_eq!(err.fetch_target(), Some(&FetchTarget::Schedule));

        let mut chain = Vec::new();
        let mut next = err.source();
        while let Some(cause) = next {
            chain.push(cause.to_string());
            next = cause.source();
        }
        assert_eq!(chain, vec!["Failed to send GET request", "connection reset"]);
    }
}
