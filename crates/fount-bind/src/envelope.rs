//! The per-key loading/error/data view.

use fount_cache::CacheResult;
use fount_http::FetchError;
use serde_json::Value;
use std::sync::Arc;

/// The three-field view a consumer observes for each logical key.
///
/// Exactly one of the three describes the state: loading excludes both error
/// and data, and a settled envelope has exactly one of error/data set.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Whether a fetch for this key is outstanding.
    pub is_loading: bool,
    /// The classified failure, if the key settled with one.
    pub error: Option<FetchError>,
    /// The decoded payload, if the key settled successfully.
    pub data: Option<Arc<Value>>,
}

impl Envelope {
    /// The initial, unsettled state.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            error: None,
            data: None,
        }
    }

    /// A settled success.
    pub fn data(value: Arc<Value>) -> Self {
        Self {
            is_loading: false,
            error: None,
            data: Some(value),
        }
    }

    /// A settled failure.
    pub fn error(error: FetchError) -> Self {
        Self {
            is_loading: false,
            error: Some(error),
            data: None,
        }
    }

    /// Build a settled envelope from a cache settlement.
    pub fn from_result(result: CacheResult) -> Self {
        match result {
            Ok(value) => Self::data(value),
            Err(error) => Self::error(error),
        }
    }

    /// Whether the envelope has left the loading state.
    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::loading()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_states_are_exclusive() {
        let loading = Envelope::loading();
        assert!(loading.is_loading);
        assert!(loading.error.is_none() && loading.data.is_none());

        let data = Envelope::data(Arc::new(serde_json::json!({"id": 1})));
        assert!(!data.is_loading);
        assert!(data.error.is_none() && data.data.is_some());

        let error = Envelope::error(FetchError::Transport("down".to_string()));
        assert!(!error.is_loading);
        assert!(error.error.is_some() && error.data.is_none());
    }

    #[test]
    fn test_envelope_from_result() {
        let ok = Envelope::from_result(Ok(Arc::new(serde_json::json!(1))));
        assert!(ok.is_settled());
        assert_eq!(ok.data.as_deref(), Some(&serde_json::json!(1)));

        let err = Envelope::from_result(Err(FetchError::Transport("down".to_string())));
        assert!(err.is_settled());
        assert!(err.error.is_some());
    }
}
