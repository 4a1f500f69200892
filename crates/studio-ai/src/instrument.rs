//! Call-boundary logging and timing for any [`Capability`].

use std::time::Instant;

use studio_core::{Modality, PredictionList};
use tracing::{debug, info, warn};

use crate::{Capability, Family, ModelError, ModelInput};

/// Longest result preview written to the log.
const PREVIEW_CHARS: usize = 180;

/// Wraps a capability, logging each `classify` call, a truncated preview
/// of its result, and the elapsed time.
pub struct Instrumented<C> {
    inner: C,
}

impl<C: Capability> Instrumented<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Capability> Capability for Instrumented<C> {
    fn modality(&self) -> Modality {
        self.inner.modality()
    }

    fn family(&self) -> Family {
        self.inner.family()
    }

    fn classify(&self, input: &ModelInput) -> Result<PredictionList, ModelError> {
        let modality = self.inner.modality();
        let family = self.inner.family();
        debug!(%modality, %family, input = %input.kind(), "calling classify");

        let start = Instant::now();
        let result = self.inner.classify(input);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match &result {
            Ok(list) => info!(
                %modality,
                %family,
                elapsed_ms = format_args!("{elapsed_ms:.1}"),
                result = %preview(&list.to_string()),
                "classify finished"
            ),
            Err(err) => warn!(
                %modality,
                %family,
                elapsed_ms = format_args!("{elapsed_ms:.1}"),
                error = %err,
                "classify failed"
            ),
        }
        result
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

fn preview(s: &str) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleSentiment;

    #[test]
    fn delegates_to_inner() {
        let wrapped = Instrumented::new(RuleSentiment);
        let out = wrapped.classify(&ModelInput::text("I love it")).unwrap();
        assert_eq!(out.top().label(), "POSITIVE");
        assert_eq!(wrapped.describe(), RuleSentiment.describe());
        assert_eq!(wrapped.family(), Family::Fallback);
    }

    #[test]
    fn preview_truncates_long_output() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));

        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let long = "é".repeat(200);
        let p = preview(&long);
        assert!(p.starts_with("ééé"));
        assert!(p.ends_with("..."));
    }
}
