use std::sync::Arc;

use studio_ai::{InferenceRequest, Registry};
use studio_core::PredictionList;

use crate::{Coordinator, Submission};

/// Run a validated request against `registry` in the background.
///
/// A failed invocation reaches the coordinator's error sink with the
/// `ModelError` intact; the registry is left exactly as it was.
pub fn submit_inference(
    coordinator: &mut Coordinator<PredictionList>,
    registry: Arc<Registry>,
    request: InferenceRequest,
    on_success: impl FnOnce(PredictionList) + 'static,
) -> Submission {
    let name = request.modality().to_string();
    coordinator.submit(
        name,
        move || request.run(&registry).map_err(anyhow::Error::from),
        on_success,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;
    use std::time::{Duration, Instant};

    use studio_ai::{
        Capability, CapabilityLoader, Family, ModelError, ModelInput, RgbImage,
    };
    use studio_core::Modality;

    use crate::{JobError, JobStatus, PollReport};

    fn wait(coord: &mut Coordinator<PredictionList>) -> PollReport {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut total = PollReport::default();
        while coord.is_busy() {
            assert!(Instant::now() < deadline, "inference did not finish in time");
            total.extend(coord.poll());
            thread::sleep(Duration::from_millis(5));
        }
        total
    }

    /// Real-family capability whose image pipeline always fails.
    struct BrokenImage(Modality);

    impl Capability for BrokenImage {
        fn modality(&self) -> Modality {
            self.0
        }

        fn family(&self) -> Family {
            Family::Real
        }

        fn classify(&self, _input: &ModelInput) -> Result<PredictionList, ModelError> {
            match self.0 {
                Modality::Sentiment => Ok(PredictionList::single("POSITIVE", 0.99)?),
                Modality::Image => Err(ModelError::Inference(anyhow::anyhow!("cuda out of memory"))),
            }
        }

        fn describe(&self) -> String {
            format!("broken {}", self.0)
        }
    }

    struct BrokenImageLoader;

    impl CapabilityLoader for BrokenImageLoader {
        fn load(&self, modality: Modality) -> anyhow::Result<Box<dyn Capability>> {
            Ok(Box::new(BrokenImage(modality)))
        }
    }

    #[test]
    fn fallback_sentiment_is_delivered() {
        let registry = Arc::new(Registry::fallback());
        let mut coord = Coordinator::new(Duration::from_millis(100));
        let got = Rc::new(RefCell::new(None));
        let got_cb = Rc::clone(&got);

        let req = InferenceRequest::new(
            Modality::Sentiment,
            ModelInput::text("This subject is great!"),
        )
        .unwrap();
        let sub = submit_inference(&mut coord, registry, req, move |list| {
            *got_cb.borrow_mut() = Some(list)
        });
        assert!(matches!(sub, Submission::Started(_)));

        assert_eq!(wait(&mut coord).done(), 1);
        let list = got.borrow_mut().take().unwrap();
        assert_eq!(list.top().label(), "POSITIVE");
        assert_eq!(list.top().score(), 0.75);
    }

    #[test]
    fn invocation_failure_keeps_model_error_and_family() {
        let registry = Arc::new(Registry::load(&BrokenImageLoader));
        assert_eq!(registry.family(), Family::Real);

        let errors = Rc::new(RefCell::new(Vec::new()));
        let sink_errors = Rc::clone(&errors);
        let mut coord = Coordinator::new(Duration::from_millis(100)).with_error_sink(
            move |_, err: &JobError| {
                let model_err = err
                    .task_error()
                    .and_then(|e| e.downcast_ref::<ModelError>())
                    .map(|e| matches!(e, ModelError::Inference(_)));
                sink_errors.borrow_mut().push((err.to_string(), model_err));
            },
        );

        let req =
            InferenceRequest::new(Modality::Image, ModelInput::Image(RgbImage::new(16, 16))).unwrap();
        submit_inference(&mut coord, Arc::clone(&registry), req, |_| {
            panic!("failed inference must not deliver a result")
        });

        let report = wait(&mut coord);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].1, JobStatus::Failed);

        let errors = errors.borrow();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].0.contains("cuda out of memory"));
        assert_eq!(errors[0].1, Some(true));

        // No mid-session switch to the fallbacks.
        assert_eq!(registry.family(), Family::Real);
        assert_eq!(registry.get(Modality::Image).describe(), "broken image");
    }
}
