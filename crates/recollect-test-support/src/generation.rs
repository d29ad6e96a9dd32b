//! Test generators — scripted `TextGenerator` and `ImageGenerator` doubles.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use recollect_core::generation::{
    AspectRatio, GenerationError, ImageGenerator, ImageRequest, TextGenerator, TextRequest,
};
use recollect_core::image::ImageRef;

/// Builds a structured narrative response in the shape the engine expects.
#[must_use]
pub fn narrative_json(
    narrative: &str,
    emotions: &[&str],
    atmosphere: &[&str],
    elements: &[&str],
) -> String {
    serde_json::json!({
        "narrative": narrative,
        "key_emotions": emotions,
        "atmosphere": atmosphere,
        "key_elements": elements,
    })
    .to_string()
}

#[derive(Debug)]
struct Rule {
    marker: String,
    responses: VecDeque<Result<String, GenerationError>>,
    calls: usize,
}

/// A text generator that answers by prompt content.
///
/// Each rule pairs a marker substring with a queue of responses. A call is
/// served by the first rule whose marker occurs in the prompt; its queue is
/// popped, and the final response repeats once the queue is down to one.
/// Prompts matching no rule fail with `RequestFailed`.
#[derive(Debug, Default)]
pub struct StubTextGenerator {
    rules: Mutex<Vec<Rule>>,
    requests: Mutex<Vec<TextRequest>>,
}

impl StubTextGenerator {
    /// Creates a generator with no rules.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule answering prompts containing `marker`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn respond_to(
        self,
        marker: &str,
        responses: Vec<Result<String, GenerationError>>,
    ) -> Self {
        self.rules.lock().unwrap().push(Rule {
            marker: marker.to_owned(),
            responses: responses.into(),
            calls: 0,
        });
        self
    }

    /// Replaces the responses of an existing rule (or adds the rule).
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn push_responses(&self, marker: &str, responses: Vec<Result<String, GenerationError>>) {
        let mut rules = self.rules.lock().unwrap();
        if let Some(rule) = rules.iter_mut().find(|r| r.marker == marker) {
            rule.responses.clear();
            rule.responses.extend(responses);
        } else {
            rules.push(Rule {
                marker: marker.to_owned(),
                responses: responses.into(),
                calls: 0,
            });
        }
    }

    /// Number of calls served by the rule for `marker`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls_to(&self, marker: &str) -> usize {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.marker == marker)
            .map_or(0, |r| r.calls)
    }

    /// Every request received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Total number of calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn total_calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    async fn generate_text(&self, request: TextRequest) -> Result<String, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut rules = self.rules.lock().unwrap();
        let Some(rule) = rules
            .iter_mut()
            .find(|r| request.prompt.contains(&r.marker))
        else {
            return Err(GenerationError::RequestFailed(
                "no stub response for prompt".to_owned(),
            ));
        };
        rule.calls += 1;
        let response = if rule.responses.len() > 1 {
            rule.responses.pop_front()
        } else {
            rule.responses.front().cloned()
        };
        response.unwrap_or_else(|| {
            Err(GenerationError::RequestFailed(
                "stub response queue is empty".to_owned(),
            ))
        })
    }
}

/// Kinds of image request the stub distinguishes.
#[derive(Debug, Default)]
struct ImageCounters {
    illustrations: usize,
    edits: usize,
    panoramas: usize,
}

/// An image generator that returns distinct, predictable images.
///
/// The n-th image (1-based, across all kinds) decodes to the bytes
/// `"<kind>-<n>"`, where kind is `illustration`, `edit` or `panorama`.
#[derive(Debug, Default)]
pub struct StubImageGenerator {
    counters: Mutex<ImageCounters>,
    requests: Mutex<Vec<ImageRequest>>,
    fail_illustrations: bool,
    fail_panoramas: bool,
}

impl StubImageGenerator {
    /// A generator where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every panorama request fail.
    #[must_use]
    pub fn failing_panoramas(mut self) -> Self {
        self.fail_panoramas = true;
        self
    }

    /// Makes every illustration and edit request fail.
    #[must_use]
    pub fn failing_illustrations(mut self) -> Self {
        self.fail_illustrations = true;
        self
    }

    /// Number of panorama requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn panorama_calls(&self) -> usize {
        self.counters.lock().unwrap().panoramas
    }

    /// Number of fresh illustration requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn illustration_calls(&self) -> usize {
        self.counters.lock().unwrap().illustrations
    }

    /// Number of edit-in-place requests received.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn edit_calls(&self) -> usize {
        self.counters.lock().unwrap().edits
    }

    /// Every request received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerator for StubImageGenerator {
    async fn generate_image(&self, request: ImageRequest) -> Result<ImageRef, GenerationError> {
        let mut counters = self.counters.lock().unwrap();
        let kind = match (request.aspect_ratio, request.reference.is_some()) {
            (AspectRatio::Equirectangular, _) => {
                counters.panoramas += 1;
                "panorama"
            }
            (AspectRatio::Widescreen, true) => {
                counters.edits += 1;
                "edit"
            }
            (AspectRatio::Widescreen, false) => {
                counters.illustrations += 1;
                "illustration"
            }
        };
        let n = counters.panoramas + counters.edits + counters.illustrations;
        drop(counters);
        self.requests.lock().unwrap().push(request);

        let failing = if kind == "panorama" {
            self.fail_panoramas
        } else {
            self.fail_illustrations
        };
        if failing {
            return Err(GenerationError::RequestFailed(format!("{kind} backend down")));
        }
        ImageRef::from_bytes("image/png", format!("{kind}-{n}").as_bytes())
    }
}
