//! Image classification through the vision model.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use psort_media::{prepare_for_inference, PreprocessOptions};
use psort_models::ClassificationLabel;
use psort_vision::VisionModel;

use crate::error::{WorkerError, WorkerResult};
use crate::retry::RetryPolicy;

/// Assigns one label to an image file.
#[async_trait]
pub trait ImageLabeler: Send + Sync {
    async fn classify(&self, path: &Path) -> WorkerResult<ClassificationLabel>;
}

/// Fixed instruction sent with every image.
pub fn classification_prompt() -> String {
    let labels: Vec<&str> = ClassificationLabel::ALL.iter().map(|l| l.as_str()).collect();
    format!(
        "You are an image classifier. Reply with exactly one word from this list: {}. \
         Use misc when no other category fits. Do not add punctuation or any other text.",
        labels.join(", ")
    )
}

/// [`ImageLabeler`] that downsizes the image and asks a [`VisionModel`].
pub struct ImageClassifier {
    model: Arc<dyn VisionModel>,
    retry: RetryPolicy,
    preprocess: PreprocessOptions,
    prompt: String,
}

impl ImageClassifier {
    pub fn new(model: Arc<dyn VisionModel>, retry: RetryPolicy) -> Self {
        Self {
            model,
            retry,
            preprocess: PreprocessOptions::default(),
            prompt: classification_prompt(),
        }
    }

    pub fn with_preprocess(mut self, options: PreprocessOptions) -> Self {
        self.preprocess = options;
        self
    }
}

#[async_trait]
impl ImageLabeler for ImageClassifier {
    async fn classify(&self, path: &Path) -> WorkerResult<ClassificationLabel> {
        let prepared = prepare_for_inference(path, self.preprocess)
            .await
            .map_err(WorkerError::preprocess)?;
        debug!(
            path = %path.display(),
            width = prepared.width,
            height = prepared.height,
            "Classifying image"
        );

        let data_url = prepared.to_data_url();
        let model = &self.model;
        let prompt = self.prompt.as_str();
        let image = data_url.as_str();

        let reply = self
            .retry
            .execute("vision_inference", move || model.complete(prompt, image))
            .await
            .map_err(WorkerError::classification)?;

        let label = match ClassificationLabel::parse_response(&reply) {
            Ok(label) => label,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    reply = %reply.trim(),
                    "Model reply is not a known label, using misc: {}",
                    e
                );
                ClassificationLabel::Misc
            }
        };

        info!(path = %path.display(), label = %label, "Classified image");
        Ok(label)
    }
}
