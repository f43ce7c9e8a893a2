//! Dependency classification
//!
//! A classifier reads a document's text and names the documents it depends
//! on. It is an unreliable external collaborator, so every call goes through
//! [`classify_bounded`], which turns errors and timeouts into
//! [`Dependencies::Unknown`].

use crate::error::ClassifierError;
use async_trait::async_trait;
use docgraph_record::{CanonicalRef, Dependencies, DocumentId};
use docgraph_refs::ReferenceNormalizer;
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::time::Duration;

/// Sampling temperature for chat-completion requests
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Names the documents a text depends on
#[async_trait]
pub trait DependencyClassifier: Send + Sync {
    /// Classify `text`, written by document `own` if known
    async fn classify(
        &self,
        text: &str,
        own: Option<DocumentId>,
    ) -> Result<Vec<CanonicalRef>, ClassifierError>;
}

/// Classifier that is switched off
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl DependencyClassifier for DisabledClassifier {
    async fn classify(
        &self,
        _text: &str,
        _own: Option<DocumentId>,
    ) -> Result<Vec<CanonicalRef>, ClassifierError> {
        Err(ClassifierError::Disabled)
    }
}

/// Run `classifier` under a time bound
///
/// Any failure is logged and reported as [`Dependencies::Unknown`].
pub async fn classify_bounded(
    classifier: &dyn DependencyClassifier,
    text: &str,
    own: Option<DocumentId>,
    bound: Duration,
) -> Dependencies {
    let outcome = match tokio::time::timeout(bound, classifier.classify(text, own)).await {
        Ok(result) => result,
        Err(_) => Err(ClassifierError::Timeout {
            duration_secs: bound.as_secs(),
        }),
    };
    match outcome {
        Ok(refs) => Dependencies::Known(refs),
        Err(ClassifierError::Disabled) => Dependencies::Unknown,
        Err(err) => {
            tracing::warn!(id = ?own.map(DocumentId::get), error = %err, "dependency classification unavailable");
            Dependencies::Unknown
        }
    }
}

/// Few-shot prompt asking for a JSON array of dependencies
#[must_use]
pub fn dependency_prompt(text: &str, own: Option<DocumentId>, keyword: &str) -> String {
    let subject = own.map_or_else(|| keyword.to_string(), |id| format!("{keyword} {id}"));
    format!(
        r#"You are analyzing the text of proposal document {subject}.

The goal is to identify any dependencies on other {keyword} documents.

Example 1:
Text: This {keyword} proposes a change to the key format. It depends on {keyword} 32 and {keyword} 39.
Dependencies: ["{keyword} 32", "{keyword} 39"]

Example 2:
Text: This proposal builds upon {keyword}-0016 for partially signed transactions.
Dependencies: ["{keyword} 16"]

Example 3:
Text: This {keyword} does not depend on any other {keyword}s.
Dependencies: []

Respond with a plain JSON array of the {keyword} numbers this document depends on.
If there are no dependencies, return an empty list.
No text, no explanation, no formatting. Only the JSON list.

Here is the document text:

"""{text}""""#
    )
}

/// Parse a classifier reply into sorted, distinct references
///
/// The reply must be a JSON array whose items are strings or integers;
/// a surrounding Markdown code fence is tolerated. Only items that reduce
/// to a numbered reference are kept; the document's own id is dropped.
///
/// # Errors
/// [`ClassifierError::MalformedResponse`] for anything else
pub fn parse_dependencies(
    content: &str,
    normalizer: &ReferenceNormalizer,
    own: Option<DocumentId>,
) -> Result<Vec<CanonicalRef>, ClassifierError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed);

    let items: Vec<Value> = serde_json::from_str(unfenced.trim())
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;

    let mut refs = BTreeSet::new();
    for item in items {
        let token = match item {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(ClassifierError::MalformedResponse(format!(
                    "unexpected item {other}"
                )))
            }
        };
        match normalizer.normalize_token(&token) {
            Some(reference @ CanonicalRef::Numbered(_)) => {
                if own.map_or(true, |id| !reference.is_document(id)) {
                    refs.insert(reference);
                }
            }
            _ => tracing::debug!(%token, "ignoring non-numeric dependency"),
        }
    }
    Ok(refs.into_iter().collect())
}

/// OpenAI-compatible chat-completions classifier
#[derive(Debug, Clone)]
pub struct ChatCompletionClassifier {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
    normalizer: ReferenceNormalizer,
}

impl ChatCompletionClassifier {
    /// Create classifier for `base_url` (e.g. `https://api.openai.com/v1`)
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        normalizer: ReferenceNormalizer,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            temperature: DEFAULT_TEMPERATURE,
            normalizer,
        }
    }

    /// Set sampling temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl DependencyClassifier for ChatCompletionClassifier {
    async fn classify(
        &self,
        text: &str,
        own: Option<DocumentId>,
    ) -> Result<Vec<CanonicalRef>, ClassifierError> {
        let prompt = dependency_prompt(text, own, &self.normalizer.syntax().mention_keyword);
        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
        });

        let mut request = self.client.post(self.endpoint()).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?.error_for_status()?;
        let reply: Value = response.json().await?;
        let content = reply["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ClassifierError::MissingContent)?;

        tracing::debug!(id = ?own.map(DocumentId::get), %content, "classifier reply");
        parse_dependencies(content, &self.normalizer, own)
    }
}
