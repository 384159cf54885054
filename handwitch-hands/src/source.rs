//! Loading hand descriptions from JSON/YAML and serving them to the session engine.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::{HandError, Result};
use crate::hand::{HandDescriptor, HandProcessor, HttpHand};
use crate::template;

/// Validated set of hand descriptors keyed by hand name.
#[derive(Debug, Clone, Default)]
pub struct DescriptionsSource {
    hands: BTreeMap<String, HandDescriptor>,
}

impl DescriptionsSource {
    /// Validates every descriptor. All violations are reported together.
    pub fn from_descriptors(mut hands: BTreeMap<String, HandDescriptor>) -> Result<Self> {
        let mut errors = Vec::new();
        for (hand_name, hand) in hands.iter_mut() {
            errors.extend(
                validate_hand(hand_name, hand)
                    .into_iter()
                    .map(|e| format!("hand \"{}\": {}", hand_name, e)),
            );
        }
        if !errors.is_empty() {
            return Err(HandError::Validation(errors));
        }
        Ok(Self { hands })
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Self::from_descriptors(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Self::from_descriptors(serde_yaml::from_str(raw)?)
    }

    /// Picks the format by extension: `.json`, `.yaml` or `.yml`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let source = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&raw)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw)?,
            other => {
                return Err(HandError::UnsupportedFormat(
                    other.unwrap_or_default().to_string(),
                ))
            }
        };
        info!(path = %path.display(), hands = source.hands.len(), "Loaded hand descriptions");
        Ok(source)
    }

    pub fn get(&self, name: &str) -> Result<&HandDescriptor> {
        self.hands
            .get(name)
            .ok_or_else(|| HandError::UnknownHand(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &HandDescriptor> {
        self.hands.values()
    }

    pub fn len(&self) -> usize {
        self.hands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

fn validate_hand(hand_name: &str, hand: &mut HandDescriptor) -> Vec<String> {
    let mut errors = Vec::new();
    if hand.name.is_empty() {
        hand.name = hand_name.to_string();
    } else if hand.name != hand_name {
        errors.push(format!(
            "difference between hand name in field \"{}\" and in map \"{}\"",
            hand.name, hand_name
        ));
    }
    if let Err(e) = template::check("url_template", &hand.url_template) {
        errors.push(format!("bad URL template: {}", e));
    }
    if let Err(e) = template::check("body", &hand.body) {
        errors.push(format!("bad body template: {}", e));
    }
    for (param_name, param) in hand.parameters.iter_mut() {
        if param.name.is_empty() {
            param.name = param_name.clone();
        } else if &param.name != param_name {
            errors.push(format!(
                "param \"{}\": difference between name in field \"{}\" and in map",
                param_name, param.name
            ));
        }
        errors.extend(
            param
                .validate()
                .into_iter()
                .map(|e| format!("param \"{}\": {}", param_name, e)),
        );
    }
    errors
}

/// Source of executable hands for the session engine.
pub trait HandSource: Send + Sync {
    fn hand(&self, name: &str) -> Result<Arc<dyn HandProcessor>>;

    fn hand_names(&self) -> Vec<String>;

    /// "Available requests:" followed by the brief of every hand.
    fn brief_help(&self) -> String;
}

/// [`HandSource`] over validated descriptions; every hand shares one HTTP client.
pub struct HandRegistry {
    hands: BTreeMap<String, Arc<HttpHand>>,
}

impl HandRegistry {
    pub fn new(source: DescriptionsSource, client: reqwest::Client) -> Self {
        let hands = source
            .hands
            .into_iter()
            .map(|(name, descriptor)| (name, Arc::new(HttpHand::new(descriptor, client.clone()))))
            .collect();
        Self { hands }
    }
}

impl HandSource for HandRegistry {
    fn hand(&self, name: &str) -> Result<Arc<dyn HandProcessor>> {
        self.hands
            .get(name)
            .map(|hand| hand.clone() as Arc<dyn HandProcessor>)
            .ok_or_else(|| HandError::UnknownHand(name.to_string()))
    }

    fn hand_names(&self) -> Vec<String> {
        self.hands.keys().cloned().collect()
    }

    fn brief_help(&self) -> String {
        let mut out = String::from("Available requests:\n\n");
        for hand in self.hands.values() {
            out.push_str(&hand.descriptor().brief());
            out.push('\n');
        }
        out
    }
}
