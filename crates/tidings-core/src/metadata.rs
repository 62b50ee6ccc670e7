//! Conversation metadata.
//!
//! Conversations carry a free-form tree of string keys that every participant
//! can update. Updates either replace the whole tree or merge into it; the
//! store applies the same rule, so the local copy stays in step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Environment, MetadataError};

/// Metadata key holding the conversation's header color.
pub const BACKGROUND_COLOR_KEY: &str = "backgroundColor";

/// A metadata leaf or nested map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// String leaf.
    Text(String),
    /// Nested map.
    Map(BTreeMap<String, MetadataValue>),
}

impl From<&str> for MetadataValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// How an update is combined with existing metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Overlay onto the existing tree; keys the update does not name survive.
    Merge,
    /// Discard the existing tree.
    Replace,
}

/// Key/value tree attached to a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationMetadata {
    entries: BTreeMap<String, MetadataValue>,
}

impl ConversationMetadata {
    /// Empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a top-level entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Apply an update.
    ///
    /// With [`MergeMode::Merge`] nested maps are merged recursively, so
    /// updating one field of a nested entry leaves its siblings in place. A
    /// leaf in the update always overwrites whatever was at that key.
    pub fn put(&mut self, update: ConversationMetadata, mode: MergeMode) {
        match mode {
            MergeMode::Replace => self.entries = update.entries,
            MergeMode::Merge => merge_maps(&mut self.entries, update.entries),
        }
    }

    /// Top-level entry for `key`.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Whether no entries are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn merge_maps(
    target: &mut BTreeMap<String, MetadataValue>,
    update: BTreeMap<String, MetadataValue>,
) {
    for (key, value) in update {
        let incoming = match value {
            MetadataValue::Map(incoming) => incoming,
            leaf @ MetadataValue::Text(_) => {
                target.insert(key, leaf);
                continue;
            },
        };

        if let Some(MetadataValue::Map(existing)) = target.get_mut(&key) {
            merge_maps(existing, incoming);
        } else {
            target.insert(key, MetadataValue::Map(incoming));
        }
    }
}

/// Header color stored in conversation metadata.
///
/// Channels are fractions in `[0, 1]`, stored as decimal strings under
/// [`BACKGROUND_COLOR_KEY`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundColor {
    /// Red fraction.
    pub red: f32,
    /// Green fraction.
    pub green: f32,
    /// Blue fraction.
    pub blue: f32,
}

impl BackgroundColor {
    const COMPONENTS: [&'static str; 3] = ["red", "green", "blue"];

    /// Color with the given channel fractions.
    pub fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Pick a color uniformly from the environment's RNG.
    pub fn random<E: Environment>(env: &E) -> Self {
        let channel = || f32::from(env.random_u8()) / 256.0;
        Self { red: channel(), green: channel(), blue: channel() }
    }

    /// Metadata update carrying this color, for merging into a conversation.
    pub fn to_metadata(&self) -> ConversationMetadata {
        let channels = Self::COMPONENTS
            .into_iter()
            .zip([self.red, self.green, self.blue])
            .map(|(name, value)| (name.to_string(), MetadataValue::Text(value.to_string())))
            .collect();

        ConversationMetadata::new().with(BACKGROUND_COLOR_KEY, MetadataValue::Map(channels))
    }

    /// Read the color from `metadata`. `None` if no color has been set.
    pub fn from_metadata(metadata: &ConversationMetadata) -> Result<Option<Self>, MetadataError> {
        let channels = match metadata.get(BACKGROUND_COLOR_KEY) {
            None => return Ok(None),
            Some(MetadataValue::Map(channels)) => channels,
            Some(MetadataValue::Text(_)) => {
                return Err(MetadataError::NotAMap { key: BACKGROUND_COLOR_KEY.to_string() });
            },
        };

        let [red, green, blue] = Self::COMPONENTS;
        Ok(Some(Self {
            red: parse_channel(channels, red)?,
            green: parse_channel(channels, green)?,
            blue: parse_channel(channels, blue)?,
        }))
    }

    /// Opaque ARGB value, each channel scaled to `0..=255` and truncated.
    pub fn to_argb(&self) -> u32 {
        let scale = |c: f32| (255.0 * c) as u32;
        0xFF00_0000 | (scale(self.red) << 16) | (scale(self.green) << 8) | scale(self.blue)
    }
}

fn parse_channel(
    channels: &BTreeMap<String, MetadataValue>,
    component: &'static str,
) -> Result<f32, MetadataError> {
    let raw = match channels.get(component) {
        None => return Err(MetadataError::MissingComponent { component }),
        Some(MetadataValue::Text(raw)) => raw,
        Some(MetadataValue::Map(_)) => {
            return Err(MetadataError::InvalidComponent { component, value: "{..}".to_string() });
        },
    };

    let value: f32 = raw
        .trim()
        .parse()
        .map_err(|_| MetadataError::InvalidComponent { component, value: raw.clone() })?;

    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(MetadataError::OutOfRange { component, value })
    }
}
