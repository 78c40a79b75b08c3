use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};

/// Input modality a result record was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ResultKind {
    Text,
    Audio,
    Video,
    Youtube,
    /// Any tag the server or the history endpoint sent that we don't know.
    /// An empty string means the record carried no tag at all.
    Other(String),
}

impl ResultKind {
    pub fn as_str(&self) -> &str {
        match self {
            ResultKind::Text => "text",
            ResultKind::Audio => "audio",
            ResultKind::Video => "video",
            ResultKind::Youtube => "youtube",
            ResultKind::Other(tag) => tag,
        }
    }
}

impl Default for ResultKind {
    fn default() -> Self {
        ResultKind::Other(String::new())
    }
}

impl From<String> for ResultKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "text" => ResultKind::Text,
            "audio" => ResultKind::Audio,
            "video" => ResultKind::Video,
            "youtube" => ResultKind::Youtube,
            _ => ResultKind::Other(tag),
        }
    }
}

/// A tag that is null or not a string reads as untagged.
impl<'de> Deserialize<'de> for ResultKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(tag)) => ResultKind::from(tag),
            _ => ResultKind::default(),
        })
    }
}

impl From<ResultKind> for String {
    fn from(kind: ResultKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ResultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proportions over the three sentiment classes. Components that are
/// missing or not numbers come through as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positive: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutral: Option<f64>,
}

/// Only a JSON object is a score triple. Sequences and scalars are rejected
/// so an untagged `Sentiment` falls through to `Other`.
impl<'de> Deserialize<'de> for SentimentScores {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(fields) = Value::deserialize(deserializer)? else {
            return Err(de::Error::custom("expected a map of sentiment scores"));
        };
        let component = |key: &str| fields.get(key).and_then(Value::as_f64);
        Ok(Self {
            positive: component("positive"),
            negative: component("negative"),
            neutral: component("neutral"),
        })
    }
}

impl SentimentScores {
    pub fn new(positive: f64, negative: f64, neutral: f64) -> Self {
        Self {
            positive: Some(positive),
            negative: Some(negative),
            neutral: Some(neutral),
        }
    }

    /// True when at least one component is a number.
    pub fn has_numeric(&self) -> bool {
        self.positive.is_some() || self.negative.is_some() || self.neutral.is_some()
    }

    /// `[positive, negative, neutral]`, missing components as 0.
    pub fn values(&self) -> [f64; 3] {
        [
            self.positive.unwrap_or(0.0),
            self.negative.unwrap_or(0.0),
            self.neutral.unwrap_or(0.0),
        ]
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|n| *n > 0.0).map(|n| n.round() as u64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sentiment {
    Label(String),
    Scores(SentimentScores),
    Other(Value),
}

impl Sentiment {
    pub fn label(&self) -> Option<&str> {
        match self {
            Sentiment::Label(label) => Some(label),
            _ => None,
        }
    }

    pub fn scores(&self) -> Option<&SentimentScores> {
        match self {
            Sentiment::Scores(scores) => Some(scores),
            _ => None,
        }
    }
}

/// Confidence as sent by the text backend: either a raw number or a
/// preformatted string such as `"92.00%"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Score(f64),
    Formatted(String),
    Other(Value),
}

impl Confidence {
    /// Zero, NaN and the empty string carry no confidence to show.
    pub fn is_blank(&self) -> bool {
        match self {
            Confidence::Score(score) => *score == 0.0 || score.is_nan(),
            Confidence::Formatted(text) => text.is_empty(),
            Confidence::Other(value) => matches!(value, Value::Null | Value::Bool(false)),
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Score(score) => write!(f, "{}", score),
            Confidence::Formatted(text) => f.write_str(text),
            Confidence::Other(value) => write!(f, "{}", value),
        }
    }
}

/// One completed analysis. Immutable once it lands in the result list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "type", default)]
    pub kind: ResultKind,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// Remaining response fields, kept so the record logged to the local
    /// server is the full response.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResultRecord {
    /// Merge the tag, the raw input and the response body into one record.
    /// Response fields win on key collision. A body that isn't a JSON object
    /// contributes nothing.
    pub fn normalize(kind: ResultKind, input: &str, response: Value) -> serde_json::Result<Self> {
        let mut merged = Map::new();
        merged.insert("type".into(), Value::String(kind.into()));
        merged.insert("input".into(), Value::String(input.to_string()));

        if let Value::Object(fields) = response {
            merged.extend(fields);
        }

        serde_json::from_value(Value::Object(merged))
    }

    pub fn scores(&self) -> Option<&SentimentScores> {
        self.sentiment.as_ref().and_then(Sentiment::scores)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub comments: u64,
}

/// Response of the combined YouTube analyze endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YoutubeAnalysis {
    #[serde(default)]
    pub video: VideoMetadata,
    #[serde(default)]
    pub sentiment: SentimentScores,
}
