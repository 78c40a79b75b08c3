//! Pure view models for the result list and the YouTube view.
//!
//! Nothing in here fails: any record, however sparsely populated, renders
//! to a card, with placeholders standing in for missing fields.

use crate::{
    state::YoutubeState,
    types::{ResultKind, ResultRecord, Sentiment, SentimentScores, VideoMetadata},
};

pub const SENTIMENT_LABELS: [&str; 3] = ["Positive", "Negative", "Neutral"];

#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Card {
    pub title: String,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub label: &'static str,
    pub value: f64,
    /// Text drawn above the bar, if the chart has data labels.
    pub data_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BarChart {
    pub title: &'static str,
    /// Upper bound of the value axis, when fixed.
    pub max: Option<f64>,
    pub unit: &'static str,
    pub bars: Vec<Bar>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultsView {
    pub chart: Option<BarChart>,
    pub cards: Vec<Card>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct YoutubeView {
    pub details: Option<Card>,
    pub chart: Option<BarChart>,
}

/// A chart is drawn for a record only if its sentiment is a triple with
/// at least one numeric component.
pub fn should_show_chart(record: &ResultRecord) -> bool {
    record.scores().is_some_and(SentimentScores::has_numeric)
}

/// Bar chart data for one record; missing components count as 0.
pub fn chart_data(scores: &SentimentScores) -> BarChart {
    BarChart {
        title: "Sentiment Scores",
        max: None,
        unit: "",
        bars: SENTIMENT_LABELS
            .into_iter()
            .zip(scores.values())
            .map(|(label, value)| Bar {
                label,
                value,
                data_label: None,
            })
            .collect(),
    }
}

pub fn render_results(results: &[ResultRecord]) -> ResultsView {
    let chart = results
        .last()
        .filter(|latest| should_show_chart(latest))
        .and_then(ResultRecord::scores)
        .map(chart_data);

    ResultsView {
        chart,
        cards: results.iter().map(render_card).collect(),
    }
}

pub fn render_card(record: &ResultRecord) -> Card {
    let input = record.input.as_deref().filter(|input| !input.is_empty());

    match &record.kind {
        ResultKind::Text => Card {
            title: "Text Analysis".into(),
            fields: vec![
                Field::new("Text", input.unwrap_or("N/A")),
                Field::new(
                    "Sentiment",
                    record
                        .sentiment
                        .as_ref()
                        .and_then(Sentiment::label)
                        .filter(|label| !label.is_empty())
                        .unwrap_or("N/A"),
                ),
                Field::new(
                    "Confidence",
                    record
                        .confidence
                        .as_ref()
                        .filter(|confidence| !confidence.is_blank())
                        .map(|confidence| confidence.to_string())
                        .unwrap_or_else(|| "N/A".into()),
                ),
            ],
        },
        ResultKind::Audio => Card {
            title: "Audio Analysis".into(),
            fields: vec![
                Field::new("Audio File Name", input.unwrap_or("Unknown")),
                Field::new(
                    "Sentiment",
                    record
                        .emotion
                        .as_deref()
                        .filter(|emotion| !emotion.is_empty())
                        .or_else(|| record.sentiment.as_ref().and_then(Sentiment::label))
                        .filter(|label| !label.is_empty())
                        .unwrap_or("Unknown"),
                ),
            ],
        },
        kind => {
            let [positive, negative, neutral] =
                record.scores().copied().unwrap_or_default().values();
            Card {
                title: card_title(kind),
                fields: vec![
                    Field::new("Input", input.unwrap_or("N/A")),
                    Field::new(
                        "Sentiment",
                        format!(
                            "Positive: {:.2}, Negative: {:.2}, Neutral: {:.2}",
                            positive, negative, neutral
                        ),
                    ),
                ],
            }
        }
    }
}

fn card_title(kind: &ResultKind) -> String {
    let mut chars = kind.as_str().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Analysis".into(),
    }
}

/// Render the YouTube view. Chart values are percentages. Each bar is
/// labelled with a comment count recovered from the proportion and the
/// video's comment total, or `fallback_comments` without one.
pub fn render_youtube(
    video: Option<&VideoMetadata>,
    sentiment: Option<&SentimentScores>,
    fallback_comments: u64,
) -> YoutubeView {
    let details = video.map(|video| Card {
        title: "Video Details".into(),
        fields: vec![
            Field::new("Title", video.title.clone()),
            Field::new("Thumbnail", video.thumbnail.clone()),
            Field::new("Likes", video.likes.to_string()),
            Field::new("Comments", video.comments.to_string()),
        ],
    });

    let total_comments = video
        .map(|video| video.comments)
        .filter(|comments| *comments > 0)
        .unwrap_or(fallback_comments);

    let chart = sentiment.map(|scores| BarChart {
        title: "Comment Sentiment",
        max: Some(100.0),
        unit: "%",
        bars: SENTIMENT_LABELS
            .into_iter()
            .zip(scores.values())
            .map(|(label, proportion)| {
                let value = proportion * 100.0;
                Bar {
                    label,
                    value,
                    data_label: Some(comment_count_label(value, total_comments)),
                }
            })
            .collect(),
    });

    YoutubeView { details, chart }
}

pub fn render_youtube_state(state: &YoutubeState, fallback_comments: u64) -> YoutubeView {
    render_youtube(
        state.video.as_ref(),
        state.sentiment.as_ref(),
        fallback_comments,
    )
}

/// `value` is a percentage; the label is the matching share of
/// `total_comments`, rounded.
pub fn comment_count_label(value: f64, total_comments: u64) -> String {
    let proportion = value / 100.0;
    format!("{} comments", (proportion * total_comments as f64).round() as i64)
}
