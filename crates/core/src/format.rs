use crate::render::{BarChart, Card, ResultsView, YoutubeView};

const BAR_WIDTH: usize = 40;

/// Format a card as an indented block of `Label: value` lines
pub fn format_card(card: &Card) -> String {
    let mut output = String::new();
    output.push_str(&format!("### {}\n", card.title));
    for field in &card.fields {
        output.push_str(&format!("  {}: {}\n", field.label, field.value));
    }
    output
}

/// Format a bar chart as horizontal text bars, scaled to the chart's
/// fixed maximum or, without one, to its largest value
pub fn format_chart(chart: &BarChart) -> String {
    let scale = chart
        .max
        .unwrap_or_else(|| chart.bars.iter().map(|bar| bar.value).fold(0.0, f64::max));

    let label_width = chart
        .bars
        .iter()
        .map(|bar| bar.label.len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    output.push_str(&format!("## {}\n\n", chart.title));
    for bar in &chart.bars {
        let filled = if scale > 0.0 {
            ((bar.value / scale).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        output.push_str(&format!(
            "{:<width$} |{}{}| {:.2}{}",
            bar.label,
            "█".repeat(filled),
            " ".repeat(BAR_WIDTH - filled),
            bar.value,
            chart.unit,
            width = label_width
        ));
        if let Some(data_label) = &bar.data_label {
            output.push_str(&format!("  ({})", data_label));
        }
        output.push('\n');
    }
    output
}

/// Format the result list: chart for the latest record first, then one
/// card per record
pub fn format_results_readable(view: &ResultsView) -> String {
    let mut output = String::new();
    output.push_str("# Analysis Results\n\n");

    if view.cards.is_empty() {
        output.push_str("No results yet. Submit text, audio, video or a YouTube link.\n");
        return output;
    }

    if let Some(chart) = &view.chart {
        output.push_str(&format_chart(chart));
        output.push('\n');
    }

    for card in &view.cards {
        output.push_str(&format_card(card));
        output.push('\n');
    }

    output
}

pub fn format_youtube_readable(view: &YoutubeView) -> String {
    let mut output = String::new();
    output.push_str("# Analyze YouTube Comments\n\n");

    if view.details.is_none() && view.chart.is_none() {
        output.push_str("Paste a YouTube video link to analyze its comments.\n");
        return output;
    }

    if let Some(details) = &view.details {
        output.push_str(&format_card(details));
        output.push('\n');
    }

    if let Some(chart) = &view.chart {
        output.push_str(&format_chart(chart));
    }

    output
}
