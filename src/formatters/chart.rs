use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::config::ChartStyle;
use crate::languages::LanguageTable;
use crate::types::LanguageTally;

/// Chart.js description of the tally: parallel `labels`, `data` and
/// `backgroundColor` arrays in tally order, plus fixed styling.
///
/// # Errors
/// Returns an error if a language in the tally has no configured color.
pub fn payload(languages: &LanguageTally, table: &LanguageTable, style: &ChartStyle) -> Result<Value> {
    let labels: Vec<&str> = languages.keys().map(String::as_str).collect();
    let data: Vec<usize> = languages.values().copied().collect();
    let colors = labels
        .iter()
        .map(|lang| {
            table
                .color_for(lang)
                .ok_or_else(|| anyhow!("no color configured for {lang}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(json!({
        "type": style.kind,
        "data": {
            "labels": labels,
            "datasets": [{
                "data": data,
                "backgroundColor": colors,
                "borderWidth": style.border_width,
            }],
        },
        "options": {
            "cutoutPercentage": style.cutout_percentage,
            "plugins": {
                "datalabels": { "display": style.show_datalabels },
            },
            "legend": {
                "display": style.legend_display,
                "position": style.legend_position,
                "align": style.legend_align,
                "labels": {
                    "fontSize": style.legend_font_size,
                    "fontStyle": style.legend_font_style,
                    "padding": style.legend_padding,
                },
            },
        },
    }))
}

/// The request body the charting service expects.
pub fn envelope(chart: Value) -> Value {
    json!({ "chart": chart })
}

/// Compact serialization, no whitespace between tokens.
pub fn format(chart: &Value) -> Result<String> {
    Ok(serde_json::to_string(chart)?)
}
