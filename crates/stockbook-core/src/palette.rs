//! # Palette Module
//!
//! Chart color configuration. Reports used to hard-code their hex values;
//! the palette is now data: a serde struct with built-in defaults that a
//! deployment can override from a JSON file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Chart colors for the report endpoints.
///
/// ## Structure
/// - `color_map`: named stock colors to hex values, used when grouping by
///   color so the bar matches the garment.
/// - `series`: rotating palette for customer/item/size charts.
/// - `fallback`: unknown color names.
/// - `profit` / `loss`: bar colors for the profit report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub color_map: BTreeMap<String, String>,
    pub series: Vec<String>,
    pub fallback: String,
    pub profit: String,
    pub loss: String,
}

impl Default for Palette {
    fn default() -> Self {
        let color_map = [
            ("Red", "#FF4757"),
            ("Blue", "#3742FA"),
            ("Black", "#2F3542"),
            ("White", "#A4B0BE"),
            ("Green", "#2ED573"),
            ("Yellow", "#FFA502"),
            ("Purple", "#8E44AD"),
            ("Orange", "#FF6348"),
            ("Pink", "#FF3838"),
            ("Brown", "#8B4513"),
            ("Grey", "#57606F"),
            ("Gray", "#57606F"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let series = [
            "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#FF9FF3", "#54A0FF",
            "#5F27CD", "#00D2D3", "#FF9F43", "#EE5A24", "#009432", "#0652DD", "#9980FA",
            "#FFC312", "#C4E538", "#12CBC4", "#FDA7DF", "#ED4C67", "#F79F1F",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Palette {
            color_map,
            series,
            fallback: "#6c757d".to_string(),
            profit: "#28a745".to_string(),
            loss: "#dc3545".to_string(),
        }
    }
}

impl Palette {
    /// Parses a palette override from JSON. Missing fields fall back to the
    /// built-in defaults via `#[serde(default)]`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Hex value for a named stock color, or the fallback.
    pub fn color_for_name(&self, name: &str) -> &str {
        self.color_map
            .get(name)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }

    /// Rotating series color for position `index`.
    pub fn series_color(&self, index: usize) -> &str {
        if self.series.is_empty() {
            return &self.fallback;
        }
        &self.series[index % self.series.len()]
    }

    /// Profit-report bar color: green for profit, red otherwise.
    pub fn profit_color(&self, profit_cents: i64) -> &str {
        if profit_cents > 0 {
            &self.profit
        } else {
            &self.loss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_lookup() {
        let p = Palette::default();
        assert_eq!(p.color_for_name("Red"), "#FF4757");
        assert_eq!(p.color_for_name("Chartreuse"), "#6c757d");
    }

    #[test]
    fn test_series_cycles() {
        let p = Palette::default();
        assert_eq!(p.series_color(0), p.series_color(p.series.len()));
    }

    #[test]
    fn test_profit_color_thresholds() {
        let p = Palette::default();
        assert_eq!(p.profit_color(100), "#28a745");
        assert_eq!(p.profit_color(0), "#dc3545");
        assert_eq!(p.profit_color(-100), "#dc3545");
    }

    #[test]
    fn test_partial_json_override_keeps_defaults() {
        let p = Palette::from_json(r##"{"fallback": "#000000"}"##).unwrap();
        assert_eq!(p.fallback, "#000000");
        assert_eq!(p.profit, "#28a745");
        assert!(!p.series.is_empty());
    }
}
