use gradinsight_protocol::DispersionData;
use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

/// Percentile columns of a dispersion chart, index-aligned with `labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispersionShape {
    pub year: Option<i32>,
    pub labels: Vec<Vec<String>>,
    pub p25: Vec<Option<f64>>,
    pub median: Vec<Option<f64>>,
    pub p75: Vec<Option<f64>>,
}

impl DispersionShape {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Lay out percentile bars in reply order. Values are copied untouched.
pub fn shape_dispersion(data: &DispersionData, label_wrap: usize) -> DispersionShape {
    DispersionShape {
        year: data.year,
        labels: data
            .series
            .iter()
            .map(|s| wrap_label(&s.label, label_wrap))
            .collect(),
        p25: data.series.iter().map(|s| s.p25).collect(),
        median: data.series.iter().map(|s| s.median).collect(),
        p75: data.series.iter().map(|s| s.p75).collect(),
    }
}

/// Word-wrap `label` into lines of at most `budget` graphemes.
///
/// Words longer than the budget are split; a zero budget disables wrapping.
pub fn wrap_label(label: &str, budget: usize) -> Vec<String> {
    if budget == 0 {
        return vec![label.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in label.split_whitespace() {
        let graphemes: Vec<&str> = word.graphemes(true).collect();

        if graphemes.len() > budget {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let mut pieces = graphemes.chunks(budget).map(|chunk| chunk.concat());
            let mut last = pieces.next().unwrap_or_default();
            for piece in pieces {
                lines.push(std::mem::replace(&mut last, piece));
            }
            current_len = last.graphemes(true).count();
            current = last;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_len = graphemes.len();
        } else if current_len + 1 + graphemes.len() <= budget {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + graphemes.len();
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = graphemes.len();
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
