// ============================================================
// Layer 1 — Terminal Rendering
// ============================================================
// Text versions of the two evaluation figures:
//
//   confusion_heatmap — 2×2 grid, cells shaded by count
//                       rows = actual class, columns = predicted
//   roc_plot          — ROC curve against the chance diagonal,
//                       drawn with textplots braille charts
//
// Reference: textplots crate documentation

use textplots::{Chart, Plot, Shape};

use crate::application::classify_use_case::CLASS_NAMES;
use crate::domain::metrics::{ConfusionMatrix, RocCurve};

const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

fn shade(count: usize, max: usize) -> char {
    if max == 0 {
        return SHADES[0];
    }
    let level = (count * (SHADES.len() - 1) + max / 2) / max;
    SHADES[level.min(SHADES.len() - 1)]
}

/// Confusion matrix as a shaded grid with class names on both axes.
pub fn confusion_heatmap(cm: &ConfusionMatrix) -> String {
    let label_w = CLASS_NAMES.iter().map(|n| n.len()).max().unwrap_or(0);
    let cell_w  = label_w.max(cm.max_count().to_string().len() + 3);
    let max     = cm.max_count();

    let mut out = String::new();
    out.push_str(&format!("{:label_w$}   Predicted\n", ""));
    out.push_str(&format!("{:label_w$} ", "Actual"));
    for name in CLASS_NAMES {
        out.push_str(&format!(" {name:>cell_w$}"));
    }
    out.push('\n');

    for (actual, row) in cm.rows().iter().enumerate() {
        out.push_str(&format!("{:>label_w$} ", CLASS_NAMES[actual]));
        for &count in row {
            let fill = shade(count, max);
            let cell = format!("{fill}{fill} {count}");
            out.push_str(&format!(" {cell:>cell_w$}"));
        }
        out.push('\n');
    }
    out
}

/// ROC curve and the chance diagonal; the title carries the AUC.
pub fn roc_plot(roc: &RocCurve, auc: f64) -> String {
    let curve: Vec<(f32, f32)> = roc
        .points()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(x, y)| (x as f32, y as f32))
        .collect();

    if curve.is_empty() {
        return "ROC curve undefined: the test set contains a single class\n".to_string();
    }

    let diagonal   = [(0.0f32, 0.0f32), (1.0, 1.0)];
    let roc_shape  = Shape::Lines(&curve);
    let diag_shape = Shape::Lines(&diagonal);

    let mut chart = Chart::new_with_y_range(120, 60, 0.0, 1.0, 0.0, 1.0);
    let chart = chart.lineplot(&roc_shape).lineplot(&diag_shape);
    chart.axis();
    chart.figures();

    format!(
        "Receiver Operating Characteristic (ROC) Curve\n\
         ROC curve (area = {auc:.2})\n{chart}\n\
         x: False Positive Rate   y: True Positive Rate   ({} thresholds)\n",
        roc.thresholds.len()
    )
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::{auc, roc_curve};

    #[test]
    fn test_shade_levels() {
        assert_eq!(shade(0, 10), ' ');
        assert_eq!(shade(10, 10), '█');
        assert_eq!(shade(5, 10), '▒');
        assert_eq!(shade(3, 0), ' ');
    }

    #[test]
    fn test_heatmap_lists_counts_and_names() {
        let cm  = ConfusionMatrix::from_labels(&[0, 0, 1, 1], &[0, 0, 0, 1]);
        let out = confusion_heatmap(&cm);

        assert!(out.contains("Predicted"));
        assert!(out.contains("Actual"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].trim_start().starts_with("Non-Disaster"));
        assert!(lines[2].contains("██ 2"));
        assert!(lines[3].trim_start().starts_with("Disaster"));
        assert!(lines[3].ends_with("1"));
    }

    #[test]
    fn test_roc_plot_has_title_with_auc() {
        let labels = [0u8, 0, 1, 1];
        let scores = [0.1, 0.4, 0.35, 0.8];
        let roc    = roc_curve(&labels, &scores);
        let out    = roc_plot(&roc, auc(&roc.fpr, &roc.tpr));
        assert!(out.contains("ROC curve (area = 0.75)"));
        assert!(out.contains(&format!("({} thresholds)", roc.thresholds.len())));
        assert!(out.lines().count() > 10);
    }

    #[test]
    fn test_roc_plot_single_class() {
        let roc = roc_curve(&[1, 1], &[0.2, 0.9]);
        assert!(roc_plot(&roc, f64::NAN).contains("undefined"));
    }
}
