// ============================================================
// Layer 3 — Classification Metrics
// ============================================================
// Pure functions from (true labels, raw logits) to evaluation
// numbers. Nothing here touches a tensor, a file or the
// terminal, so every value can be checked in a unit test and
// the CLI renderer only ever reads what was computed here.
//
// What gets computed:
//   - argmax predicted label per record
//   - softmax probability of the positive class
//   - 2×2 confusion matrix (rows = true, columns = predicted)
//   - per-class precision / recall / F1 / support
//   - weighted F1, positive-class precision and recall, accuracy
//   - ROC curve points and trapezoidal AUC
//   - a plain-text per-class classification report
//
// Conventions follow scikit-learn: zero division yields 0.0,
// the ROC curve starts at (0, 0) with an infinite threshold and
// drops collinear intermediate points.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::record::NUM_LABELS;

/// Raw model output for a labelled dataset, in dataset order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predictions {
    pub logits: Vec<[f32; NUM_LABELS]>,
    pub labels: Vec<u8>,
    /// Mean cross-entropy over the dataset, when the trainer reports one.
    pub loss:   Option<f64>,
}

impl Predictions {
    pub fn new(logits: Vec<[f32; NUM_LABELS]>, labels: Vec<u8>) -> Self {
        Self { logits, labels, loss: None }
    }

    pub fn with_loss(mut self, loss: f64) -> Self {
        self.loss = Some(loss);
        self
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Index of the largest logit per row. Ties resolve to the lowest index.
pub fn argmax(logits: &[[f32; NUM_LABELS]]) -> Vec<u8> {
    logits
        .iter()
        .map(|row| {
            let mut best = 0usize;
            for (i, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = i;
                }
            }
            best as u8
        })
        .collect()
}

/// Softmax probability of class 1 for each row.
pub fn positive_probabilities(logits: &[[f32; NUM_LABELS]]) -> Vec<f64> {
    logits
        .iter()
        .map(|row| {
            // Subtract the max for numerical stability
            let max = row.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v as f64));
            let exps: Vec<f64> = row.iter().map(|&v| (v as f64 - max).exp()).collect();
            let sum: f64 = exps.iter().sum();
            exps[1] / sum
        })
        .collect()
}

// ─── Confusion Matrix ─────────────────────────────────────────────────────────

/// Binary confusion matrix: `counts[true_label][predicted_label]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; NUM_LABELS]; NUM_LABELS],
}

impl ConfusionMatrix {
    /// Count (true, predicted) pairs. Labels outside {0, 1} are ignored.
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Self {
        assert_eq!(
            y_true.len(),
            y_pred.len(),
            "true and predicted labels must have the same length"
        );
        let mut counts = [[0usize; NUM_LABELS]; NUM_LABELS];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            let (t, p) = (t as usize, p as usize);
            if t < NUM_LABELS && p < NUM_LABELS {
                counts[t][p] += 1;
            }
        }
        Self { counts }
    }

    pub fn get(&self, true_label: usize, predicted_label: usize) -> usize {
        self.counts[true_label][predicted_label]
    }

    pub fn rows(&self) -> &[[usize; NUM_LABELS]; NUM_LABELS] {
        &self.counts
    }

    /// Row-major nested Vec, the shape the metrics dictionary stores.
    pub fn to_nested(&self) -> Vec<Vec<usize>> {
        self.counts.iter().map(|r| r.to_vec()).collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of records whose true label is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Number of records predicted as `class`.
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|r| r[class]).sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..NUM_LABELS).map(|c| self.counts[c][c]).sum();
        ratio(correct, self.total())
    }

    pub fn class_scores(&self, class: usize) -> ClassScores {
        let tp        = self.counts[class][class];
        let precision = ratio(tp, self.predicted(class));
        let recall    = ratio(tp, self.support(class));
        ClassScores {
            precision,
            recall,
            f1:      f1(precision, recall),
            support: self.support(class),
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    /// Prints like a numpy 2-D integer array: `[[2 0]\n [1 1]]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.max_count().to_string().len();
        for (i, row) in self.counts.iter().enumerate() {
            let open = if i == 0 { "[[" } else { " [" };
            write!(f, "{open}{:>width$} {:>width$}]", row[0], row[1])?;
            if i + 1 == NUM_LABELS {
                write!(f, "]")?;
            } else {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Precision, recall, F1 and support for one class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub support:   usize,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// F1 averaged over both classes, weighted by true-label support.
pub fn weighted_f1(cm: &ConfusionMatrix) -> f64 {
    weighted(cm, |s| s.f1)
}

/// Precision of the positive class.
pub fn precision(cm: &ConfusionMatrix) -> f64 {
    cm.class_scores(1).precision
}

/// Recall of the positive class.
pub fn recall(cm: &ConfusionMatrix) -> f64 {
    cm.class_scores(1).recall
}

pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    cm.accuracy()
}

fn weighted(cm: &ConfusionMatrix, pick: impl Fn(&ClassScores) -> f64) -> f64 {
    let total = cm.total();
    if total == 0 {
        return 0.0;
    }
    (0..NUM_LABELS)
        .map(|c| {
            let s = cm.class_scores(c);
            pick(&s) * s.support as f64
        })
        .sum::<f64>()
        / total as f64
}

fn macro_avg(cm: &ConfusionMatrix, pick: impl Fn(&ClassScores) -> f64) -> f64 {
    (0..NUM_LABELS).map(|c| pick(&cm.class_scores(c))).sum::<f64>() / NUM_LABELS as f64
}

// ─── ROC / AUC ────────────────────────────────────────────────────────────────

/// Receiver operating characteristic points, ordered by decreasing threshold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RocCurve {
    pub fpr:        Vec<f64>,
    pub tpr:        Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.fpr.iter().copied().zip(self.tpr.iter().copied())
    }
}

/// ROC curve of `scores` (probability of class 1) against binary `labels`.
///
/// One point per distinct score, collinear intermediate points
/// removed, and a leading `(0, 0)` point with threshold `+inf`.
/// When a class is absent its rate is undefined and comes out as NaN.
pub fn roc_curve(labels: &[u8], scores: &[f64]) -> RocCurve {
    let n = labels.len().min(scores.len());
    if n == 0 {
        return RocCurve::default();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    // Cumulative counts at the last index of each run of equal scores
    let mut tps        = Vec::new();
    let mut fps        = Vec::new();
    let mut thresholds = Vec::new();
    let (mut tp, mut fp) = (0i64, 0i64);
    for (pos, &i) in order.iter().enumerate() {
        if labels[i] == 1 { tp += 1 } else { fp += 1 }
        let run_ends = order
            .get(pos + 1)
            .map_or(true, |&next| scores[next] != scores[i]);
        if run_ends {
            tps.push(tp);
            fps.push(fp);
            thresholds.push(scores[i]);
        }
    }

    if tps.len() > 2 {
        let last = tps.len() - 1;
        let bends = |xs: &[i64], k: usize| xs[k + 1] - 2 * xs[k] + xs[k - 1] != 0;
        let keep: Vec<usize> = (0..tps.len())
            .filter(|&k| k == 0 || k == last || bends(&fps, k) || bends(&tps, k))
            .collect();
        tps        = keep.iter().map(|&k| tps[k]).collect();
        fps        = keep.iter().map(|&k| fps[k]).collect();
        thresholds = keep.iter().map(|&k| thresholds[k]).collect();
    }

    tps.insert(0, 0);
    fps.insert(0, 0);
    thresholds.insert(0, f64::INFINITY);

    let rate = |xs: &[i64]| -> Vec<f64> {
        let den = *xs.last().unwrap_or(&0);
        xs.iter()
            .map(|&x| if den > 0 { x as f64 / den as f64 } else { f64::NAN })
            .collect()
    };

    RocCurve { fpr: rate(&fps), tpr: rate(&tps), thresholds }
}

/// Area under a curve by the trapezoidal rule. NaN with fewer than two points.
pub fn auc(x: &[f64], y: &[f64]) -> f64 {
    if x.len() < 2 || x.len() != y.len() {
        return f64::NAN;
    }
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}

// ─── Classification Report ────────────────────────────────────────────────────

/// Per-class report in the layout scikit-learn prints.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub target_names: [String; NUM_LABELS],
    pub classes:      [ClassScores; NUM_LABELS],
    pub accuracy:     f64,
    pub macro_avg:    ClassScores,
    pub weighted_avg: ClassScores,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix, target_names: [&str; NUM_LABELS]) -> Self {
        let total = cm.total();
        Self {
            target_names: target_names.map(str::to_string),
            classes:      [cm.class_scores(0), cm.class_scores(1)],
            accuracy:     cm.accuracy(),
            macro_avg: ClassScores {
                precision: macro_avg(cm, |s| s.precision),
                recall:    macro_avg(cm, |s| s.recall),
                f1:        macro_avg(cm, |s| s.f1),
                support:   total,
            },
            weighted_avg: ClassScores {
                precision: weighted(cm, |s| s.precision),
                recall:    weighted(cm, |s| s.recall),
                f1:        weighted(cm, |s| s.f1),
                support:   total,
            },
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .target_names
            .iter()
            .map(String::len)
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or(12);

        let row = |f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores| {
            writeln!(
                f,
                "{name:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                s.precision, s.recall, s.f1, s.support
            )
        };

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}\n",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for (name, scores) in self.target_names.iter().zip(&self.classes) {
            row(f, name, scores)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.weighted_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

// ─── Metrics Dictionary ───────────────────────────────────────────────────────

/// A single entry in the evaluation dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Matrix(Vec<Vec<usize>>),
}

/// Metric name → value, as produced by one evaluation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvalMetrics {
    values: BTreeMap<String, MetricValue>,
}

impl EvalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_scalar(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), MetricValue::Scalar(value));
    }

    pub fn insert_matrix(&mut self, name: impl Into<String>, value: Vec<Vec<usize>>) {
        self.values.insert(name.into(), MetricValue::Matrix(value));
    }

    pub fn scalar(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            MetricValue::Scalar(v) => Some(*v),
            MetricValue::Matrix(_) => None,
        }
    }

    pub fn matrix(&self, name: &str) -> Option<&[Vec<usize>]> {
        match self.values.get(name)? {
            MetricValue::Matrix(m) => Some(m),
            MetricValue::Scalar(_) => None,
        }
    }

    /// Rename every key to `{prefix}_{key}`.
    pub fn with_prefix(self, prefix: &str) -> Self {
        let values = self
            .values
            .into_iter()
            .map(|(k, v)| (format!("{prefix}_{k}"), v))
            .collect();
        Self { values }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The metrics callback handed to the trainer: weighted F1 and
/// confusion matrix of the argmax predictions.
pub fn compute_metrics(predictions: &Predictions) -> EvalMetrics {
    let predicted = argmax(&predictions.logits);
    let cm        = ConfusionMatrix::from_labels(&predictions.labels, &predicted);

    let mut metrics = EvalMetrics::new();
    metrics.insert_scalar("f1", weighted_f1(&cm));
    metrics.insert_matrix("confusion_matrix", cm.to_nested());
    metrics
}

// ─── Full Evaluation ──────────────────────────────────────────────────────────

pub const REPORT_TARGET_NAMES: [&str; NUM_LABELS] = ["Fake Tweet", "Real Tweet"];

/// Everything the final report prints or plots, computed once.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub predicted:             Vec<u8>,
    pub confusion:             ConfusionMatrix,
    pub weighted_f1:           f64,
    pub precision:             f64,
    pub recall:                f64,
    pub accuracy:              f64,
    pub roc:                   RocCurve,
    pub auc:                   f64,
    pub classification_report: ClassificationReport,
}

impl EvaluationReport {
    pub fn from_predictions(predictions: &Predictions) -> Self {
        let predicted      = argmax(&predictions.logits);
        let positive_probs = positive_probabilities(&predictions.logits);
        let confusion      = ConfusionMatrix::from_labels(&predictions.labels, &predicted);
        let roc            = roc_curve(&predictions.labels, &positive_probs);
        let auc            = auc(&roc.fpr, &roc.tpr);

        Self {
            weighted_f1: weighted_f1(&confusion),
            precision:   precision(&confusion),
            recall:      recall(&confusion),
            accuracy:    accuracy(&confusion),
            classification_report: ClassificationReport::from_confusion(
                &confusion,
                REPORT_TARGET_NAMES,
            ),
            predicted,
            confusion,
            roc,
            auc,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // Logits whose argmax is [0, 1, 0, 0]
    fn sample_predictions() -> Predictions {
        Predictions::new(
            vec![[2.0, -1.0], [-0.5, 1.5], [0.3, 0.1], [1.0, 0.0]],
            vec![0, 1, 1, 0],
        )
    }

    #[test]
    fn test_argmax_picks_largest_and_first_on_tie() {
        let preds = argmax(&[[0.1, 0.9], [0.7, 0.2], [0.5, 0.5]]);
        assert_eq!(preds, vec![1, 0, 0]);
    }

    #[test]
    fn test_confusion_matrix_rows_are_true_labels() {
        let p  = sample_predictions();
        let cm = ConfusionMatrix::from_labels(&p.labels, &argmax(&p.logits));
        assert_eq!(cm.to_nested(), vec![vec![2, 0], vec![1, 1]]);
        assert_eq!(cm.total(), 4);
    }

    #[test]
    fn test_weighted_f1_matches_closed_form() {
        let p  = sample_predictions();
        let cm = ConfusionMatrix::from_labels(&p.labels, &argmax(&p.logits));

        // class 0: P = 2/3, R = 1   → F1 = 0.8
        // class 1: P = 1,   R = 1/2 → F1 = 2/3
        // both supports are 2
        let expected = (2.0 * 0.8 + 2.0 * (2.0 / 3.0)) / 4.0;
        assert!(close(weighted_f1(&cm), expected));
    }

    #[test]
    fn test_precision_recall_accuracy() {
        let p  = sample_predictions();
        let cm = ConfusionMatrix::from_labels(&p.labels, &argmax(&p.logits));
        assert!(close(precision(&cm), 1.0));
        assert!(close(recall(&cm), 0.5));
        assert!(close(accuracy(&cm), 0.75));
    }

    #[test]
    fn test_zero_division_gives_zero() {
        // Nothing predicted positive → positive precision is 0, not NaN
        let cm = ConfusionMatrix::from_labels(&[0, 1], &[0, 0]);
        assert_eq!(precision(&cm), 0.0);
        assert_eq!(cm.class_scores(1).f1, 0.0);
    }

    #[test]
    fn test_positive_probabilities_are_softmax() {
        let probs = positive_probabilities(&[[0.0, 0.0], [0.0, 1000.0], [3.0, 1.0]]);
        assert!(close(probs[0], 0.5));
        assert!(close(probs[1], 1.0));
        let expected = 1.0f64.exp() / (3.0f64.exp() + 1.0f64.exp());
        assert!(close(probs[2], expected));
    }

    #[test]
    fn test_roc_curve_matches_reference_points() {
        let roc = roc_curve(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]);
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.5, 0.5, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 0.5, 1.0, 1.0]);
        assert!(roc.thresholds[0].is_infinite());
        assert!(close(auc(&roc.fpr, &roc.tpr), 0.75));
    }

    #[test]
    fn test_roc_curve_drops_collinear_points() {
        // Perfect ranking: the two middle negatives lie on a straight segment
        let roc = roc_curve(&[1, 1, 0, 0, 0], &[0.9, 0.8, 0.3, 0.2, 0.1]);
        assert_eq!(roc.fpr, vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(roc.tpr, vec![0.0, 0.5, 1.0, 1.0]);
        assert!(close(auc(&roc.fpr, &roc.tpr), 1.0));
    }

    #[test]
    fn test_roc_curve_single_class_is_nan() {
        let roc = roc_curve(&[0, 0], &[0.2, 0.7]);
        assert!(roc.tpr.iter().all(|v| v.is_nan()));
        assert!(auc(&roc.fpr, &roc.tpr).is_nan());
    }

    #[test]
    fn test_compute_metrics_dictionary() {
        let m = compute_metrics(&sample_predictions()).with_prefix("eval");
        assert_eq!(m.matrix("eval_confusion_matrix").map(|r| r.to_vec()),
                   Some(vec![vec![2, 0], vec![1, 1]]));
        assert!(m.scalar("eval_f1").is_some());
        assert!(m.scalar("f1").is_none());
    }

    #[test]
    fn test_classification_report_layout() {
        let p      = sample_predictions();
        let report = EvaluationReport::from_predictions(&p).classification_report;
        let text   = report.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].ends_with("precision    recall  f1-score   support"));
        assert_eq!(lines[2], "  Fake Tweet       0.67      1.00      0.80         2");
        assert_eq!(lines[3], "  Real Tweet       1.00      0.50      0.67         2");
        assert_eq!(lines[5], "    accuracy                           0.75         4");
        assert_eq!(lines[7], "weighted avg       0.83      0.75      0.73         4");
    }

    #[test]
    fn test_confusion_matrix_display() {
        let cm = ConfusionMatrix::from_labels(&[0, 1, 1, 0], &[0, 1, 0, 0]);
        assert_eq!(cm.to_string(), "[[2 0]\n [1 1]]");
    }
}
