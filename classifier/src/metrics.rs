//! Evaluation metrics for binary predictions.

use std::fmt;

use serde::Serialize;

use crate::Label;

/// Fraction of predictions equal to the truth. Empty input yields 0.
pub fn accuracy(truth: &[Label], predicted: &[Label]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = truth.iter().zip(predicted).filter(|(t, p)| t == p).count();
    hits as f64 / truth.len() as f64
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class and averaged metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: [f64; 3],
    pub weighted_avg: [f64; 3],
    pub support: usize,
}

impl ClassificationReport {
    pub fn new(truth: &[Label], predicted: &[Label]) -> Self {
        let classes = Label::ALL.map(|label| class_metrics(label, truth, predicted));
        let support = truth.len();

        let mut macro_avg = [0.0; 3];
        let mut weighted_avg = [0.0; 3];
        for c in &classes {
            let vals = [c.precision, c.recall, c.f1];
            for k in 0..3 {
                macro_avg[k] += vals[k] / classes.len() as f64;
                if support > 0 {
                    weighted_avg[k] += vals[k] * c.support as f64 / support as f64;
                }
            }
        }

        Self {
            classes,
            accuracy: accuracy(truth, predicted),
            macro_avg,
            weighted_avg,
            support,
        }
    }
}

fn class_metrics(label: Label, truth: &[Label], predicted: &[Label]) -> ClassMetrics {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (t, p) in truth.iter().zip(predicted) {
        match (*t == label, *p == label) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }
    let ratio = |a: usize, b: usize| if b == 0 { 0.0 } else { a as f64 / b as f64 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };
    ClassMetrics {
        label,
        precision,
        recall,
        f1,
        support: tp + fn_,
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label.as_str(),
                c.precision,
                c.recall,
                c.f1,
                c.support
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{:>14} {:>9} {:>9} {:>9.2} {:>9}", "accuracy", "", "", self.accuracy, self.support)?;
        for (name, avg) in [("macro avg", self.macro_avg), ("weighted avg", self.weighted_avg)] {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg[0], avg[1], avg[2], self.support
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Fake, Real};

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&[Real, Fake, Fake, Real], &[Real, Fake, Real, Real]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_report() {
        let truth = [Real, Real, Fake, Fake];
        let pred = [Real, Fake, Fake, Fake];
        let r = ClassificationReport::new(&truth, &pred);

        let real = r.classes[0];
        assert_eq!(real.label, Real);
        assert_eq!(real.precision, 1.0);
        assert_eq!(real.recall, 0.5);
        assert_eq!(real.support, 2);

        let fake = r.classes[1];
        assert!((fake.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(fake.recall, 1.0);
        assert_eq!(r.accuracy, 0.75);

        let text = r.to_string();
        assert!(text.contains("REAL"));
        assert!(text.contains("weighted avg"));
    }

    #[test]
    fn absent_class_scores_zero() {
        let r = ClassificationReport::new(&[Real, Real], &[Real, Real]);
        assert_eq!(r.classes[1].precision, 0.0);
        assert_eq!(r.classes[1].support, 0);
    }
}
