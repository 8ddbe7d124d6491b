//! Classification metrics computed on a held-out split.

use core::fmt;

use iris_data::{CLASS_COUNT, Species};
use serde::{Deserialize, Serialize};

/// Precision, recall and F1 for a single class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true samples of this class.
    pub support: usize,
}

/// Accuracy plus a per-class breakdown, with macro and support-weighted averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: [ClassMetrics; CLASS_COUNT],
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Fraction of predictions that match the truth. Empty input scores 0.
#[must_use]
pub fn accuracy(truth: &[Species], predicted: &[Species]) -> f64 {
    let total = truth.len().min(predicted.len());
    if total == 0 {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted)
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / total as f64
}

/// Ratio that treats a zero denominator as a zero score.
fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl ClassificationReport {
    /// Builds the report from paired truth/prediction labels.
    #[must_use]
    pub fn new(truth: &[Species], predicted: &[Species]) -> Self {
        let mut per_class = [ClassMetrics {
            precision: 0.0,
            recall: 0.0,
            f1: 0.0,
            support: 0,
        }; CLASS_COUNT];

        for species in Species::ALL {
            let pairs = truth.iter().zip(predicted);
            let tp = pairs
                .clone()
                .filter(|&(t, p)| *t == species && *p == species)
                .count();
            let predicted_pos = pairs.clone().filter(|&(_, p)| *p == species).count();
            let support = pairs.filter(|&(t, _)| *t == species).count();

            let precision = ratio(tp, predicted_pos);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };

            per_class[species.index()] = ClassMetrics {
                precision,
                recall,
                f1,
                support,
            };
        }

        let total: usize = per_class.iter().map(|m| m.support).sum();
        let average = |weight: &dyn Fn(&ClassMetrics) -> f64, norm: f64| {
            let mean = |field: fn(&ClassMetrics) -> f64| {
                if norm == 0.0 {
                    0.0
                } else {
                    per_class.iter().map(|m| field(m) * weight(m)).sum::<f64>() / norm
                }
            };
            ClassMetrics {
                precision: mean(|m: &ClassMetrics| m.precision),
                recall: mean(|m: &ClassMetrics| m.recall),
                f1: mean(|m: &ClassMetrics| m.f1),
                support: total,
            }
        };

        let macro_avg = average(&|_: &ClassMetrics| 1.0, CLASS_COUNT as f64);
        let weighted_avg = average(&|m: &ClassMetrics| m.support as f64, total as f64);

        Self {
            accuracy: accuracy(truth, predicted),
            per_class,
            macro_avg,
            weighted_avg,
        }
    }

    /// Number of evaluated samples.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.macro_avg.support
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = |f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics| {
            writeln!(
                f,
                "{name:>12} {:>10.2} {:>9.2} {:>9.2} {:>9}",
                m.precision, m.recall, m.f1, m.support
            )
        };

        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for species in Species::ALL {
            row(f, species.name(), &self.per_class[species.index()])?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.total()
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use iris_data::Species::{Setosa, Versicolor, Virginica};

    #[test]
    fn test_accuracy() {
        assert!((accuracy(&[Setosa, Versicolor], &[Setosa, Virginica]) - 0.5).abs() < 1e-12);
        assert!(accuracy(&[], &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_perfect_report() {
        let labels = [Setosa, Versicolor, Virginica, Virginica];
        let report = ClassificationReport::new(&labels, &labels);

        assert!((report.accuracy - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.per_class[Virginica.index()].support, 2);
        assert!((report.macro_avg.f1 - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn test_report_with_mistakes() {
        let truth = [Setosa, Setosa, Versicolor, Virginica];
        let predicted = [Setosa, Versicolor, Versicolor, Versicolor];
        let report = ClassificationReport::new(&truth, &predicted);

        let setosa = report.per_class[Setosa.index()];
        assert!((setosa.precision - 1.0).abs() < 1e-12);
        assert!((setosa.recall - 0.5).abs() < 1e-12);

        let versicolor = report.per_class[Versicolor.index()];
        assert!((versicolor.precision - 1.0 / 3.0).abs() < 1e-12);
        assert!((versicolor.recall - 1.0).abs() < 1e-12);

        // Never predicted, so precision and F1 fall back to zero.
        let virginica = report.per_class[Virginica.index()];
        assert!(virginica.precision.abs() < f64::EPSILON);
        assert!(virginica.f1.abs() < f64::EPSILON);

        assert!((report.accuracy - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_display_lists_every_class() {
        let labels = [Setosa, Versicolor, Virginica];
        let text = ClassificationReport::new(&labels, &labels).to_string();

        for species in Species::ALL {
            assert!(text.contains(species.name()));
        }
        assert!(text.contains("weighted avg"));
        assert!(text.contains("1.00"));
    }
}
