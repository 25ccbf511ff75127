//! Evaluation metrics.
//!
//! The reported metric is macro accuracy: per-class recall averaged over the
//! classes that actually appear in the evaluation set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::Result;

/// Confusion matrix accumulated over an evaluation run (actual x predicted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: Vec<Vec<usize>>,
    num_classes: usize,
}

impl ConfusionMatrix {
    /// Creates an empty confusion matrix for `num_classes` classes
    pub fn new(num_classes: usize) -> Self {
        Self {
            counts: vec![vec![0; num_classes]; num_classes],
            num_classes,
        }
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Records a single prediction. Out-of-range labels are ignored.
    pub fn record(&mut self, actual: usize, predicted: usize) {
        if actual < self.num_classes && predicted < self.num_classes {
            self.counts[actual][predicted] += 1;
        }
    }

    /// Total number of recorded samples
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of correctly classified samples
    pub fn correct(&self) -> usize {
        (0..self.num_classes).map(|i| self.counts[i][i]).sum()
    }

    /// Overall (micro) accuracy in [0, 1]. Zero when no samples recorded.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.correct() as f64 / total as f64
    }

    /// Per-class recall. `None` for classes with no samples in the matrix.
    pub fn per_class_recall(&self) -> Vec<Option<f64>> {
        (0..self.num_classes)
            .map(|class_id| {
                let support: usize = self.counts[class_id].iter().sum();
                if support == 0 {
                    None
                } else {
                    Some(self.counts[class_id][class_id] as f64 / support as f64)
                }
            })
            .collect()
    }

    /// Macro accuracy: per-class recall averaged over classes with support.
    ///
    /// Returns a value in [0, 1]. Zero when the matrix is empty.
    pub fn macro_accuracy(&self) -> f64 {
        let recalls: Vec<f64> = self.per_class_recall().into_iter().flatten().collect();
        if recalls.is_empty() {
            return 0.0;
        }
        recalls.iter().sum::<f64>() / recalls.len() as f64
    }

    /// Raw counts, row = actual class, column = predicted class
    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }
}

/// Per-class entry of an evaluation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassReport {
    pub name: String,
    pub support: usize,
    /// Recall in [0, 1], `None` when the class has no samples
    pub recall: Option<f64>,
}

/// Evaluation summary persisted alongside the model checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total_samples: usize,
    pub accuracy: f64,
    pub macro_accuracy: f64,
    pub classes: Vec<ClassReport>,
}

impl EvaluationReport {
    /// Build a report from a confusion matrix and the class names in index order
    pub fn from_matrix(matrix: &ConfusionMatrix, class_names: &[String]) -> Self {
        let recalls = matrix.per_class_recall();
        let classes = (0..matrix.num_classes())
            .map(|idx| ClassReport {
                name: class_names.get(idx).cloned().unwrap_or_default(),
                support: matrix.counts()[idx].iter().sum(),
                recall: recalls[idx],
            })
            .collect();

        Self {
            total_samples: matrix.total(),
            accuracy: matrix.accuracy(),
            macro_accuracy: matrix.macro_accuracy(),
            classes,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_matrix() {
        let matrix = ConfusionMatrix::new(3);
        assert_eq!(matrix.total(), 0);
        assert_eq!(matrix.accuracy(), 0.0);
        assert_eq!(matrix.macro_accuracy(), 0.0);
    }

    #[test]
    fn test_record_and_accuracy() {
        let mut matrix = ConfusionMatrix::new(2);
        matrix.record(0, 0);
        matrix.record(0, 0);
        matrix.record(1, 0);
        matrix.record(1, 1);

        assert_eq!(matrix.total(), 4);
        assert_eq!(matrix.correct(), 3);
        assert!((matrix.accuracy() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_macro_accuracy_is_mean_recall() {
        let mut matrix = ConfusionMatrix::new(2);
        // Class 0: 2/2 correct, class 1: 1/2 correct
        matrix.record(0, 0);
        matrix.record(0, 0);
        matrix.record(1, 0);
        matrix.record(1, 1);

        // Macro accuracy = (1.0 + 0.5) / 2
        assert!((matrix.macro_accuracy() - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_macro_accuracy_ignores_absent_classes() {
        let mut matrix = ConfusionMatrix::new(3);
        // Class 2 never appears
        matrix.record(0, 0);
        matrix.record(1, 2);

        let recalls = matrix.per_class_recall();
        assert_eq!(recalls[2], None);
        // (1.0 + 0.0) / 2, class 2 excluded
        assert!((matrix.macro_accuracy() - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_macro_accuracy_bounds() {
        let mut matrix = ConfusionMatrix::new(4);
        for actual in 0..4 {
            for predicted in 0..4 {
                matrix.record(actual, predicted);
            }
        }

        let acc = matrix.macro_accuracy();
        assert!((0.0..=1.0).contains(&acc));
    }

    #[test]
    fn test_out_of_range_ignored() {
        let mut matrix = ConfusionMatrix::new(2);
        matrix.record(5, 0);
        matrix.record(0, 5);
        assert_eq!(matrix.total(), 0);
    }

    #[test]
    fn test_report_from_matrix() {
        let mut matrix = ConfusionMatrix::new(2);
        matrix.record(0, 0);
        matrix.record(0, 1);
        matrix.record(1, 1);

        let names = vec!["cat".to_string(), "dog".to_string()];
        let report = EvaluationReport::from_matrix(&matrix, &names);

        assert_eq!(report.total_samples, 3);
        assert_eq!(report.classes.len(), 2);
        assert_eq!(report.classes[0].name, "cat");
        assert_eq!(report.classes[0].support, 2);
        assert_eq!(report.classes[0].recall, Some(0.5));
        assert_eq!(report.classes[1].recall, Some(1.0));
        assert!((report.macro_accuracy - 0.75).abs() < 1e-10);
    }

    #[test]
    fn test_report_json_round_trip() {
        let mut matrix = ConfusionMatrix::new(2);
        matrix.record(0, 0);
        matrix.record(1, 0);

        let names = vec!["cat".to_string(), "dog".to_string()];
        let report = EvaluationReport::from_matrix(&matrix, &names);

        let path = std::env::temp_dir().join("cifar-classifier-test-report.json");
        report.write_json(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        let loaded: EvaluationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.total_samples, 2);
        assert_eq!(loaded.classes[1].recall, Some(0.0));

        let _ = std::fs::remove_file(&path);
    }
}
