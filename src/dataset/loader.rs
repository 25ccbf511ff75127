//! Sample enumeration, labeling, and splitting.
//!
//! Samples are image files found anywhere under the cache directory. The
//! label is the name of the file's parent directory. Train and test are
//! selected by substring match on the full path ("train" / "test"), the way
//! the dataset lays out its tree; a path containing neither substring is
//! dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::utils::error::{Error, Result};

/// A single labeled image sample
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label, taken from the parent directory name
    pub label: String,
}

impl Sample {
    /// Creates a new sample
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

/// Derive the label for an image path from its parent directory name.
///
/// Returns `None` when the parent name is missing, empty, or not valid
/// UTF-8.
pub fn extract_label(path: &Path) -> Option<String> {
    let name = path.parent()?.file_name()?.to_str()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Whether a path has a `jpg` extension (case-insensitive)
pub fn is_jpg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("jpg"))
        .unwrap_or(false)
}

/// Recursively enumerate all labeled jpg samples under `root`.
pub fn enumerate_samples(root: &Path) -> Result<Vec<Sample>> {
    if !root.exists() {
        return Err(Error::Dataset(format!(
            "dataset directory does not exist: {:?}",
            root
        )));
    }

    let mut samples = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_jpg(path) {
            continue;
        }
        match extract_label(path) {
            Some(label) => samples.push(Sample::new(path, label)),
            None => debug!("Skipping file without a label directory: {:?}", path),
        }
    }

    info!("Enumerated {} samples under {:?}", samples.len(), root);
    Ok(samples)
}

/// Shuffle samples with a seeded generator and optionally truncate.
///
/// The same seed over the same input always produces the same order.
pub fn shuffle_and_truncate(samples: &mut Vec<Sample>, seed: u64, max_samples: Option<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    samples.shuffle(&mut rng);
    if let Some(max) = max_samples {
        samples.truncate(max);
    }
}

/// Samples partitioned into train and test sets
#[derive(Debug, Clone)]
pub struct SplitSamples {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

/// Partition samples by substring match on the path.
///
/// Train and test are selected independently: a path containing both
/// substrings lands in both sets, a path containing neither is dropped.
pub fn split_samples(samples: Vec<Sample>) -> SplitSamples {
    let train = samples
        .iter()
        .filter(|s| s.path.to_string_lossy().contains("train"))
        .cloned()
        .collect();
    let test = samples
        .into_iter()
        .filter(|s| s.path.to_string_lossy().contains("test"))
        .collect();

    SplitSamples { train, test }
}

/// Mapping between string labels and contiguous class indices.
///
/// Labels are sorted so the mapping is stable regardless of enumeration
/// order, and shared between the train and test splits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassVocabulary {
    classes: Vec<String>,
    class_to_idx: HashMap<String, usize>,
}

impl ClassVocabulary {
    /// Build a vocabulary from the labels present in `samples`
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut classes: Vec<String> = samples.iter().map(|s| s.label.clone()).collect();
        classes.sort();
        classes.dedup();

        let class_to_idx = classes
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        Self {
            classes,
            class_to_idx,
        }
    }

    /// Index for a label, if known
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.class_to_idx.get(label).copied()
    }

    /// Label for an index, if in range
    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(|s| s.as_str())
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// All class names in index order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Statistics about an enumerated sample set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total_samples: usize,
    pub num_classes: usize,
    /// Sample count per class, in vocabulary index order
    pub class_counts: Vec<usize>,
    pub class_names: Vec<String>,
}

impl DatasetStats {
    /// Compute statistics for a sample set against a vocabulary
    pub fn compute(samples: &[Sample], vocab: &ClassVocabulary) -> Self {
        let mut class_counts = vec![0usize; vocab.len()];
        for sample in samples {
            if let Some(idx) = vocab.index_of(&sample.label) {
                class_counts[idx] += 1;
            }
        }

        Self {
            total_samples: samples.len(),
            num_classes: vocab.len(),
            class_counts,
            class_names: vocab.classes().to_vec(),
        }
    }

    /// Print statistics to the console
    pub fn print(&self) {
        println!("Dataset statistics:");
        println!("  Total samples: {}", self.total_samples);
        println!("  Classes:       {}", self.num_classes);
        for (name, count) in self.class_names.iter().zip(&self.class_counts) {
            println!("    {:12} {:>6}", name, count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(path: &str) -> Sample {
        let path = PathBuf::from(path);
        let label = extract_label(&path).unwrap();
        Sample { path, label }
    }

    #[test]
    fn test_extract_label_is_parent_dir() {
        assert_eq!(
            extract_label(Path::new("/data/train/cat/0001.jpg")),
            Some("cat".to_string())
        );
        assert_eq!(
            extract_label(Path::new("data/test/truck/42.jpg")),
            Some("truck".to_string())
        );
    }

    #[test]
    fn test_extract_label_missing_parent() {
        assert_eq!(extract_label(Path::new("lonely.jpg")), None);
        assert_eq!(extract_label(Path::new("/0001.jpg")), None);
    }

    #[test]
    fn test_is_jpg() {
        assert!(is_jpg(Path::new("a/b.jpg")));
        assert!(is_jpg(Path::new("a/b.JPG")));
        assert!(!is_jpg(Path::new("a/b.png")));
        assert!(!is_jpg(Path::new("a/b")));
    }

    #[test]
    fn test_shuffle_is_deterministic() {
        let make = || {
            vec![
                sample("/d/train/cat/1.jpg"),
                sample("/d/train/cat/2.jpg"),
                sample("/d/train/dog/3.jpg"),
                sample("/d/train/dog/4.jpg"),
                sample("/d/train/frog/5.jpg"),
            ]
        };

        let mut first = make();
        let mut second = make();
        shuffle_and_truncate(&mut first, 0, None);
        shuffle_and_truncate(&mut second, 0, None);

        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_truncate_limits_sample_count() {
        let mut samples = vec![
            sample("/d/train/cat/1.jpg"),
            sample("/d/train/cat/2.jpg"),
            sample("/d/train/dog/3.jpg"),
        ];
        shuffle_and_truncate(&mut samples, 0, Some(2));
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_split_is_disjoint_partition() {
        let samples = vec![
            sample("/d/train/cat/1.jpg"),
            sample("/d/test/cat/2.jpg"),
            sample("/d/train/dog/3.jpg"),
            sample("/d/test/dog/4.jpg"),
        ];

        let split = split_samples(samples.clone());
        assert_eq!(split.train.len() + split.test.len(), samples.len());
        for s in &split.train {
            assert!(!split.test.contains(s));
        }
    }

    #[test]
    fn test_split_drops_unmatched_paths() {
        let samples = vec![
            sample("/d/train/cat/1.jpg"),
            sample("/d/other/cat/2.jpg"),
        ];

        let split = split_samples(samples);
        assert_eq!(split.train.len(), 1);
        assert_eq!(split.test.len(), 0);
    }

    #[test]
    fn test_vocabulary_sorted_and_contiguous() {
        let samples = vec![
            sample("/d/train/truck/1.jpg"),
            sample("/d/train/airplane/2.jpg"),
            sample("/d/train/cat/3.jpg"),
            sample("/d/train/airplane/4.jpg"),
        ];

        let vocab = ClassVocabulary::from_samples(&samples);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.index_of("airplane"), Some(0));
        assert_eq!(vocab.index_of("cat"), Some(1));
        assert_eq!(vocab.index_of("truck"), Some(2));
        assert_eq!(vocab.name_of(2), Some("truck"));
        assert_eq!(vocab.index_of("ship"), None);
    }

    #[test]
    fn test_dataset_stats() {
        let samples = vec![
            sample("/d/train/cat/1.jpg"),
            sample("/d/train/cat/2.jpg"),
            sample("/d/train/dog/3.jpg"),
        ];
        let vocab = ClassVocabulary::from_samples(&samples);
        let stats = DatasetStats::compute(&samples, &vocab);

        assert_eq!(stats.total_samples, 3);
        assert_eq!(stats.num_classes, 2);
        assert_eq!(stats.class_counts, vec![2, 1]);
    }

    #[test]
    fn test_enumerate_missing_dir_fails() {
        let missing = std::env::temp_dir().join("cifar-classifier-test-no-such-dir");
        assert!(enumerate_samples(&missing).is_err());
    }
}
