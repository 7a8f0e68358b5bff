//! Dataset loading and feature scaling
//!
//! Reads headerless `word,label` CSV files into (feature vector, label)
//! pairs, skipping words that carry no signal, and provides the per-feature
//! min-max scaling applied to feature matrices before training.

use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::encoding;
use crate::error::NetworkError;

/// Load a `word,label` CSV file into feature vectors and labels.
///
/// Each word is normalized first; empty and non-informative words are
/// skipped (the provider's contract is to reject them before they reach the
/// network). A label that does not parse as a number aborts the whole load
/// with [`NetworkError::InvalidLabel`] rather than skipping the record.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<(Vec<Vec<f64>>, Vec<f64>), NetworkError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path.as_ref())?;

    let mut vectors = Vec::new();
    let mut labels = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let raw_word = record.get(0).ok_or(NetworkError::MalformedRecord(index))?;
        let raw_label = record.get(1).ok_or(NetworkError::MalformedRecord(index))?;

        let word = encoding::normalize(raw_word);
        if word.is_empty() || encoding::is_non_informative(&word) {
            debug!("skipping non-informative word '{}' in record {}", raw_word, index);
            continue;
        }

        let label: f64 = raw_label.trim().parse().map_err(|_| NetworkError::InvalidLabel {
            record: index,
            label: raw_label.to_string(),
        })?;

        vectors.push(encoding::word_to_vector(&word));
        labels.push(label);
    }

    Ok((vectors, labels))
}

/// How training and validation feature matrices are scaled.
///
/// `PerDataset` computes min-max bounds for each dataset separately, so
/// validation features are not guaranteed to be on the training scale.
/// `SharedWithTrain` applies the training bounds to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    PerDataset,
    SharedWithTrain,
}

impl Scaling {
    /// Scale both matrices according to the chosen strategy.
    pub fn apply(
        &self,
        train: &[Vec<f64>],
        validation: &[Vec<f64>],
    ) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        match self {
            Scaling::PerDataset => (min_max_normalize(train), min_max_normalize(validation)),
            Scaling::SharedWithTrain => {
                if train.is_empty() {
                    return (Vec::new(), min_max_normalize(validation));
                }
                let (mins, maxs) = feature_bounds(train);
                (
                    scale_with(train, &mins, &maxs),
                    scale_with(validation, &mins, &maxs),
                )
            }
        }
    }
}

/// Min-max scale every feature of a matrix to [0, 1].
///
/// Features with no spread (min == max) pass through unchanged.
pub fn min_max_normalize(dataset: &[Vec<f64>]) -> Vec<Vec<f64>> {
    if dataset.is_empty() {
        return Vec::new();
    }
    let (mins, maxs) = feature_bounds(dataset);
    scale_with(dataset, &mins, &maxs)
}

/// Per-feature minimum and maximum over a matrix.
fn feature_bounds(dataset: &[Vec<f64>]) -> (Vec<f64>, Vec<f64>) {
    let width = dataset[0].len();
    let mut mins = vec![f64::INFINITY; width];
    let mut maxs = vec![f64::NEG_INFINITY; width];

    for vector in dataset {
        for (j, &value) in vector.iter().enumerate() {
            if value < mins[j] {
                mins[j] = value;
            }
            if value > maxs[j] {
                maxs[j] = value;
            }
        }
    }

    (mins, maxs)
}

fn scale_with(dataset: &[Vec<f64>], mins: &[f64], maxs: &[f64]) -> Vec<Vec<f64>> {
    dataset
        .iter()
        .map(|vector| {
            vector
                .iter()
                .enumerate()
                .map(|(j, &value)| {
                    if maxs[j] > mins[j] {
                        (value - mins[j]) / (maxs[j] - mins[j])
                    } else {
                        value
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_dataset() {
        let file = write_csv("кот,1\ndata,0\nai,1\n");
        let (vectors, labels) = load_dataset(file.path()).unwrap();

        assert_eq!(vectors.len(), 3);
        assert_eq!(labels, vec![1.0, 0.0, 1.0]);
        assert_eq!(vectors[0].len(), encoding::VECTOR_SIZE);
    }

    #[test]
    fn test_load_dataset_skips_non_informative() {
        let file = write_csv("кот,1\n123,0\n...,1\ndata,0\n");
        let (vectors, labels) = load_dataset(file.path()).unwrap();

        assert_eq!(vectors.len(), 2);
        assert_eq!(labels, vec![1.0, 0.0]);
    }

    #[test]
    fn test_load_dataset_normalizes_words() {
        let file = write_csv("\"Кот!\",1\n");
        let (vectors, _) = load_dataset(file.path()).unwrap();

        assert_eq!(vectors, vec![encoding::word_to_vector("кот")]);
    }

    #[test]
    fn test_load_dataset_bad_label_aborts() {
        let file = write_csv("кот,1\ndata,maybe\nai,0\n");
        let result = load_dataset(file.path());

        assert!(matches!(
            result,
            Err(NetworkError::InvalidLabel { record: 1, .. })
        ));
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let result = load_dataset("no/such/file.csv");
        assert!(matches!(result, Err(NetworkError::Dataset(_))));
    }

    #[test]
    fn test_min_max_normalize() {
        let data = vec![vec![0.0, 10.0, 5.0], vec![4.0, 20.0, 5.0]];
        let normalized = min_max_normalize(&data);

        assert_eq!(normalized[0], vec![0.0, 0.0, 5.0]);
        assert_eq!(normalized[1], vec![1.0, 1.0, 5.0]);
    }

    #[test]
    fn test_min_max_normalize_empty() {
        assert!(min_max_normalize(&[]).is_empty());
    }

    #[test]
    fn test_scaling_per_dataset_is_independent() {
        let train = vec![vec![0.0], vec![10.0]];
        let validation = vec![vec![0.0], vec![100.0]];

        let (_, scaled_val) = Scaling::PerDataset.apply(&train, &validation);
        assert_eq!(scaled_val[1], vec![1.0]);
    }

    #[test]
    fn test_scaling_shared_uses_train_bounds() {
        let train = vec![vec![0.0], vec![10.0]];
        let validation = vec![vec![0.0], vec![100.0]];

        let (scaled_train, scaled_val) = Scaling::SharedWithTrain.apply(&train, &validation);
        assert_eq!(scaled_train[1], vec![1.0]);
        assert_eq!(scaled_val[1], vec![10.0]);
    }
}
