//! Iris dataset crate.
//!
//! Provides the built-in Iris measurements, the validated feature vector
//! the classifier consumes, and a seeded train/test split.

use core::fmt;
use core::str::FromStr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Serialize, Serializer};

mod table;

/// The number of features per sample.
///
/// Sepal length, sepal width, petal length and petal width, in centimetres.
pub const FEATURE_COUNT: usize = 4;

/// The number of target classes.
pub const CLASS_COUNT: usize = 3;

/// Human readable feature names, in column order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "sepal length (cm)",
    "sepal width (cm)",
    "petal length (cm)",
    "petal width (cm)",
];

/// Errors produced while building feature vectors or splitting data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("expected {expected} features, got {got}")]
    WrongArity { expected: usize, got: usize },

    #[error("feature {index} ({name}) is not a finite number")]
    NonFinite { index: usize, name: &'static str },

    #[error("could not parse feature {index} from {raw:?}")]
    Parse { index: usize, raw: String },

    #[error("test ratio must leave at least one sample on each side, got {0}")]
    InvalidTestRatio(f64),
}

/// One of the three Iris species.
///
/// The discriminant is the integer label used for training and returned
/// by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    Setosa = 0,
    Versicolor = 1,
    Virginica = 2,
}

impl Species {
    /// All species in label order.
    pub const ALL: [Self; CLASS_COUNT] = [Self::Setosa, Self::Versicolor, Self::Virginica];

    /// Returns the integer label for this species.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the species for an integer label.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Setosa),
            1 => Some(Self::Versicolor),
            2 => Some(Self::Virginica),
            _ => None,
        }
    }

    /// Returns the lowercase species name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Setosa => "setosa",
            Self::Versicolor => "versicolor",
            Self::Virginica => "virginica",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Serialized as the bare label so responses read `{"prediction": 0}`.
impl Serialize for Species {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A validated Iris feature vector.
///
/// Always holds exactly [`FEATURE_COUNT`] finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    /// Creates a feature vector, rejecting NaN and infinite values.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NonFinite`] if any value is not finite.
    pub fn new(values: [f32; FEATURE_COUNT]) -> Result<Self, DataError> {
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DataError::NonFinite {
                index,
                name: FEATURE_NAMES[index],
            });
        }
        Ok(Self(values))
    }

    /// Returns the raw feature values.
    #[must_use]
    pub const fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }
}

impl TryFrom<&[f64]> for FeatureVector {
    type Error = DataError;

    fn try_from(values: &[f64]) -> Result<Self, Self::Error> {
        let array: [f64; FEATURE_COUNT] =
            values.try_into().map_err(|_| DataError::WrongArity {
                expected: FEATURE_COUNT,
                got: values.len(),
            })?;

        // Values beyond f32 range become infinite here and are rejected below.
        Self::new(array.map(|v| v as f32))
    }
}

impl FromStr for FeatureVector {
    type Err = DataError;

    /// Parses a comma separated list such as `5.1,3.5,1.4,0.2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(str::trim)
            .enumerate()
            .map(|(index, raw)| {
                raw.parse::<f64>().map_err(|_| DataError::Parse {
                    index,
                    raw: raw.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::try_from(values.as_slice())
    }
}

/// A labelled Iris sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub features: FeatureVector,
    pub species: Species,
}

/// Loads the full 150-sample Iris dataset in its canonical order.
#[must_use]
pub fn load_iris() -> Vec<Sample> {
    table::ROWS
        .iter()
        .filter_map(|&(values, label)| {
            Some(Sample {
                features: FeatureVector(values),
                species: Species::from_index(label as usize)?,
            })
        })
        .collect()
}

/// Train and test partitions of a dataset.
#[derive(Debug, Clone, Default)]
pub struct Split {
    pub train: Vec<Sample>,
    pub test: Vec<Sample>,
}

/// Shuffles `samples` with a seeded RNG and partitions them.
///
/// The test partition receives `ceil(test_ratio * n)` samples, the rest go
/// to training. The same `seed` always yields the same partitions.
///
/// # Errors
///
/// Returns [`DataError::InvalidTestRatio`] if either partition would be empty.
pub fn train_test_split(
    samples: &[Sample],
    test_ratio: f64,
    seed: u64,
) -> Result<Split, DataError> {
    let n = samples.len();
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(DataError::InvalidTestRatio(test_ratio));
    }

    let n_test = (test_ratio * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DataError::InvalidTestRatio(test_ratio));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    let pick = |idx: &[usize]| idx.iter().filter_map(|&i| samples.get(i).copied()).collect();

    Ok(Split {
        train: pick(train_idx),
        test: pick(test_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_iris() {
        let samples = load_iris();
        assert_eq!(samples.len(), 150);

        for species in Species::ALL {
            let count = samples.iter().filter(|s| s.species == species).count();
            assert_eq!(count, 50, "{species} should have 50 samples");
        }

        assert_eq!(samples[0].features.values(), &[5.1, 3.5, 1.4, 0.2]);
        assert_eq!(samples[0].species, Species::Setosa);
    }

    #[test]
    fn test_split_sizes() {
        let samples = load_iris();
        let split = train_test_split(&samples, 0.2, 42).expect("valid ratio");
        assert_eq!(split.train.len(), 120);
        assert_eq!(split.test.len(), 30);
    }

    #[test]
    fn test_split_is_deterministic() {
        let samples = load_iris();
        let a = train_test_split(&samples, 0.2, 42).expect("valid ratio");
        let b = train_test_split(&samples, 0.2, 42).expect("valid ratio");
        let c = train_test_split(&samples, 0.2, 7).expect("valid ratio");

        assert_eq!(a.test, b.test);
        assert_eq!(a.train, b.train);
        assert_ne!(a.test, c.test);
    }

    #[test]
    fn test_split_rejects_degenerate_ratio() {
        let samples = load_iris();
        assert_eq!(
            train_test_split(&samples, 0.0, 42).err(),
            Some(DataError::InvalidTestRatio(0.0))
        );
        assert!(train_test_split(&samples, 1.0, 42).is_err());
        assert!(train_test_split(&samples, f64::NAN, 42).is_err());
    }

    #[test]
    fn test_feature_vector_arity() {
        let err = FeatureVector::try_from([1.0, 2.0].as_slice()).unwrap_err();
        assert_eq!(
            err,
            DataError::WrongArity {
                expected: 4,
                got: 2
            }
        );
        assert_eq!(err.to_string(), "expected 4 features, got 2");
    }

    #[test]
    fn test_feature_vector_non_finite() {
        let err = FeatureVector::try_from([5.1, 1e300, 1.4, 0.2].as_slice()).unwrap_err();
        assert!(matches!(err, DataError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn test_feature_vector_from_str() {
        let v: FeatureVector = "5.1, 3.5,1.4 ,0.2".parse().expect("should parse");
        assert_eq!(v.values(), &[5.1, 3.5, 1.4, 0.2]);

        let err = "5.1,abc,1.4,0.2".parse::<FeatureVector>().unwrap_err();
        assert!(matches!(err, DataError::Parse { index: 1, .. }));
    }

    #[test]
    fn test_species_serializes_as_label() {
        let json = serde_json::to_string(&Species::Virginica).expect("serialize");
        assert_eq!(json, "2");
        assert_eq!(Species::from_index(1), Some(Species::Versicolor));
        assert_eq!(Species::from_index(3), None);
    }
}
