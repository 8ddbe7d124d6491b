//! Dataset and batching for Burn training.

use burn::prelude::*;
use iris_data::{FEATURE_COUNT, Sample, Species};

/// A single item in the Iris dataset.
#[derive(Debug, Clone, Copy)]
pub struct IrisItem {
    /// Feature vector for this sample.
    pub features: [f32; FEATURE_COUNT],
    /// Target class.
    pub species: Species,
}

impl From<&Sample> for IrisItem {
    fn from(sample: &Sample) -> Self {
        Self {
            features: *sample.features.values(),
            species: sample.species,
        }
    }
}

/// In-memory dataset of Iris items.
#[derive(Debug, Clone, Default)]
pub struct IrisDataset {
    items: Vec<IrisItem>,
}

impl IrisDataset {
    /// Creates a dataset from a slice of labelled samples.
    #[must_use]
    pub fn from_slice(samples: &[Sample]) -> Self {
        let items = samples.iter().map(IrisItem::from).collect();
        Self { items }
    }

    /// Returns the item at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<IrisItem> {
        self.items.get(index).copied()
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns all items in order.
    #[must_use]
    pub fn items(&self) -> &[IrisItem] {
        &self.items
    }
}

/// A batch of training data.
#[derive(Debug, Clone)]
pub struct IrisBatch<B: Backend> {
    /// Input features tensor of shape `[batch_size, FEATURE_COUNT]`.
    pub inputs: Tensor<B, 2>,
    /// Class labels tensor of shape `[batch_size]`.
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher for creating training batches.
#[derive(Debug, Clone)]
pub struct IrisBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> IrisBatcher<B> {
    /// Creates a new batcher for the given device.
    #[must_use]
    pub const fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Builds an input-only tensor for inference.
    pub fn inputs<'a>(
        &self,
        features: impl IntoIterator<Item = &'a [f32; FEATURE_COUNT]>,
    ) -> Tensor<B, 2> {
        let flat: Vec<f32> = features.into_iter().flatten().copied().collect();
        let rows = flat.len() / FEATURE_COUNT;

        Tensor::<B, 2>::from_data(
            TensorData::new(flat, [rows, FEATURE_COUNT]).convert::<B::FloatElem>(),
            &self.device,
        )
    }

    /// Creates a batch from a slice of items.
    pub fn batch(&self, items: &[IrisItem]) -> IrisBatch<B> {
        let batch_size = items.len();

        let inputs = self.inputs(items.iter().map(|item| &item.features));

        let labels: Vec<i64> = items.iter().map(|item| item.species.index() as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(labels, [batch_size]).convert::<B::IntElem>(),
            &self.device,
        );

        IrisBatch { inputs, targets }
    }
}
