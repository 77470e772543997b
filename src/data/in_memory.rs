use std::collections::HashMap;
use crate::data::NamedArraySource;
use crate::error::{DatasetError, Result};
use crate::types::typed_array::TypedArray;

/// A set of labeled matrices held in memory.
#[derive(Default, Debug, Clone)]
pub struct InMemorySource {
    arrays: HashMap<String, TypedArray>,
}

impl InMemorySource {
    /// Creates an empty source.
    pub fn new() -> InMemorySource {
        InMemorySource {
            arrays: HashMap::new(),
        }
    }

    /// Adds a matrix with the given label to the source,
    /// or replaces the matrix if it already exists.
    pub fn add(&mut self, label: &str, array: TypedArray) {
        self.arrays.insert(label.to_string(), array);
    }

    /// Removes the matrix with the given label, returning it if it existed.
    pub fn remove(&mut self, label: &str) -> Option<TypedArray> {
        self.arrays.remove(label)
    }
}

impl NamedArraySource for InMemorySource {
    fn get(&self, field: &str) -> Result<TypedArray> {
        match self.arrays.get(field) {
            None => Err(DatasetError::MissingField { field: field.to_string() }),
            Some(array) => Ok(array.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use crate::data::in_memory::InMemorySource;
    use crate::data::NamedArraySource;
    use crate::types::typed_array::TypedArray;

    #[test]
    fn test_replace() {
        let mut source = InMemorySource::new();
        source.add("a", TypedArray::Float32(Array2::eye(5)));
        source.add("a", TypedArray::UInt8(Array2::zeros((2, 3))));

        let a = source.get("a").unwrap();
        assert_eq!(TypedArray::UInt8(Array2::zeros((2, 3))), a);
    }

    #[test]
    fn test_nonexistent() {
        let source = InMemorySource::new();
        assert!(source.get("a").is_err());
        assert!(source.get_train().is_err());
    }
}
