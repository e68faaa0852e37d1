use crate::domain::{ExampleError, ExampleResult, ModelType};
use std::collections::HashMap;

/// Model types that can be resolved by name.
#[derive(Debug, Default, Clone)]
pub struct ModelCatalog {
    types: HashMap<String, ModelType>,
}

impl ModelCatalog {
    pub fn new(types: impl IntoIterator<Item = ModelType>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    pub fn register(&mut self, model: ModelType) {
        self.types.insert(model.name.clone(), model);
    }

    pub fn resolve_type(&self, name: &str) -> ExampleResult<&ModelType> {
        self.types
            .get(name)
            .ok_or_else(|| ExampleError::UnresolvedType(name.to_string()))
    }
}
