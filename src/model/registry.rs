//! Ordered registry of named classifiers.
//!
//! Registration order is significant: the ensemble scorer breaks ties in
//! favor of the earlier classifier, so the registry is a plain vector and is
//! never re-ordered.

use crate::error::{CaduceusError, Result};
use crate::model::classifier::{Classifier, ClassifierFamily};

/// A classifier registered under a name and a family tag.
#[derive(Debug)]
pub struct RegisteredModel {
    name: String,
    family: ClassifierFamily,
    accuracy: Option<f64>,
    classifier: Classifier,
}

impl RegisteredModel {
    /// Create a new registry entry.
    pub fn new<S: Into<String>>(name: S, family: ClassifierFamily, classifier: Classifier) -> Self {
        RegisteredModel {
            name: name.into(),
            family,
            accuracy: None,
            classifier,
        }
    }

    /// Attach the held-out accuracy recorded at training time.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family tag.
    pub fn family(&self) -> ClassifierFamily {
        self.family
    }

    /// Recorded accuracy, if any.
    pub fn accuracy(&self) -> Option<f64> {
        self.accuracy
    }

    /// The classifier itself.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

/// Ordered collection of classifiers with one primary entry.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<RegisteredModel>,
    primary: Option<usize>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a model. Names must be unique.
    pub fn register(&mut self, model: RegisteredModel) -> Result<()> {
        if self.get(model.name()).is_some() {
            return Err(CaduceusError::artifact(format!(
                "model '{}' is registered twice",
                model.name()
            )));
        }
        self.models.push(model);
        Ok(())
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_model(mut self, model: RegisteredModel) -> Result<Self> {
        self.register(model)?;
        Ok(self)
    }

    /// Mark a registered model as primary.
    pub fn set_primary(&mut self, name: &str) -> Result<()> {
        let idx = self
            .models
            .iter()
            .position(|m| m.name() == name)
            .ok_or_else(|| {
                CaduceusError::artifact(format!("primary model '{name}' is not registered"))
            })?;
        self.primary = Some(idx);
        Ok(())
    }

    /// The primary model: the one marked explicitly, else the first registered.
    pub fn primary(&self) -> Option<&RegisteredModel> {
        self.models.get(self.primary.unwrap_or(0))
    }

    /// Look up a model by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredModel> {
        self.models.iter().find(|m| m.name() == name)
    }

    /// Iterate in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredModel> {
        self.models.iter()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
