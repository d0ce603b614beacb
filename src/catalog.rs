//! Model catalog
//!
//! Associations refer to their target by qualified identity. The catalog is
//! the registry those identities resolve against, and also holds the
//! per-model customization trees applied whenever a model's complex type is
//! generated.
//!
//! A catalog can be loaded from JSON:
//!
//! ```json
//! {
//!   "models": [
//!     {"name": "Blog", "columns": [{"name": "title", "type": "string"}],
//!      "associations": [{"name": "posts", "target": "Post",
//!                        "cardinality": "many", "nested_attributes": true}]},
//!     {"name": "Post"}
//!   ],
//!   "customizations": {"Post": {"ignore": ["secret"]}}
//! }
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{AssociationDescriptor, ModelDescriptor};
use crate::names::{dasherize, is_valid_ncname};
use crate::namespaces::QualifiedName;
use crate::sandbox::Customization;

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
    #[serde(default)]
    customizations: IndexMap<QualifiedName, Customization>,
}

/// Registry of model descriptors, in registration order
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: IndexMap<QualifiedName, ModelDescriptor>,
    customizations: IndexMap<QualifiedName, Customization>,
}

impl ModelCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading model catalog");
        Self::from_json(&content)
    }

    /// Parse a catalog from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let mut catalog = Self::new();
        for model in file.models {
            catalog.register(model)?;
        }
        for (identity, customization) in file.customizations {
            catalog.customize(&identity, customization)?;
        }
        Ok(catalog)
    }

    /// Register a model
    ///
    /// Validator descriptors without an attribute take the attribute they
    /// are keyed under.
    pub fn register(&mut self, mut model: ModelDescriptor) -> Result<()> {
        let identity = model.name.clone();

        if identity.base_name().is_empty() {
            return Err(Error::configuration(identity.to_string(), "model has no name"));
        }
        if !is_valid_ncname(&dasherize(identity.base_name())) {
            return Err(Error::configuration(
                identity.to_string(),
                "model name does not yield a valid element name",
            ));
        }
        if self.models.contains_key(&identity) {
            return Err(Error::configuration(identity.to_string(), "model is already registered"));
        }

        let mut seen = HashSet::new();
        for column in &model.columns {
            check_element_name(&identity, "column", &column.name)?;
            if !seen.insert(dasherize(&column.name)) {
                return Err(Error::configuration(
                    identity.to_string(),
                    format!("duplicate column '{}'", column.name),
                ));
            }
        }

        let mut seen = HashSet::new();
        for association in &model.associations {
            check_element_name(&identity, "association", &association.name)?;
            if !seen.insert(dasherize(&association.name)) {
                return Err(Error::configuration(
                    identity.to_string(),
                    format!("duplicate association '{}'", association.name),
                ));
            }
        }

        for (attribute, validators) in model.validators.iter_mut() {
            for validator in validators.iter_mut() {
                if validator.attribute.is_empty() {
                    validator.attribute = attribute.clone();
                } else if validator.attribute != *attribute {
                    return Err(Error::configuration(
                        identity.to_string(),
                        format!(
                            "{} validator for '{}' is listed under '{}'",
                            validator.kind, validator.attribute, attribute
                        ),
                    ));
                }
            }
        }

        tracing::debug!(model = %identity, "registered model");
        self.models.insert(identity, model);
        Ok(())
    }

    /// Attach a customization tree to a registered model
    pub fn customize(&mut self, identity: &QualifiedName, customization: Customization) -> Result<()> {
        if !self.models.contains_key(identity) {
            return Err(Error::configuration(
                identity.to_string(),
                "cannot customize a model that is not registered",
            ));
        }
        self.customizations.insert(identity.clone(), customization);
        Ok(())
    }

    /// Get a model by identity
    pub fn get(&self, identity: &QualifiedName) -> Option<&ModelDescriptor> {
        self.models.get(identity)
    }

    /// Get a model by identity, failing if it is not registered
    pub fn require(&self, identity: &QualifiedName) -> Result<&ModelDescriptor> {
        self.get(identity).ok_or_else(|| {
            Error::configuration(identity.to_string(), "model is not registered in the catalog")
        })
    }

    /// Resolve the target of an association declared on `owner`
    pub fn resolve(
        &self,
        owner: &ModelDescriptor,
        association: &AssociationDescriptor,
    ) -> Result<&ModelDescriptor> {
        self.get(&association.target).ok_or_else(|| {
            Error::configuration(
                owner.name.to_string(),
                format!(
                    "association '{}' targets unregistered model '{}'",
                    association.name, association.target
                ),
            )
        })
    }

    /// Customization tree attached to a model
    pub fn customization(&self, identity: &QualifiedName) -> Option<&Customization> {
        self.customizations.get(identity)
    }

    /// Registered models in registration order
    pub fn models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Get the number of registered models
    pub fn len(&self) -> usize {
        self.models.len()
    }
}

fn check_element_name(model: &QualifiedName, kind: &str, name: &str) -> Result<()> {
    if is_valid_ncname(&dasherize(name)) {
        return Ok(());
    }
    Err(Error::configuration(
        model.to_string(),
        format!("{} '{}' does not yield a valid element name", kind, name),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AssociationDescriptor, ValidatorDescriptor};
    use tempfile::TempDir;

    fn blog() -> ModelDescriptor {
        ModelDescriptor::new("Blog")
            .column("title", "string")
            .association(AssociationDescriptor::many("posts", "Post").nested())
    }

    #[test]
    fn test_register_and_resolve() {
        let mut catalog = ModelCatalog::new();
        catalog.register(blog()).unwrap();
        catalog.register(ModelDescriptor::new("Post")).unwrap();

        assert_eq!(catalog.len(), 2);
        let blog = catalog.require(&"Blog".into()).unwrap();
        let post = catalog.resolve(blog, &blog.associations[0]).unwrap();
        assert_eq!(post.name, QualifiedName::local("Post"));

        let names: Vec<String> = catalog.models().map(|m| m.name.to_string()).collect();
        assert_eq!(names, vec!["Blog", "Post"]);
    }

    #[test]
    fn test_unresolved_target_is_a_configuration_error() {
        let mut catalog = ModelCatalog::new();
        catalog.register(blog()).unwrap();
        let blog = catalog.require(&"Blog".into()).unwrap();

        let err = catalog.resolve(blog, &blog.associations[0]).unwrap_err();
        assert!(matches!(err, Error::Configuration { ref model, .. } if model == "Blog"));
        assert!(err.to_string().contains("posts"));
        assert!(catalog.require(&"Missing".into()).is_err());
    }

    #[test]
    fn test_rejects_malformed_models() {
        let mut catalog = ModelCatalog::new();
        assert!(catalog.register(ModelDescriptor::new("")).is_err());
        assert!(catalog
            .register(ModelDescriptor::new("Dup").column("name", "string").column("name", "text"))
            .is_err());

        catalog.register(ModelDescriptor::new("Once")).unwrap();
        assert!(catalog.register(ModelDescriptor::new("Once")).is_err());

        let mut mislabeled = ModelDescriptor::new("Mislabeled").column("name", "string");
        mislabeled
            .validators
            .insert("other".into(), vec![ValidatorDescriptor::presence("name")]);
        assert!(catalog.register(mislabeled).is_err());
    }

    #[test]
    fn test_rejects_invalid_attribute_names() {
        let mut catalog = ModelCatalog::new();

        let err = catalog
            .register(ModelDescriptor::new("Account").column("_", "string"))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
        assert!(err.to_string().contains("Account"));

        let err = catalog
            .register(ModelDescriptor::new("Account").column("2fa_code", "string"))
            .unwrap_err();
        assert!(err.to_string().contains("2fa_code"));

        let err = catalog
            .register(
                ModelDescriptor::new("Account")
                    .association(AssociationDescriptor::many("3d_models", "Model").nested()),
            )
            .unwrap_err();
        assert!(err.to_string().contains("3d_models"));
        assert!(catalog.is_empty());

        catalog
            .register(ModelDescriptor::new("Account").column("two_fa_code", "string"))
            .unwrap();
    }

    #[test]
    fn test_customize_requires_registration() {
        let mut catalog = ModelCatalog::new();
        assert!(catalog
            .customize(&"Blog".into(), Customization::default())
            .is_err());

        catalog.register(blog()).unwrap();
        catalog
            .customize(&"Blog".into(), Customization::default())
            .unwrap();
        assert!(catalog.customization(&"Blog".into()).is_some());
    }

    #[test]
    fn test_from_file() {
        let catalog_json = r#"{
            "models": [
                {
                    "name": "Shop::Order",
                    "columns": [{"name": "total", "type": "decimal"}],
                    "validators": {"total": [{"kind": "presence"}]}
                }
            ],
            "customizations": {"Shop::Order": {"ignore": ["secret"]}}
        }"#;

        let temp_dir = TempDir::new().unwrap();
        let catalog_path = temp_dir.path().join("models.json");
        std::fs::write(&catalog_path, catalog_json).unwrap();

        let catalog = ModelCatalog::from_file(&catalog_path).unwrap();
        let identity = QualifiedName::new(["Shop"], "Order");
        let order = catalog.get(&identity).unwrap();

        // attribute filled from the map key
        assert_eq!(order.validators_for("total")[0].attribute, "total");
        assert!(catalog.customization(&identity).unwrap().is_ignored("secret"));
    }

    #[test]
    fn test_from_file_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = ModelCatalog::from_file(temp_dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
