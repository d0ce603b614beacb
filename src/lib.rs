//! # modelxsd
//!
//! Derives an XML Schema (XSD) document from the structural metadata of a
//! data model: its columns, validators and nested associations.
//!
//! ## Features
//!
//! - Column types mapped to XSD base types through a fixed type table
//! - Facets (`minLength`, `pattern`, `enumeration`, ...) derived from validators
//! - Pluggable restriction strategies
//! - `minOccurs` inferred from presence validators, with caller overrides
//! - Customization trees to ignore elements or inject synthetic ones
//! - Cycle-safe expansion of nested-attribute associations
//!
//! ## Example
//!
//! ```rust
//! use modelxsd::{GenerateOptions, ModelCatalog, ModelDescriptor, ValidatorDescriptor, XsdGenerator};
//!
//! let mut catalog = ModelCatalog::new();
//! catalog.register(
//!     ModelDescriptor::new("Shop::Product")
//!         .column("name", "string")
//!         .column("price", "decimal")
//!         .validates(ValidatorDescriptor::presence("name")),
//! )?;
//!
//! let xsd = XsdGenerator::new(&catalog).generate(
//!     &"Shop::Product".into(),
//!     None,
//!     &GenerateOptions::default(),
//! )?;
//! assert!(xsd.contains(r#"<xs:element name="products" type="Products"/>"#));
//! # Ok::<(), modelxsd::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod namespaces;
pub mod names;

// Model metadata
pub mod models;
pub mod catalog;
pub mod types;

// Generation
pub mod occurs;
pub mod sandbox;
pub mod restrictions;
pub mod schema;
pub mod generator;
pub mod writer;

// Re-exports for convenience
pub use catalog::ModelCatalog;
pub use error::{CustomizationError, Error, Result};
pub use generator::{generate, GenerateOptions, XsdGenerator};
pub use models::{
    AssociationDescriptor, Cardinality, ColumnDescriptor, ModelDescriptor, OptionValue,
    ValidatorDescriptor, ValidatorKind,
};
pub use namespaces::QualifiedName;
pub use restrictions::{Facet, Restriction, RestrictionStrategy};
pub use sandbox::{Customization, ElementSpec, Sandbox};
pub use schema::SchemaDocument;
pub use types::ColumnType;

/// Version of the modelxsd library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace bound to the `xs` prefix in generated documents
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
