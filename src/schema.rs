//! In-memory model of a generated schema document
//!
//! The generator assembles a [`SchemaDocument`] and the writer serializes
//! it. Only the subset of XSD the generator emits is modelled: named and
//! anonymous complex types with `xs:all`/`xs:sequence` groups or simple
//! content, element and attribute declarations, and `xs:unique`
//! constraints.

use crate::occurs::Occurs;
use crate::restrictions::Facet;
use crate::types::TypeMapping;

/// A complete generated schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Wrapper complex types referenced by restricted scalars, in table order
    pub builtin_types: Vec<ComplexType>,
    /// Root collection element
    pub root: ElementDecl,
    /// Collection type followed by one complex type per model
    pub complex_types: Vec<ComplexType>,
}

impl SchemaDocument {
    /// Find a named complex type, wrappers included
    pub fn complex_type(&self, name: &str) -> Option<&ComplexType> {
        self.builtin_types
            .iter()
            .chain(&self.complex_types)
            .find(|t| t.name.as_deref() == Some(name))
    }

    /// Names of all top-level complex types in document order
    pub fn type_names(&self) -> Vec<&str> {
        self.builtin_types
            .iter()
            .chain(&self.complex_types)
            .filter_map(|t| t.name.as_deref())
            .collect()
    }
}

/// Complex type definition, named or anonymous
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexType {
    /// Type name; `None` for an anonymous type
    pub name: Option<String>,
    /// Content model
    pub content: Content,
    /// Attribute declarations
    pub attributes: Vec<AttributeDecl>,
}

impl ComplexType {
    /// Named type
    pub fn named(name: impl Into<String>, content: Content) -> Self {
        Self {
            name: Some(name.into()),
            content,
            attributes: Vec::new(),
        }
    }

    /// Anonymous type
    pub fn anonymous(content: Content) -> Self {
        Self {
            name: None,
            content,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute declaration
    pub fn with_attribute(mut self, attribute: AttributeDecl) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Wrapper type of a mapped column type: simple content extending the
    /// XSD base with the optional `type` attribute
    pub fn wrapper(mapping: &TypeMapping) -> Self {
        Self::named(mapping.complex_type, Content::SimpleExtension(mapping.xsd_type.to_string()))
            .with_attribute(AttributeDecl::type_hint())
    }

    /// Child particles of an `xs:all`/`xs:sequence` content model
    pub fn particles(&self) -> &[Particle] {
        match &self.content {
            Content::All(particles) | Content::Sequence(particles) => particles,
            Content::SimpleExtension(_) | Content::SimpleRestriction { .. } => &[],
        }
    }
}

/// Content model of a complex type
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Unordered group (`xs:all`)
    All(Vec<Particle>),
    /// Ordered group (`xs:sequence`)
    Sequence(Vec<Particle>),
    /// `xs:simpleContent` > `xs:extension base=...`
    SimpleExtension(String),
    /// `xs:simpleContent` > `xs:restriction base=...` with facets
    SimpleRestriction {
        /// Restricted base type
        base: String,
        /// Facets in strategy order
        facets: Vec<Facet>,
    },
}

/// Member of a model group
#[derive(Debug, Clone, PartialEq)]
pub enum Particle {
    /// Local element declaration
    Element(ElementDecl),
    /// `xs:any` wildcard, content not validated
    Any(Occurs),
}

impl Particle {
    /// The element declaration, if this is one
    pub fn as_element(&self) -> Option<&ElementDecl> {
        match self {
            Particle::Element(element) => Some(element),
            Particle::Any(_) => None,
        }
    }
}

/// Element declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDecl {
    /// Element name
    pub name: String,
    /// Named type (`type="..."`)
    pub type_name: Option<String>,
    /// Occurrence; `None` for a top-level declaration
    pub occurs: Option<Occurs>,
    /// Anonymous type
    pub complex_type: Option<Box<ComplexType>>,
    /// Identity constraints
    pub unique: Vec<UniqueConstraint>,
}

impl ElementDecl {
    /// Untyped element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            occurs: None,
            complex_type: None,
            unique: Vec::new(),
        }
    }

    /// Set the named type
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the occurrence
    pub fn with_occurs(mut self, occurs: Occurs) -> Self {
        self.occurs = Some(occurs);
        self
    }

    /// Set an anonymous type
    pub fn with_complex_type(mut self, complex_type: ComplexType) -> Self {
        self.complex_type = Some(Box::new(complex_type));
        self
    }

    /// Add an identity constraint
    pub fn with_unique(mut self, unique: UniqueConstraint) -> Self {
        self.unique.push(unique);
        self
    }

    /// Required elements are declared non-nillable
    pub fn is_nillable_false(&self) -> bool {
        self.occurs.is_some_and(|o| o.is_required())
    }
}

/// `use` of an attribute declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeUse {
    /// May be absent
    Optional,
    /// Must be present
    Required,
}

impl AttributeUse {
    /// Get as string
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeUse::Optional => "optional",
            AttributeUse::Required => "required",
        }
    }
}

/// Attribute declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    /// Attribute name
    pub name: String,
    /// Attribute type
    pub type_name: String,
    /// Fixed value
    pub fixed: Option<String>,
    /// Use mode
    pub use_mode: Option<AttributeUse>,
}

impl AttributeDecl {
    /// Optional `type` attribute carrying the serialized value's type
    pub fn type_hint() -> Self {
        Self {
            name: "type".to_string(),
            type_name: "xs:string".to_string(),
            fixed: None,
            use_mode: Some(AttributeUse::Optional),
        }
    }

    /// `type` attribute fixed to `array`, marking a collection
    pub fn array() -> Self {
        Self {
            name: "type".to_string(),
            type_name: "xs:string".to_string(),
            fixed: Some("array".to_string()),
            use_mode: None,
        }
    }

    /// Set the use mode
    pub fn with_use(mut self, use_mode: AttributeUse) -> Self {
        self.use_mode = Some(use_mode);
        self
    }
}

/// `xs:unique` identity constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueConstraint {
    /// Constraint name
    pub name: String,
    /// XPath selecting the constrained elements
    pub selector: String,
    /// XPaths of the fields that must be unique together
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{map_type, ColumnType};

    #[test]
    fn test_wrapper_type() {
        let wrapper = ComplexType::wrapper(map_type(&ColumnType::Integer).unwrap());
        assert_eq!(wrapper.name.as_deref(), Some("Integer"));
        assert_eq!(wrapper.content, Content::SimpleExtension("xs:integer".into()));
        assert_eq!(wrapper.attributes, vec![AttributeDecl::type_hint()]);
        assert!(wrapper.particles().is_empty());
    }

    #[test]
    fn test_lookup_by_name() {
        let document = SchemaDocument {
            builtin_types: vec![ComplexType::wrapper(map_type(&ColumnType::Float).unwrap())],
            root: ElementDecl::new("posts").with_type("Posts"),
            complex_types: vec![ComplexType::named("Post", Content::All(Vec::new()))],
        };

        assert!(document.complex_type("Float").is_some());
        assert!(document.complex_type("Post").is_some());
        assert!(document.complex_type("Missing").is_none());
        assert_eq!(document.type_names(), vec!["Float", "Post"]);
    }

    #[test]
    fn test_required_elements_are_not_nillable() {
        assert!(ElementDecl::new("a").with_occurs(Occurs::once()).is_nillable_false());
        assert!(!ElementDecl::new("a").with_occurs(Occurs::optional()).is_nillable_false());
        assert!(!ElementDecl::new("a").is_nillable_false());
    }
}
