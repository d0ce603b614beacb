//! Schema generation
//!
//! [`XsdGenerator`] walks a root model and, through nested-attribute
//! associations, every model reachable from it, producing one named complex
//! type per model plus the root collection element.
//!
//! Recursion keeps the chain of model identities being expanded on the
//! current path. An association whose target is already on that chain is
//! written as a terminal, untyped element instead of being expanded, so
//! cycles in the association graph always terminate. A model reached again
//! on a different path reuses the complex type generated the first time.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;

use crate::catalog::ModelCatalog;
use crate::error::{Error, Result};
use crate::models::{
    options, AssociationDescriptor, Cardinality, ColumnDescriptor, ModelDescriptor, OptionValue,
    ValidatorKind,
};
use crate::names::{dasherize, ModelNames, COLLECTION_TYPE_SUFFIX};
use crate::namespaces::QualifiedName;
use crate::occurs::{OccurrenceRules, Occurs};
use crate::restrictions::{unconditional, Restriction, RestrictionSet, RestrictionStrategy};
use crate::sandbox::{Customization, ElementSpec};
use crate::schema::{
    AttributeDecl, AttributeUse, ComplexType, Content, ElementDecl, Particle, SchemaDocument,
    UniqueConstraint,
};
use crate::types::{map_type, mapping_index, TYPE_MAPPINGS};
use crate::writer::SchemaWriter;

/// Suffix of elements written for nested-attribute associations
pub const NESTED_ATTRIBUTES_SUFFIX: &str = "-attributes";

/// Options of one generation request
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Synthetic elements added to the root model, replacing customization
    /// elements of the same name
    pub methods: IndexMap<String, ElementSpec>,
    /// Root attributes that are always required
    pub required: IndexSet<String>,
    /// Root attributes that are always optional
    pub optional: IndexSet<String>,
    /// Indentation width of the output, 0 for a single line
    pub indent: usize,
    /// Whether the XML declaration is written
    pub xml_declaration: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            methods: IndexMap::new(),
            required: IndexSet::new(),
            optional: IndexSet::new(),
            indent: 2,
            xml_declaration: true,
        }
    }
}

impl GenerateOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a synthetic element
    pub fn with_method(mut self, name: impl Into<String>, spec: ElementSpec) -> Self {
        self.methods.insert(name.into(), spec);
        self
    }

    /// Mark attributes as always required
    pub fn with_required<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Mark attributes as always optional
    pub fn with_optional<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set whether the XML declaration is written
    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }

    fn writer(&self) -> SchemaWriter {
        SchemaWriter::new()
            .with_indent(self.indent)
            .with_xml_declaration(self.xml_declaration)
    }
}

/// Schema generator over a model catalog
#[derive(Debug, Clone)]
pub struct XsdGenerator<'c> {
    catalog: &'c ModelCatalog,
    restrictions: RestrictionSet,
}

impl<'c> XsdGenerator<'c> {
    /// Create a generator with the built-in restriction strategies
    pub fn new(catalog: &'c ModelCatalog) -> Self {
        Self {
            catalog,
            restrictions: RestrictionSet::new(),
        }
    }

    /// Register a custom restriction strategy, run after the built-in ones
    pub fn with_restriction(mut self, strategy: impl RestrictionStrategy + 'static) -> Self {
        self.restrictions.register(Arc::new(strategy));
        self
    }

    /// The catalog models are resolved against
    pub fn catalog(&self) -> &'c ModelCatalog {
        self.catalog
    }

    /// Build the schema document of a registered model
    ///
    /// `customization` replaces the tree registered in the catalog for the
    /// root model; nested models always use their registered tree.
    pub fn build(
        &self,
        model: &QualifiedName,
        customization: Option<&Customization>,
        options: &GenerateOptions,
    ) -> Result<SchemaDocument> {
        let root = self.catalog.require(model)?;
        let customization = customization
            .or_else(|| self.catalog.customization(model))
            .cloned()
            .unwrap_or_default()
            .with_methods(&options.methods)?;

        tracing::debug!(model = %root.name, "generating schema");

        let rules = OccurrenceRules::new()
            .with_customization(&customization)
            .with_optional(&options.optional)
            .with_required(&options.required);

        let mut build = Build {
            generator: self,
            types: IndexMap::new(),
            wrappers: BTreeSet::new(),
            ancestry: Vec::new(),
        };
        build.expand_model(root, &customization, rules)?;

        let names = ModelNames::resolve(&root.name);
        let mut collection_type = names.collection_type.clone();
        while build.types.contains_key(&collection_type) {
            collection_type.push_str(COLLECTION_TYPE_SUFFIX);
        }
        if collection_type != names.collection_type {
            tracing::warn!(
                model = %root.name,
                collection_type = %collection_type,
                "collection type name already used by a nested model, renamed"
            );
        }

        let collection = ComplexType::named(
            collection_type.clone(),
            Content::Sequence(vec![Particle::Element(
                ElementDecl::new(names.element.clone())
                    .with_type(names.type_name.clone())
                    .with_occurs(Occurs::zero_or_more()),
            )]),
        )
        .with_attribute(AttributeDecl::array());

        let mut root_element =
            ElementDecl::new(names.collection_element.clone()).with_type(collection_type);
        for unique in uniqueness_constraints(root, &customization, &names.element) {
            root_element = root_element.with_unique(unique);
        }

        let document = SchemaDocument {
            builtin_types: build
                .wrappers
                .iter()
                .map(|&index| ComplexType::wrapper(&TYPE_MAPPINGS[index]))
                .collect(),
            root: root_element,
            complex_types: std::iter::once(collection)
                .chain(build.types.into_values().filter_map(|slot| slot.complex_type))
                .collect(),
        };

        Ok(document)
    }

    /// Generate the schema text of a registered model
    pub fn generate(
        &self,
        model: &QualifiedName,
        customization: Option<&Customization>,
        options: &GenerateOptions,
    ) -> Result<String> {
        let document = self.build(model, customization, options)?;
        options.writer().to_string(&document)
    }
}

/// Generate the schema of a single model
///
/// The model is registered in a catalog of its own, so only associations
/// targeting the model itself can be nested.
pub fn generate(
    model: &ModelDescriptor,
    customization: Option<&Customization>,
    options: &GenerateOptions,
) -> Result<String> {
    let mut catalog = ModelCatalog::new();
    catalog.register(model.clone())?;
    XsdGenerator::new(&catalog).generate(&model.name, customization, options)
}

/// A complex type name claimed by the first model that reached it
struct TypeSlot {
    owner: QualifiedName,
    complex_type: Option<ComplexType>,
}

/// State of one generation request
struct Build<'g, 'c> {
    generator: &'g XsdGenerator<'c>,
    /// Model types in pre-order, reserved before their content is built
    types: IndexMap<String, TypeSlot>,
    /// Indices of referenced wrapper types
    wrappers: BTreeSet<usize>,
    /// Model identities expanded on the current path
    ancestry: Vec<QualifiedName>,
}

impl<'g, 'c> Build<'g, 'c> {
    fn expand_model(
        &mut self,
        model: &ModelDescriptor,
        customization: &Customization,
        rules: OccurrenceRules<'_>,
    ) -> Result<()> {
        let type_name = ModelNames::resolve(&model.name).type_name;
        self.types.insert(
            type_name.clone(),
            TypeSlot {
                owner: model.name.clone(),
                complex_type: None,
            },
        );

        self.ancestry.push(model.name.clone());
        let particles = self.model_particles(model, customization, rules);
        self.ancestry.pop();
        let particles = particles?;

        tracing::debug!(
            model = %model.name,
            type_name = %type_name,
            elements = particles.len(),
            "generated complex type"
        );
        if let Some(slot) = self.types.get_mut(&type_name) {
            slot.complex_type = Some(ComplexType::named(type_name, Content::All(particles)));
        }
        Ok(())
    }

    fn model_particles(
        &mut self,
        model: &ModelDescriptor,
        customization: &Customization,
        rules: OccurrenceRules<'_>,
    ) -> Result<Vec<Particle>> {
        let mut particles = Vec::new();
        let mut emitted = HashSet::new();
        let mut consumed = HashSet::new();

        for column in &model.columns {
            if customization.is_ignored(&column.name) {
                tracing::trace!(model = %model.name, column = %column.name, "ignored");
                continue;
            }
            let element = match customization.element(&column.name) {
                Some(spec) if *spec != ElementSpec::Leaf => {
                    consumed.insert(dasherize(&column.name));
                    let validators = model.validators_for(&column.name);
                    let occurs = Occurs::new(rules.min_occurs(&column.name, validators), Some(1));
                    synthetic_element(&dasherize(&column.name), spec, occurs)
                }
                spec => {
                    if spec.is_some() {
                        consumed.insert(dasherize(&column.name));
                    }
                    self.column_element(model, column, rules)?
                }
            };
            push_element(&mut particles, &mut emitted, element, model)?;
        }

        for association in &model.associations {
            if !association.nested_attributes {
                continue;
            }
            let element_name = format!("{}{}", dasherize(&association.name), NESTED_ATTRIBUTES_SUFFIX);
            if customization.is_ignored(&association.name) || customization.is_ignored(&element_name)
            {
                tracing::trace!(model = %model.name, association = %association.name, "ignored");
                continue;
            }

            let overridden = [element_name.clone(), dasherize(&association.name)]
                .into_iter()
                .find_map(|key| customization.element(&key).map(|spec| (key, spec)));
            let element = match overridden {
                Some((key, spec)) if *spec != ElementSpec::Leaf => {
                    let validators = model.validators_for(&association.name);
                    let occurs = Occurs::new(rules.min_occurs(&association.name, validators), Some(1));
                    let element = synthetic_element(&key, spec, occurs);
                    consumed.insert(key);
                    element
                }
                overridden => {
                    if let Some((key, _)) = overridden {
                        consumed.insert(key);
                    }
                    self.association_element(model, association, element_name, rules)?
                }
            };
            push_element(&mut particles, &mut emitted, element, model)?;
        }

        for (name, spec) in customization.elements() {
            if consumed.contains(name) || customization.is_ignored(name) {
                continue;
            }
            let occurs = Occurs::new(rules.min_occurs(name, &[]), Some(1));
            push_element(&mut particles, &mut emitted, synthetic_element(name, spec, occurs), model)?;
        }

        Ok(particles)
    }

    fn column_element(
        &mut self,
        model: &ModelDescriptor,
        column: &ColumnDescriptor,
        rules: OccurrenceRules<'_>,
    ) -> Result<ElementDecl> {
        let mapping = map_type(&column.column_type).ok_or_else(|| Error::UnknownType {
            model: model.name.to_string(),
            column: column.name.clone(),
            type_name: column.column_type.to_string(),
        })?;
        let validators = model.validators_for(&column.name);
        let occurs = rules.occurrence_for(&column.name, validators, Cardinality::One);

        let mut restriction = Restriction::new(mapping);
        self.generator
            .restrictions
            .apply(column, validators, &mut restriction);
        let facets = restriction.into_admitted_facets();

        let content = if facets.is_empty() {
            ComplexType::anonymous(Content::SimpleExtension(mapping.xsd_type.to_string()))
                .with_attribute(AttributeDecl::type_hint())
        } else {
            self.wrappers.insert(mapping_index(mapping.complex_type));
            ComplexType::anonymous(Content::SimpleRestriction {
                base: mapping.complex_type.to_string(),
                facets,
            })
        };

        tracing::trace!(model = %model.name, column = %column.name, base = mapping.xsd_type, "column element");
        Ok(ElementDecl::new(dasherize(&column.name))
            .with_occurs(occurs)
            .with_complex_type(content))
    }

    fn association_element(
        &mut self,
        model: &ModelDescriptor,
        association: &AssociationDescriptor,
        element_name: String,
        rules: OccurrenceRules<'_>,
    ) -> Result<ElementDecl> {
        let catalog = self.generator.catalog;
        let target = catalog.resolve(model, association)?;
        let validators = model.validators_for(&association.name);
        let occurs = rules.occurrence_for(&association.name, validators, association.cardinality);
        let wrapper_occurs = Occurs::new(occurs.min, Some(1));

        if self.ancestry.contains(&target.name) {
            tracing::debug!(
                model = %model.name,
                association = %association.name,
                target = %target.name,
                "association target is already being expanded, writing terminal element"
            );
            return Ok(ElementDecl::new(element_name).with_occurs(wrapper_occurs));
        }

        let target_names = ModelNames::resolve(&target.name);
        match self.types.get(&target_names.type_name) {
            Some(slot) if slot.owner != target.name => {
                tracing::warn!(
                    type_name = %target_names.type_name,
                    model = %target.name,
                    owner = %slot.owner,
                    "complex type name already generated for another model, reusing it"
                );
            }
            Some(_) => {}
            None => {
                let customization = catalog
                    .customization(&target.name)
                    .cloned()
                    .unwrap_or_default();
                let rules = OccurrenceRules::new().with_customization(&customization);
                self.expand_model(target, &customization, rules)?;
            }
        }

        let element = match association.cardinality {
            Cardinality::One => ElementDecl::new(element_name)
                .with_type(target_names.type_name)
                .with_occurs(occurs),
            Cardinality::Many => {
                let members = ElementDecl::new(target_names.element)
                    .with_type(target_names.type_name)
                    .with_occurs(occurs);
                ElementDecl::new(element_name)
                    .with_occurs(wrapper_occurs)
                    .with_complex_type(
                        ComplexType::anonymous(Content::Sequence(vec![Particle::Element(members)]))
                            .with_attribute(AttributeDecl::array()),
                    )
            }
        };
        Ok(element)
    }
}

fn push_element(
    particles: &mut Vec<Particle>,
    emitted: &mut HashSet<String>,
    element: ElementDecl,
    model: &ModelDescriptor,
) -> Result<()> {
    if !emitted.insert(element.name.clone()) {
        return Err(Error::configuration(
            model.name.to_string(),
            format!("more than one element named '{}'", element.name),
        ));
    }
    particles.push(Particle::Element(element));
    Ok(())
}

/// Element forced in by a customization tree
fn synthetic_element(name: &str, spec: &ElementSpec, occurs: Occurs) -> ElementDecl {
    let element = ElementDecl::new(name).with_occurs(occurs);
    match spec {
        ElementSpec::Leaf => element,
        ElementSpec::Nested(children) => {
            let particles = children
                .iter()
                .map(|(child, spec)| Particle::Element(synthetic_element(child, spec, Occurs::optional())))
                .collect();
            element.with_complex_type(ComplexType::anonymous(Content::All(particles)))
        }
        ElementSpec::Sequence(children) => {
            let particles = if children.is_empty() {
                vec![Particle::Any(Occurs::zero_or_more())]
            } else {
                children
                    .iter()
                    .map(|child| Particle::Element(ElementDecl::new(child).with_occurs(Occurs::zero_or_more())))
                    .collect()
            };
            element.with_complex_type(
                ComplexType::anonymous(Content::Sequence(particles))
                    .with_attribute(AttributeDecl::array().with_use(AttributeUse::Optional)),
            )
        }
    }
}

/// `xs:unique` constraints from the root model's uniqueness validators
fn uniqueness_constraints(
    model: &ModelDescriptor,
    customization: &Customization,
    element: &str,
) -> Vec<UniqueConstraint> {
    let mut constraints: Vec<UniqueConstraint> = Vec::new();

    for column in &model.columns {
        if customization.is_ignored(&column.name) || customization.element(&column.name).is_some() {
            continue;
        }
        let validators = model.validators_for(&column.name);
        for validator in unconditional(validators, &ValidatorKind::Uniqueness) {
            let field = dasherize(&column.name);
            let mut fields = vec![field.clone()];
            match validator.option(options::SCOPE) {
                Some(OptionValue::List(scope)) => {
                    fields.extend(scope.iter().map(|s| dasherize(&s.to_string())))
                }
                Some(scope) => fields.push(dasherize(&scope.to_string())),
                None => {}
            }

            let name = format!("{}-{}-must-be-unique", element, field);
            if constraints.iter().any(|c| c.name == name) {
                tracing::warn!(model = %model.name, column = %column.name, "skipping repeated uniqueness constraint");
                continue;
            }
            constraints.push(UniqueConstraint {
                name,
                selector: format!("./{}", element),
                fields,
            });
        }
    }

    constraints
}
