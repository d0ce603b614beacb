//! Schema document serialization
//!
//! Writes a [`SchemaDocument`] as UTF-8 XML with `quick-xml` events. The
//! output depends only on the document, so equal documents always serialize
//! to identical bytes.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};
use crate::namespaces::{xs, xs_declaration};
use crate::schema::{
    AttributeDecl, ComplexType, Content, ElementDecl, Particle, SchemaDocument, UniqueConstraint,
};

/// Serializer of schema documents
#[derive(Debug, Clone, Copy)]
pub struct SchemaWriter {
    indent: usize,
    xml_declaration: bool,
}

impl Default for SchemaWriter {
    fn default() -> Self {
        Self {
            indent: 2,
            xml_declaration: true,
        }
    }
}

impl SchemaWriter {
    /// Two-space indentation with an XML declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width; 0 writes everything on one line
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set whether the `<?xml ...?>` declaration is written
    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }

    /// Serialize a document into a string
    pub fn to_string(&self, document: &SchemaDocument) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(document, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }

    /// Serialize a document into a byte sink
    pub fn write<W: Write>(&self, document: &SchemaDocument, out: W) -> Result<()> {
        let mut writer = if self.indent > 0 {
            Writer::new_with_indent(out, b' ', self.indent)
        } else {
            Writer::new(out)
        };

        if self.xml_declaration {
            writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        let mut schema = BytesStart::new(xs("schema"));
        let (prefix, namespace) = xs_declaration();
        schema.push_attribute((prefix.as_str(), namespace));
        writer.write_event(Event::Start(schema))?;

        for complex_type in &document.builtin_types {
            write_complex_type(&mut writer, complex_type)?;
        }
        write_element(&mut writer, &document.root)?;
        for complex_type in &document.complex_types {
            write_complex_type(&mut writer, complex_type)?;
        }

        writer.write_event(Event::End(BytesEnd::new(xs("schema"))))?;
        writer.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &ElementDecl) -> Result<()> {
    let mut start = BytesStart::new(xs("element"));
    start.push_attribute(("name", element.name.as_str()));
    if let Some(ref type_name) = element.type_name {
        start.push_attribute(("type", type_name.as_str()));
    }
    if let Some(occurs) = element.occurs {
        start.push_attribute(("minOccurs", occurs.min_occurs().as_str()));
        start.push_attribute(("maxOccurs", occurs.max_occurs().as_str()));
    }
    if element.is_nillable_false() {
        start.push_attribute(("nillable", "false"));
    }

    if element.complex_type.is_none() && element.unique.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if let Some(ref complex_type) = element.complex_type {
        write_complex_type(writer, complex_type)?;
    }
    for unique in &element.unique {
        write_unique(writer, unique)?;
    }
    writer.write_event(Event::End(BytesEnd::new(xs("element"))))?;
    Ok(())
}

fn write_complex_type<W: Write>(writer: &mut Writer<W>, complex_type: &ComplexType) -> Result<()> {
    let mut start = BytesStart::new(xs("complexType"));
    if let Some(ref name) = complex_type.name {
        start.push_attribute(("name", name.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    match &complex_type.content {
        Content::All(particles) => {
            write_group(writer, "all", particles)?;
            write_attributes(writer, &complex_type.attributes)?;
        }
        Content::Sequence(particles) => {
            write_group(writer, "sequence", particles)?;
            write_attributes(writer, &complex_type.attributes)?;
        }
        Content::SimpleExtension(base) => {
            writer.write_event(Event::Start(BytesStart::new(xs("simpleContent"))))?;
            let mut extension = BytesStart::new(xs("extension"));
            extension.push_attribute(("base", base.as_str()));
            if complex_type.attributes.is_empty() {
                writer.write_event(Event::Empty(extension))?;
            } else {
                writer.write_event(Event::Start(extension))?;
                write_attributes(writer, &complex_type.attributes)?;
                writer.write_event(Event::End(BytesEnd::new(xs("extension"))))?;
            }
            writer.write_event(Event::End(BytesEnd::new(xs("simpleContent"))))?;
        }
        Content::SimpleRestriction { base, facets } => {
            writer.write_event(Event::Start(BytesStart::new(xs("simpleContent"))))?;
            let mut restriction = BytesStart::new(xs("restriction"));
            restriction.push_attribute(("base", base.as_str()));
            writer.write_event(Event::Start(restriction))?;
            for facet in facets {
                let mut empty = BytesStart::new(xs(facet.name()));
                empty.push_attribute(("value", facet.value().as_str()));
                writer.write_event(Event::Empty(empty))?;
            }
            writer.write_event(Event::End(BytesEnd::new(xs("restriction"))))?;
            writer.write_event(Event::End(BytesEnd::new(xs("simpleContent"))))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(xs("complexType"))))?;
    Ok(())
}

fn write_group<W: Write>(writer: &mut Writer<W>, group: &str, particles: &[Particle]) -> Result<()> {
    if particles.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(xs(group))))?;
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new(xs(group))))?;
    for particle in particles {
        match particle {
            Particle::Element(element) => write_element(writer, element)?,
            Particle::Any(occurs) => {
                let mut any = BytesStart::new(xs("any"));
                any.push_attribute(("processContents", "skip"));
                any.push_attribute(("minOccurs", occurs.min_occurs().as_str()));
                any.push_attribute(("maxOccurs", occurs.max_occurs().as_str()));
                writer.write_event(Event::Empty(any))?;
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(xs(group))))?;
    Ok(())
}

fn write_attributes<W: Write>(writer: &mut Writer<W>, attributes: &[AttributeDecl]) -> Result<()> {
    for attribute in attributes {
        let mut empty = BytesStart::new(xs("attribute"));
        empty.push_attribute(("name", attribute.name.as_str()));
        empty.push_attribute(("type", attribute.type_name.as_str()));
        if let Some(ref fixed) = attribute.fixed {
            empty.push_attribute(("fixed", fixed.as_str()));
        }
        if let Some(use_mode) = attribute.use_mode {
            empty.push_attribute(("use", use_mode.as_str()));
        }
        writer.write_event(Event::Empty(empty))?;
    }
    Ok(())
}

fn write_unique<W: Write>(writer: &mut Writer<W>, unique: &UniqueConstraint) -> Result<()> {
    let mut start = BytesStart::new(xs("unique"));
    start.push_attribute(("name", unique.name.as_str()));
    writer.write_event(Event::Start(start))?;

    let mut selector = BytesStart::new(xs("selector"));
    selector.push_attribute(("xpath", unique.selector.as_str()));
    writer.write_event(Event::Empty(selector))?;

    for field in &unique.fields {
        let mut empty = BytesStart::new(xs("field"));
        empty.push_attribute(("xpath", field.as_str()));
        writer.write_event(Event::Empty(empty))?;
    }

    writer.write_event(Event::End(BytesEnd::new(xs("unique"))))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occurs::Occurs;
    use crate::restrictions::Facet;
    use pretty_assertions::assert_eq;

    fn empty_document() -> SchemaDocument {
        SchemaDocument {
            builtin_types: Vec::new(),
            root: ElementDecl::new("empty-models").with_type("EmptyModels"),
            complex_types: vec![
                ComplexType::named(
                    "EmptyModels",
                    Content::Sequence(vec![Particle::Element(
                        ElementDecl::new("empty-model")
                            .with_type("EmptyModel")
                            .with_occurs(Occurs::zero_or_more()),
                    )]),
                )
                .with_attribute(AttributeDecl::array()),
                ComplexType::named("EmptyModel", Content::All(Vec::new())),
            ],
        }
    }

    #[test]
    fn test_write_empty_model() {
        let xml = SchemaWriter::new().to_string(&empty_document()).unwrap();
        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="empty-models" type="EmptyModels"/>
  <xs:complexType name="EmptyModels">
    <xs:sequence>
      <xs:element name="empty-model" type="EmptyModel" minOccurs="0" maxOccurs="unbounded"/>
    </xs:sequence>
    <xs:attribute name="type" type="xs:string" fixed="array"/>
  </xs:complexType>
  <xs:complexType name="EmptyModel">
    <xs:all/>
  </xs:complexType>
</xs:schema>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_compact_output_without_declaration() {
        let xml = SchemaWriter::new()
            .with_indent(0)
            .with_xml_declaration(false)
            .to_string(&empty_document())
            .unwrap();
        assert!(xml.starts_with("<xs:schema xmlns:xs="));
        assert_eq!(xml.lines().count(), 1);
    }

    #[test]
    fn test_write_restriction_escapes_facet_values() {
        let mut document = empty_document();
        document.complex_types[1] = ComplexType::named(
            "EmptyModel",
            Content::All(vec![Particle::Element(
                ElementDecl::new("code")
                    .with_occurs(Occurs::once())
                    .with_complex_type(ComplexType::anonymous(Content::SimpleRestriction {
                        base: "String".into(),
                        facets: vec![Facet::Pattern("a<b&c".into()), Facet::MaxLength(3)],
                    })),
            )]),
        );

        let xml = SchemaWriter::new().to_string(&document).unwrap();
        assert!(xml.contains(r#"<xs:element name="code" minOccurs="1" maxOccurs="1" nillable="false">"#));
        assert!(xml.contains(r#"<xs:restriction base="String">"#));
        assert!(xml.contains(r#"<xs:pattern value="a&lt;b&amp;c"/>"#));
        assert!(xml.contains(r#"<xs:maxLength value="3"/>"#));

        let parsed = roxmltree::Document::parse(&xml).unwrap();
        let pattern = parsed
            .descendants()
            .find(|n| n.tag_name().name() == "pattern")
            .unwrap();
        assert_eq!(pattern.attribute("value"), Some("a<b&c"));
    }

    #[test]
    fn test_write_unique_and_any() {
        let mut document = empty_document();
        document.root = document.root.with_unique(UniqueConstraint {
            name: "post-slug-must-be-unique".into(),
            selector: "./post".into(),
            fields: vec!["slug".into()],
        });
        document.complex_types[1] =
            ComplexType::named("EmptyModel", Content::Sequence(vec![Particle::Any(Occurs::zero_or_more())]));

        let xml = SchemaWriter::new().to_string(&document).unwrap();
        assert!(xml.contains(r#"<xs:unique name="post-slug-must-be-unique">"#));
        assert!(xml.contains(r#"<xs:selector xpath="./post"/>"#));
        assert!(xml.contains(r#"<xs:field xpath="slug"/>"#));
        assert!(xml.contains(r#"<xs:any processContents="skip" minOccurs="0" maxOccurs="unbounded"/>"#));
    }
}
