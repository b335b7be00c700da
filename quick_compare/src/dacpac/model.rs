//! Dacpac schema model reader
//!
//! A dacpac is a zip archive whose `model.xml` entry lists every user-defined
//! object as a top-level `<Element Type="..." Name="...">` under `<Model>`.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Archive entry holding the serialized model
pub const MODEL_ENTRY: &str = "model.xml";

/// One top-level object declared by the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelElement {
    pub element_type: String,
    pub name: String,
}

/// Read-only, in-memory view of a dacpac model
#[derive(Debug, Clone)]
pub struct SchemaModel {
    path: Option<PathBuf>,
    elements: Vec<ModelElement>,
}

impl SchemaModel {
    /// Open a `.dacpac` archive, or a bare `model.xml` when the extension is `.xml`
    pub fn open(path: &Path) -> Result<Self> {
        let xml = read_model_xml(path)?;
        let mut model = Self::from_xml(&xml)
            .map_err(|e| Error::ArtifactError(format!("{}: {}", path.display(), e)))?;
        model.path = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            elements = model.elements.len(),
            "Loaded schema model"
        );

        Ok(model)
    }

    /// Parse the contents of a `model.xml`
    pub fn from_xml(xml: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            elements: parse_elements(xml)?,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn elements(&self) -> &[ModelElement] {
        &self.elements
    }

    /// Names of every element of the given `Type`, in document order
    pub fn names_of_type<'a>(&'a self, element_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.elements
            .iter()
            .filter(move |element| element.element_type == element_type)
            .map(|element| element.name.as_str())
    }
}

fn read_model_xml(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| {
        Error::ArtifactError(format!("Failed to open {}: {}", path.display(), e))
    })?;

    let is_bare_model = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("xml"))
        .unwrap_or(false);

    let mut xml = String::new();
    if is_bare_model {
        file.read_to_string(&mut xml).map_err(|e| {
            Error::ArtifactError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        return Ok(xml);
    }

    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::ArtifactError(format!("{} is not a dacpac: {}", path.display(), e)))?;
    let mut entry = archive.by_name(MODEL_ENTRY).map_err(|e| {
        Error::ArtifactError(format!("{} has no {}: {}", path.display(), MODEL_ENTRY, e))
    })?;
    entry.read_to_string(&mut xml).map_err(|e| {
        Error::ArtifactError(format!("Failed to read {} from {}: {}", MODEL_ENTRY, path.display(), e))
    })?;

    Ok(xml)
}

fn parse_elements(xml: &str) -> Result<Vec<ModelElement>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut elements = Vec::new();
    let mut depth = 0usize;
    // Depth of the open <Model> element, if any
    let mut model_depth: Option<usize> = None;
    let mut saw_model = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if model_depth.is_none() && e.local_name().as_ref() == b"Model" {
                    model_depth = Some(depth);
                    saw_model = true;
                } else if model_depth.map(|d| depth == d + 1).unwrap_or(false) {
                    push_element(&mut elements, &e)?;
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if model_depth.map(|d| depth == d + 1).unwrap_or(false) {
                    push_element(&mut elements, &e)?;
                } else if e.local_name().as_ref() == b"Model" {
                    saw_model = true;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if model_depth == Some(depth) {
                    model_depth = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_model {
        return Err(Error::ArtifactError(
            "model has no <Model> element".to_string(),
        ));
    }

    Ok(elements)
}

fn push_element(elements: &mut Vec<ModelElement>, start: &BytesStart<'_>) -> Result<()> {
    if start.local_name().as_ref() != b"Element" {
        return Ok(());
    }

    // Unnamed elements (database options, script files) are not droppable objects
    if let (Some(element_type), Some(name)) = (attribute(start, "Type")?, attribute(start, "Name")?) {
        elements.push(ModelElement { element_type, name });
    }

    Ok(())
}

fn attribute(start: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    let attr = start
        .try_get_attribute(key)
        .map_err(|e| Error::ArtifactError(format!("Malformed attribute {}: {}", key, e)))?;

    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|e| Error::ArtifactError(format!("Malformed attribute {}: {}", key, e)))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MODEL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<DataSchemaModel FileFormatVersion="1.2" SchemaVersion="2.9" DspName="Microsoft.Data.Tools.Schema.Sql.Sql150DatabaseSchemaProvider" xmlns="http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02">
  <Model>
    <Element Type="SqlDatabaseOptions">
      <Property Name="Collation" Value="SQL_Latin1_General_CP1_CI_AS" />
    </Element>
    <Element Type="SqlTable" Name="[dbo].[Customer]">
      <Relationship Name="Columns">
        <Entry>
          <Element Type="SqlSimpleColumn" Name="[dbo].[Customer].[Id]" />
        </Entry>
      </Relationship>
    </Element>
    <Element Type="SqlView" Name="[dbo].[ActiveCustomers]" />
    <Element Type="SqlProcedure" Name="[sales].[usp_O&apos;Brien]">
      <Property Name="BodyScript">
        <Value><![CDATA[SELECT 1]]></Value>
      </Property>
    </Element>
  </Model>
</DataSchemaModel>"#;

    #[test]
    fn top_level_elements_only() {
        let model = SchemaModel::from_xml(MODEL).unwrap();

        assert_eq!(
            model.elements().to_vec(),
            vec![
                ModelElement {
                    element_type: "SqlTable".to_string(),
                    name: "[dbo].[Customer]".to_string(),
                },
                ModelElement {
                    element_type: "SqlView".to_string(),
                    name: "[dbo].[ActiveCustomers]".to_string(),
                },
                ModelElement {
                    element_type: "SqlProcedure".to_string(),
                    name: "[sales].[usp_O'Brien]".to_string(),
                },
            ]
        );
    }

    #[test]
    fn names_by_type() {
        let model = SchemaModel::from_xml(MODEL).unwrap();
        let tables: Vec<&str> = model.names_of_type("SqlTable").collect();
        assert_eq!(tables, vec!["[dbo].[Customer]"]);
        assert_eq!(model.names_of_type("SqlSimpleColumn").count(), 0);
    }

    #[test]
    fn missing_model_element_is_an_artifact_error() {
        let err = SchemaModel::from_xml("<DataSchemaModel></DataSchemaModel>").unwrap_err();
        assert!(matches!(err, Error::ArtifactError(_)));
    }

    #[test]
    fn malformed_xml_is_an_artifact_error() {
        let err = SchemaModel::from_xml("<DataSchemaModel><Model></DataSchemaModel>").unwrap_err();
        assert!(matches!(err, Error::ArtifactError(_)));
    }

    #[test]
    fn missing_file_is_an_artifact_error() {
        let err = SchemaModel::open(Path::new("/nonexistent/App.dacpac")).unwrap_err();
        assert!(matches!(err, Error::ArtifactError(_)));
    }
}
