use crate::error::{missing_or_read, Converter};
use crate::Result;
use roxmltree::{Document, Node};
use std::path::Path;

/// Kind of a published collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectionType {
    Synth,
    Panorama,
}

/// Answer of the collection web service, saved next to the metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionInfo {
    pub succeeded: bool,
    pub collection_type: CollectionType,
    pub dzc_url: String,
    pub json_url: String,
    pub collection_root: String,
    pub privacy_level: String,
}

impl CollectionInfo {
    pub fn parse(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).invalid_err("Failed to parse SOAP response")?;
        let result = document
            .descendants()
            .find(|n| n.is_element() && child(n, "Result").is_some())
            .invalid_err("Cannot find collection result in SOAP response")?;

        let succeeded = child_text(&result, "Result").as_deref() == Some("OK");
        let collection_type = match child_text(&result, "CollectionType").as_deref() {
            Some("Synth") => CollectionType::Synth,
            _ => CollectionType::Panorama,
        };

        Ok(Self {
            succeeded,
            collection_type,
            dzc_url: child_text(&result, "DzcUrl").unwrap_or_default(),
            json_url: child_text(&result, "JsonUrl").unwrap_or_default(),
            collection_root: child_text(&result, "CollectionRoot").unwrap_or_default(),
            privacy_level: child_text(&result, "PrivacyLevel").unwrap_or_default(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path).map_err(|e| missing_or_read(path, e))?;
        Self::parse(&xml)
    }
}

fn child<'a, 'input>(node: &Node<'a, 'input>, tag_name: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag_name))
}

fn child_text(node: &Node, tag_name: &str) -> Option<String> {
    child(node, tag_name)
        .and_then(|n| n.text())
        .map(|t| t.trim().to_string())
}
