//! Content type discovery for package parts.
//!
//! Implements the OPC lookup using the Default and Override elements of
//! `[Content_Types].xml`. Rules are kept in insertion order and the first match
//! wins, so the outcome only depends on the manifest, never on the order in which
//! other parts arrive.

use crate::ooxml::opc::error::{OpcError, Result};
use crate::ooxml::opc::packuri::PackURI;
use quick_xml::Reader;
use quick_xml::events::Event;

/// A single rule read from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeRule {
    /// File extension (lowercase, no period) to content type.
    Default {
        extension: String,
        content_type: String,
    },
    /// Part name (stored without its leading slash) to content type.
    Override {
        partname: String,
        content_type: String,
    },
}

/// Content type registry for looking up content types by part name or extension.
#[derive(Debug, Default, Clone)]
pub struct ContentTypeRegistry {
    /// Default rules, in manifest order
    defaults: Vec<ContentTypeRule>,

    /// Override rules, in manifest order
    overrides: Vec<ContentTypeRule>,
}

impl ContentTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse content types from [Content_Types].xml.
    ///
    /// Uses quick-xml for efficient streaming XML parsing with minimal allocation.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut registry = Self::new();
        registry.load_xml(xml)?;
        Ok(registry)
    }

    /// Append the rules of a [Content_Types].xml document to this registry.
    pub fn load_xml(&mut self, xml: &[u8]) -> Result<()> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    match e.local_name().as_ref() {
                        b"Default" => {
                            // <Default Extension="xml" ContentType="application/xml"/>
                            let mut extension = None;
                            let mut content_type = None;

                            for attr in e.attributes() {
                                let attr = attr?;
                                match attr.key.as_ref() {
                                    b"Extension" => {
                                        extension = Some(attr.unescape_value()?.to_string());
                                    },
                                    b"ContentType" => {
                                        content_type = Some(attr.unescape_value()?.to_string());
                                    },
                                    _ => {},
                                }
                            }

                            if let (Some(ext), Some(ct)) = (extension, content_type) {
                                self.add_default(&ext, &ct);
                            }
                        },
                        b"Override" => {
                            // <Override PartName="/word/document.xml" ContentType="..."/>
                            let mut partname = None;
                            let mut content_type = None;

                            for attr in e.attributes() {
                                let attr = attr?;
                                match attr.key.as_ref() {
                                    b"PartName" => {
                                        partname = Some(attr.unescape_value()?.to_string());
                                    },
                                    b"ContentType" => {
                                        content_type = Some(attr.unescape_value()?.to_string());
                                    },
                                    _ => {},
                                }
                            }

                            if let (Some(pn), Some(ct)) = (partname, content_type) {
                                self.add_override(&pn, &ct);
                            }
                        },
                        _ => {},
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(OpcError::XmlError(format!(
                        "Content types parse error: {}",
                        e
                    )));
                },
                _ => {},
            }
            buf.clear();
        }

        Ok(())
    }

    /// Add a default content type mapping for a file extension.
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults.push(ContentTypeRule::Default {
            extension: extension.trim_start_matches('.').to_ascii_lowercase(),
            content_type: content_type.to_string(),
        });
    }

    /// Add an override content type mapping for a specific partname.
    pub fn add_override(&mut self, partname: &str, content_type: &str) {
        self.overrides.push(ContentTypeRule::Override {
            partname: canonical_partname(partname),
            content_type: content_type.to_string(),
        });
    }

    /// Get the content type for a partname.
    ///
    /// Overrides are consulted first, in manifest order: the first override whose part
    /// name equals or is contained in the queried path wins. Only when no override
    /// applies is the extension looked up among the defaults.
    pub fn resolve(&self, pack_uri: &PackURI) -> Option<&str> {
        let query = canonical_partname(pack_uri.as_str());

        let overridden = self.overrides.iter().find_map(|rule| match rule {
            ContentTypeRule::Override {
                partname,
                content_type,
            } if !partname.is_empty() && query.contains(partname.as_str()) => {
                Some(content_type.as_str())
            },
            _ => None,
        });
        if overridden.is_some() {
            return overridden;
        }

        let ext = pack_uri.ext().to_ascii_lowercase();
        if ext.is_empty() {
            return None;
        }
        self.defaults.iter().find_map(|rule| match rule {
            ContentTypeRule::Default {
                extension,
                content_type,
            } if *extension == ext => Some(content_type.as_str()),
            _ => None,
        })
    }

    /// Iterate over all rules, defaults first.
    pub fn rules(&self) -> impl Iterator<Item = &ContentTypeRule> {
        self.defaults.iter().chain(self.overrides.iter())
    }
}

/// Part names compare case-insensitively and without their leading slash.
fn canonical_partname(partname: &str) -> String {
    partname
        .replace('\\', "/")
        .trim_start_matches('/')
        .to_ascii_lowercase()
}
