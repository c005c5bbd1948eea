/// Provides the PackURI value type and utilities for working with package URIs.
///
/// A PackURI represents a part name within an OPC package. Archive member names
/// (`xl/workbook.xml`) and relationship targets (`../comments/comment1.xml`) are both
/// normalized into this one form before they are compared.
/// Represents a package URI, which is a partname within an OPC package.
///
/// PackURIs always begin with a forward slash and use forward slashes as path separators,
/// following the OPC specification. They provide access to various components like
/// the base URI (directory), filename and extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackURI {
    /// The full pack URI string (e.g., "/word/document.xml")
    uri: String,
}

impl PackURI {
    /// Create a new PackURI from a string.
    ///
    /// # Arguments
    /// * `uri` - The URI string, which must begin with a forward slash
    ///
    /// # Returns
    /// * `Ok(PackURI)` if the URI is valid
    /// * `Err` if the URI doesn't start with a forward slash
    pub fn new<S: Into<String>>(uri: S) -> Result<Self, String> {
        let uri = uri.into();
        if !uri.starts_with('/') {
            return Err(format!("PackURI must begin with slash, got '{}'", uri));
        }
        Ok(PackURI { uri })
    }

    /// Create a PackURI from a ZIP member name such as `xl/worksheets/sheet1.xml`.
    ///
    /// Backslashes written by some producers are turned into forward slashes.
    pub fn from_member(membername: &str) -> Self {
        let cleaned = membername.replace('\\', "/");
        let trimmed = cleaned.trim_start_matches('/');
        PackURI {
            uri: format!("/{}", trimmed),
        }
    }

    /// Create a PackURI from a relative reference and a base URI.
    ///
    /// This translates a relative reference (like "../styles.xml") onto a base URI
    /// (like "/word") to produce an absolute PackURI (like "/styles.xml"). A reference
    /// that starts with a slash is already absolute and ignores the base.
    ///
    /// Fails when the reference is empty or climbs above the package root.
    pub fn from_rel_ref(base_uri: &str, relative_ref: &str) -> Result<Self, String> {
        let relative_ref = relative_ref.trim().replace('\\', "/");
        if relative_ref.is_empty() {
            return Err(format!("empty relationship target from base '{}'", base_uri));
        }

        let joined = if relative_ref.starts_with('/') {
            relative_ref
        } else {
            Self::join_paths(base_uri, &relative_ref)
        };
        let normalized = Self::normalize_path(&joined)
            .ok_or_else(|| format!("'{}' escapes the package root", joined))?;
        Self::new(normalized)
    }

    /// Get the base URI (directory portion) of this PackURI.
    ///
    /// For example, "/ppt/slides" for "/ppt/slides/slide1.xml".
    /// For the package pseudo-partname "/", returns "/".
    pub fn base_uri(&self) -> &str {
        match self.uri.rfind('/') {
            Some(0) | None => "/",
            Some(pos) => &self.uri[..pos],
        }
    }

    /// Get the filename portion of this PackURI.
    ///
    /// For example, "slide1.xml" for "/ppt/slides/slide1.xml".
    /// For the package pseudo-partname "/", returns an empty string.
    pub fn filename(&self) -> &str {
        if let Some(pos) = self.uri.rfind('/') {
            &self.uri[pos + 1..]
        } else {
            ""
        }
    }

    /// Get the extension portion of this PackURI.
    ///
    /// For example, "xml" for "/word/document.xml" (note: no leading period).
    pub fn ext(&self) -> &str {
        let filename = self.filename();
        if let Some(pos) = filename.rfind('.') {
            &filename[pos + 1..]
        } else {
            ""
        }
    }

    /// Get the filename without its extension, e.g. "sheet1" for "/xl/worksheets/sheet1.xml".
    pub fn stem(&self) -> &str {
        let filename = self.filename();
        match filename.rfind('.') {
            Some(pos) if pos > 0 => &filename[..pos],
            _ => filename,
        }
    }

    /// Get the membername (URI with leading slash stripped).
    ///
    /// This is the form used as the Zip file membername for the package item.
    /// Returns an empty string for the package pseudo-partname "/".
    pub fn membername(&self) -> &str {
        &self.uri[1..]
    }

    /// Get the PackURI of the .rels part corresponding to this PackURI.
    ///
    /// For example, "/word/_rels/document.xml.rels" for "/word/document.xml".
    pub fn rels_uri(&self) -> Result<PackURI, String> {
        let filename = self.filename();
        let base_uri = self.base_uri();

        let rels_filename = format!("{}.rels", filename);
        let rels_uri_str = if base_uri == "/" {
            format!("/_rels/{}", rels_filename)
        } else {
            format!("{}/_rels/{}", base_uri, rels_filename)
        };

        Self::new(rels_uri_str)
    }

    /// Whether this is the package-level relationships part (`/_rels/.rels`).
    pub fn is_package_rels(&self) -> bool {
        self.filename().eq_ignore_ascii_case(".rels")
    }

    /// Whether this is the content type manifest.
    pub fn is_content_types(&self) -> bool {
        self.uri.eq_ignore_ascii_case(CONTENT_TYPES_URI)
    }

    /// Lowercase form of the part name, for use as a lookup key.
    ///
    /// Part names are compared case-insensitively.
    pub fn canonical(&self) -> String {
        self.uri.to_ascii_lowercase()
    }

    /// Whether both part names denote the same part.
    #[inline]
    pub fn same_part(&self, other: &PackURI) -> bool {
        self.uri.eq_ignore_ascii_case(&other.uri)
    }

    /// Get the full URI string.
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// Helper function to join two paths using forward slashes
    fn join_paths(base: &str, rel: &str) -> String {
        if base.ends_with('/') {
            format!("{}{}", base, rel)
        } else {
            format!("{}/{}", base, rel)
        }
    }

    /// Helper function to normalize a path (resolve ".." and ".")
    fn normalize_path(path: &str) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();

        for part in path.split('/') {
            match part {
                "" | "." => {},
                ".." => {
                    parts.pop()?;
                },
                _ => parts.push(part),
            }
        }

        Some(format!("/{}", parts.join("/")))
    }
}

impl std::fmt::Display for PackURI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.uri)
    }
}

impl AsRef<str> for PackURI {
    fn as_ref(&self) -> &str {
        &self.uri
    }
}

/// The package pseudo-partname, representing the package itself
pub const PACKAGE_URI: &str = "/";

/// The URI for the [Content_Types].xml part
pub const CONTENT_TYPES_URI: &str = "/[Content_Types].xml";
