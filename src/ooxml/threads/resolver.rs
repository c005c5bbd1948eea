//! Package resolution: from unordered archive entries to a comment forest.
//!
//! [`PackageResolver`] is the single writer of all resolution state. Entries are
//! [ingested](PackageResolver::ingest) in whatever order the archive yields them;
//! those that depend on state not known yet are parked in a [`PendingQueue`] and
//! retried by [`finish`](PackageResolver::finish).
//!
//! [`CommentExtractor`] ties this to a file on disk.
//!
//! # Examples
//!
//! ```rust,no_run
//! use longan::CommentExtractor;
//!
//! let forest = CommentExtractor::from_path("review.xlsx")?.extract()?;
//! for root in forest.roots() {
//!     println!("{} by {}: {}", root.id, forest.display_name(&root.author_id), root.text);
//! }
//! # Ok::<(), longan::OoxmlError>(())
//! ```

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::opc::content_types::ContentTypeRegistry;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::PackURI;
use crate::ooxml::opc::pending::PendingQueue;
use crate::ooxml::opc::phys_pkg::PhysPkgReader;
use crate::ooxml::threads::format::{CommentSchema, Format, PartKind, PeopleSchema, Profile};
use crate::ooxml::threads::graph::{RelationshipGraph, RelsOutcome};
use crate::ooxml::threads::loaders::document::{self, CommentExtension};
use crate::ooxml::threads::loaders::{LoadContext, parse_part, part_text, presentation, spreadsheet};
use crate::ooxml::threads::location::{self, AnchorMap};
use crate::ooxml::threads::options::ExtractOptions;
use crate::ooxml::threads::record::{CommentForest, CommentRecord, ContainerThreads, Person};
use crate::ooxml::threads::threader;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolution state of one extraction.
#[derive(Debug)]
pub struct PackageResolver {
    profile: Profile,
    options: ExtractOptions,
    content_types: ContentTypeRegistry,
    manifest_loaded: bool,
    graph: RelationshipGraph,
    pending: PendingQueue,
    persons: BTreeMap<String, Person>,
    comments: Vec<CommentRecord>,
    extensions: Vec<(PackURI, CommentExtension)>,
    anchors: AnchorMap,
    sheet_titles: HashMap<String, String>,
}

impl PackageResolver {
    /// Create a resolver for one package of the given format.
    pub fn new(format: Format, options: ExtractOptions) -> Self {
        let profile = format.profile();
        Self {
            profile,
            options,
            content_types: ContentTypeRegistry::new(),
            manifest_loaded: false,
            graph: RelationshipGraph::new(profile),
            pending: PendingQueue::new(),
            persons: BTreeMap::new(),
            comments: Vec::new(),
            extensions: Vec::new(),
            anchors: AnchorMap::new(),
            sheet_titles: HashMap::new(),
        }
    }

    /// The relationship graph built so far.
    #[inline]
    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Number of parts waiting for more state.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed one archive entry.
    ///
    /// # Errors
    /// Fatal errors only; a part that cannot be interpreted yet is deferred.
    pub fn ingest(&mut self, partname: PackURI, blob: Vec<u8>) -> Result<()> {
        if partname.is_content_types() {
            self.content_types.load_xml(&blob)?;
            self.manifest_loaded = true;
            debug!(rules = self.content_types.rules().count(), "content types loaded");
            return Ok(());
        }

        if self.content_types.resolve(&partname).is_none() && !self.manifest_loaded {
            self.pending.defer(partname, blob);
            return Ok(());
        }

        if !self.try_load(&partname, &blob)? {
            self.pending.defer(partname, blob);
        }
        Ok(())
    }

    /// Drain deferred parts, then locate and thread the comments.
    ///
    /// # Errors
    /// [`OpcError::MissingManifest`] when no manifest was ingested,
    /// [`OpcError::UnresolvedPart`] when parts are still waiting after the retry cap,
    /// and any threading or location error.
    pub fn finish(mut self) -> Result<CommentForest> {
        if !self.manifest_loaded {
            return Err(OpcError::MissingManifest.into());
        }

        let mut pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            let passes = pending.drain(self.options.max_passes, |partname, blob| {
                self.try_load(partname, blob)
            })?;
            debug!(passes, "pending parts resolved");
        }

        self.apply_extensions()?;
        self.drop_note_placeholders();
        self.into_forest()
    }

    /// Load a part whose content type is known. `Ok(false)` means "not yet".
    fn try_load(&mut self, partname: &PackURI, blob: &[u8]) -> Result<bool> {
        let kind = match self.content_types.resolve(partname) {
            Some(content_type) => self.profile.classify(content_type),
            None => return Err(OpcError::UnidentifiedContentType(partname.to_string()).into()),
        };

        let ctx = LoadContext::new(partname, self.options.strict_fragments);
        match kind {
            PartKind::Relationships => {
                let outcome = self.graph.load_rels(partname, blob)?;
                Ok(outcome != RelsOutcome::Deferred)
            },
            PartKind::MainPart => {
                let xml = part_text(partname, blob)?;
                let doc = parse_part(partname, &xml)?;
                match self.profile.format {
                    Format::Workbook => self.sheet_titles = spreadsheet::sheet_titles(&doc),
                    Format::Document => self.anchors = location::document_anchors(&ctx, &doc)?,
                    Format::Presentation => {},
                }
                Ok(true)
            },
            PartKind::People(schema) => {
                let xml = part_text(partname, blob)?;
                let doc = parse_part(partname, &xml)?;
                let persons = match schema {
                    PeopleSchema::SheetPersons => spreadsheet::load_persons(&ctx, &doc)?,
                    PeopleSchema::WordPeople => document::load_people(&ctx, &doc)?,
                    PeopleSchema::SlideLegacyAuthors => presentation::load_legacy_authors(&ctx, &doc)?,
                    PeopleSchema::SlideModernAuthors => presentation::load_modern_authors(&ctx, &doc)?,
                };
                for person in persons {
                    self.persons.insert(person.id.clone(), person);
                }
                Ok(true)
            },
            PartKind::Comments(schema) => {
                if self.graph.owner_of(partname).is_none() {
                    return Ok(false);
                }
                let xml = part_text(partname, blob)?;
                let doc = parse_part(partname, &xml)?;
                let mut comments = match schema {
                    CommentSchema::SheetThreaded => spreadsheet::load_threaded_comments(&ctx, &doc)?,
                    CommentSchema::SheetNotes => spreadsheet::load_notes(&ctx, &doc)?,
                    CommentSchema::WordComments => document::load_comments(&ctx, &doc)?,
                    CommentSchema::SlideLegacy => presentation::load_legacy_comments(&ctx, &doc)?,
                    CommentSchema::SlideModern => presentation::load_modern_comments(&ctx, &doc)?,
                };
                debug!(part = %partname, count = comments.len(), "comments loaded");
                self.comments.append(&mut comments);
                Ok(true)
            },
            PartKind::CommentsExtended => {
                let xml = part_text(partname, blob)?;
                let doc = parse_part(partname, &xml)?;
                let extensions = document::load_extensions(&ctx, &doc)?;
                self.extensions
                    .extend(extensions.into_iter().map(|ext| (partname.clone(), ext)));
                Ok(true)
            },
            PartKind::Other => Ok(true),
        }
    }

    /// Copy threading and resolution data from `commentsExtended` onto document comments.
    fn apply_extensions(&mut self) -> Result<()> {
        if self.extensions.is_empty() {
            return Ok(());
        }

        let by_para: HashMap<&str, usize> = self
            .comments
            .iter()
            .enumerate()
            .filter(|(_, c)| c.schema() == CommentSchema::WordComments)
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();
        let mut updates = Vec::with_capacity(self.extensions.len());
        for (part, ext) in &self.extensions {
            match by_para.get(ext.para_id.as_str()) {
                Some(&i) => updates.push((i, ext.parent_para_id.clone(), ext.done)),
                None => LoadContext::new(part, self.options.strict_fragments)
                    .fragment(format!("commentEx {} matches no comment", ext.para_id))?,
            }
        }

        for (i, parent_id, done) in updates {
            self.comments[i].parent_id = parent_id;
            self.comments[i].done = done;
        }
        Ok(())
    }

    /// Drop legacy notes that Excel writes as placeholders for threaded comments.
    fn drop_note_placeholders(&mut self) {
        let threaded: HashSet<(Option<String>, String)> = self
            .comments
            .iter()
            .filter(|c| c.schema() == CommentSchema::SheetThreaded)
            .map(|c| (self.owner_name(c), c.reference.clone()))
            .collect();
        if threaded.is_empty() {
            return;
        }

        let before = self.comments.len();
        let graph = &self.graph;
        self.comments.retain(|c| {
            c.schema() != CommentSchema::SheetNotes
                || !threaded.contains(&(owner_name_in(graph, c), c.reference.clone()))
        });
        debug!(dropped = before - self.comments.len(), "placeholder notes dropped");
    }

    fn owner_name(&self, comment: &CommentRecord) -> Option<String> {
        owner_name_in(&self.graph, comment)
    }

    fn container_title(&self, index: usize) -> String {
        let container = &self.graph.containers()[index];
        self.sheet_titles
            .get(&container.r_id)
            .cloned()
            .unwrap_or_else(|| container.name.clone())
    }

    fn into_forest(mut self) -> Result<CommentForest> {
        let mut comments = std::mem::take(&mut self.comments);
        // Load order follows archive order; part name order does not.
        comments.sort_by(|a, b| a.owner_part.cmp(&b.owner_part));

        let containers = self.graph.containers();
        let mut grouped: Vec<Vec<CommentRecord>> = vec![Vec::new(); containers.len()];

        for mut comment in comments {
            let Some(index) = owner_index(&self.graph, &comment) else {
                // Comment parts are only loaded once their owner is known.
                return Err(OoxmlError::Other(format!(
                    "comment {} has no owning container",
                    comment.id
                )));
            };
            comment.location = location::locate(&comment, &self.container_title(index), &self.anchors)?;
            grouped[index].push(comment);
        }

        let mut threads = Vec::with_capacity(containers.len());
        for (index, comments) in grouped.into_iter().enumerate() {
            let name = self.container_title(index);
            let roots = threader::thread(&name, comments)?;
            threads.push(ContainerThreads {
                part: containers[index].part.to_string(),
                name,
                roots,
            });
        }

        let forest = CommentForest {
            containers: threads,
            persons: self.persons,
        };
        info!(
            containers = forest.containers.len(),
            comments = forest.comment_count(),
            "comment forest built"
        );
        Ok(forest)
    }
}

fn owner_index(graph: &RelationshipGraph, comment: &CommentRecord) -> Option<usize> {
    let part = PackURI::new(comment.owner_part.as_deref()?).ok()?;
    graph.owner_of(&part)
}

fn owner_name_in(graph: &RelationshipGraph, comment: &CommentRecord) -> Option<String> {
    owner_index(graph, comment).map(|i| graph.containers()[i].name.clone())
}

/// Resolve every entry of an in-memory package.
///
/// Entries may come in any order.
pub fn resolve_entries<I>(format: Format, options: ExtractOptions, entries: I) -> Result<CommentForest>
where
    I: IntoIterator<Item = (PackURI, Vec<u8>)>,
{
    let mut resolver = PackageResolver::new(format, options);
    for (partname, blob) in entries {
        resolver.ingest(partname, blob)?;
    }
    resolver.finish()
}

/// Extracts the comment forest of one package file.
///
/// Created by [`CommentExtractor::from_path`], which picks the container format
/// from the file extension.
#[derive(Debug, Clone)]
pub struct CommentExtractor {
    path: PathBuf,
    format: Format,
    options: ExtractOptions,
}

impl CommentExtractor {
    /// Pick the format of `path` from its extension.
    ///
    /// # Errors
    /// [`OoxmlError::UnrecognizedExtension`] for anything but `docx`, `xlsx` and `pptx`.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let format = Format::from_path(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            format,
            options: ExtractOptions::default(),
        })
    }

    /// Replace the extraction options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the package and build its comment forest.
    pub fn extract(&self) -> Result<CommentForest> {
        info!(path = %self.path.display(), format = %self.format, "extracting comments");
        let reader = PhysPkgReader::open(&self.path)?;
        let entries = reader.entries()?;
        resolve_entries(
            self.format,
            self.options.clone(),
            entries.into_iter().map(|e| (e.partname, e.blob)),
        )
    }

    /// Run [`extract`](Self::extract) on the blocking thread pool.
    pub async fn extract_async(self) -> Result<CommentForest> {
        tokio::task::spawn_blocking(move || self.extract())
            .await
            .map_err(|e| OoxmlError::Other(format!("extraction task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
    <Override PartName="/xl/threadedComments/threadedComment1.xml" ContentType="application/vnd.ms-excel.threadedcomments+xml"/>
    <Override PartName="/xl/comments1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.comments+xml"/>
    <Override PartName="/xl/persons/person.xml" ContentType="application/vnd.ms-excel.person+xml"/>
</Types>"#;

    const ROOT_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    const WORKBOOK: &str = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
        xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <sheets><sheet name="Budget" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#;

    const WORKBOOK_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#;

    const SHEET: &str = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"/>"#;

    const SHEET_RELS: &str = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.microsoft.com/office/2017/10/relationships/threadedComment" Target="../threadedComments/threadedComment1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="../comments1.xml"/>
</Relationships>"#;

    const THREADED: &str = r#"<ThreadedComments xmlns="http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments">
    <threadedComment ref="A1" dT="2023-01-02T03:04:05.06" personId="{P1}" id="{C1}"><text>Check this</text></threadedComment>
    <threadedComment ref="A1" dT="2023-01-02T04:00:00.00" personId="{P1}" id="{C2}" parentId="{C1}"><text>Done</text></threadedComment>
</ThreadedComments>"#;

    const NOTES: &str = r#"<comments xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
    <authors><author>tc={C1}</author><author>Carol</author></authors>
    <commentList>
        <comment ref="A1" authorId="0"><text><t>[Threaded comment] Check this</t></text></comment>
        <comment ref="B2" authorId="1"><text><t>Old note</t></text></comment>
    </commentList>
</comments>"#;

    const PERSONS: &str = r#"<personList xmlns="http://schemas.microsoft.com/office/spreadsheetml/2018/threadedcomments">
    <person displayName="Alice" id="{P1}" userId="alice" providerId="None"/>
</personList>"#;

    fn workbook_entries() -> Vec<(PackURI, Vec<u8>)> {
        [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
            ("xl/worksheets/sheet1.xml", SHEET),
            ("xl/worksheets/_rels/sheet1.xml.rels", SHEET_RELS),
            ("xl/threadedComments/threadedComment1.xml", THREADED),
            ("xl/comments1.xml", NOTES),
            ("xl/persons/person.xml", PERSONS),
        ]
        .into_iter()
        .map(|(name, xml)| (PackURI::from_member(name), xml.as_bytes().to_vec()))
        .collect()
    }

    fn resolve(entries: Vec<(PackURI, Vec<u8>)>) -> Result<CommentForest> {
        resolve_entries(Format::Workbook, ExtractOptions::default(), entries)
    }

    #[test]
    fn test_workbook_in_archive_order() {
        let forest = resolve(workbook_entries()).unwrap();

        assert_eq!(forest.containers.len(), 1);
        let sheet = &forest.containers[0];
        assert_eq!(sheet.name, "Budget");
        assert_eq!(sheet.part, "/xl/worksheets/sheet1.xml");

        // The placeholder note on A1 is dropped, the note on B2 stays.
        let ids: Vec<_> = sheet.roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["note-B2", "{C1}"]);

        let root = forest.find("{C1}").unwrap();
        assert_eq!(root.location.as_deref(), Some("Budget: A1"));
        assert_eq!(root.timestamp, "2023-01-02T03:04:05.060Z");
        assert_eq!(forest.display_name(&root.author_id), "Alice");
        assert_eq!(root.replies()[0].id, "{C2}");
        assert_eq!(forest.comment_count(), 3);
    }

    #[test]
    fn test_workbook_in_reverse_order() {
        let mut entries = workbook_entries();
        entries.reverse();
        assert_eq!(resolve(entries).unwrap(), resolve(workbook_entries()).unwrap());
    }

    #[test]
    fn test_manifest_last_defers_everything() {
        let mut entries = workbook_entries();
        entries.rotate_left(1);

        let mut resolver = PackageResolver::new(Format::Workbook, ExtractOptions::default());
        let (last, rest) = entries.split_last().unwrap();
        for (partname, blob) in rest.iter().cloned() {
            resolver.ingest(partname, blob).unwrap();
        }
        assert_eq!(resolver.pending_len(), rest.len());

        resolver.ingest(last.0.clone(), last.1.clone()).unwrap();
        assert_eq!(resolver.finish().unwrap().comment_count(), 3);
    }

    #[test]
    fn test_missing_manifest() {
        let entries = workbook_entries().into_iter().skip(1).collect();
        assert!(matches!(
            resolve(entries),
            Err(OoxmlError::Opc(OpcError::MissingManifest))
        ));
    }

    #[test]
    fn test_missing_sheet_rels_is_unresolved() {
        let entries = workbook_entries()
            .into_iter()
            .filter(|(name, _)| name.as_str() != "/xl/worksheets/_rels/sheet1.xml.rels")
            .collect();

        match resolve(entries) {
            Err(OoxmlError::Opc(OpcError::UnresolvedPart { parts, .. })) => {
                assert!(parts.iter().any(|p| p.contains("threadedComment1.xml")));
            },
            other => panic!("expected UnresolvedPart, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_content_type_after_manifest() {
        let mut entries = workbook_entries();
        entries.push((PackURI::from_member("xl/media/image1.png"), vec![0x89, b'P']));

        assert!(matches!(
            resolve(entries),
            Err(OoxmlError::Opc(OpcError::UnidentifiedContentType(_)))
        ));
    }

    fn replace_part(entries: &mut [(PackURI, Vec<u8>)], member: &str, xml: &str) {
        let slot = entries
            .iter_mut()
            .find(|(name, _)| name.as_str() == PackURI::from_member(member).as_str())
            .unwrap();
        slot.1 = xml.as_bytes().to_vec();
    }

    #[test]
    fn test_rels_target_case_differs_from_member() {
        let mut entries = workbook_entries();
        replace_part(
            &mut entries,
            "xl/worksheets/_rels/sheet1.xml.rels",
            &SHEET_RELS.replace("threadedComment1.xml", "ThreadedComment1.xml"),
        );

        let forest = resolve(entries).unwrap();
        assert_eq!(forest.find("{C1}").unwrap().replies().len(), 1);
        assert_eq!(forest.comment_count(), 3);
    }

    #[test]
    fn test_malformed_fragment_policy() {
        let mut entries = workbook_entries();
        replace_part(
            &mut entries,
            "xl/threadedComments/threadedComment1.xml",
            &THREADED.replace("2023-01-02T03:04:05.06", "yesterday"),
        );

        let forest = resolve(entries.clone()).unwrap();
        let root = forest.find("{C1}").unwrap();
        assert_eq!(root.timestamp, "");
        assert_eq!(root.text, "Check this");

        let strict = ExtractOptions::new().with_strict_fragments(true);
        match resolve_entries(Format::Workbook, strict, entries) {
            Err(OoxmlError::MalformedFragment { part, message }) => {
                assert_eq!(part, "/xl/threadedComments/threadedComment1.xml");
                assert!(message.contains("yesterday"));
            },
            other => panic!("expected MalformedFragment, got {:?}", other),
        }
    }

    #[test]
    fn test_utf16_part() {
        let mut entries = workbook_entries();
        let persons = entries
            .iter_mut()
            .find(|(name, _)| name.as_str() == "/xl/persons/person.xml")
            .unwrap();
        persons.1 = [0xff, 0xfe]
            .into_iter()
            .chain(PERSONS.encode_utf16().flat_map(u16::to_le_bytes))
            .collect();

        let forest = resolve(entries).unwrap();
        assert_eq!(forest.display_name("{P1}"), "Alice");
    }
}
