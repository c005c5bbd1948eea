//! Relationship graph from the package root down to comment parts.
//!
//! Loading `.rels` parts moves the graph through four states:
//!
//! 1. `Start`: nothing known.
//! 2. `RootRelationLoaded`: `/_rels/.rels` named the main part.
//! 3. `ContainerRelationsLoaded`: the main part's relationships named every container.
//! 4. `CommentPartsMapped`: every container's relationships have been scanned.
//!
//! A `.rels` part that arrives too early is reported as [`RelsOutcome::Deferred`] so
//! the caller can park it and retry later.

use crate::ooxml::error::Result;
use crate::ooxml::opc::constants::relationship_type as rt;
use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::{PACKAGE_URI, PackURI};
use crate::ooxml::opc::rel::{Relationship, parse_rels_xml};
use crate::ooxml::threads::format::Profile;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Progress of the graph walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GraphState {
    Start,
    RootRelationLoaded,
    ContainerRelationsLoaded,
    CommentPartsMapped,
}

/// What loading one `.rels` part did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelsOutcome {
    /// The part advanced the graph
    Applied,
    /// The part belongs to nothing the graph tracks
    Ignored,
    /// The part may matter once more of the graph is known
    Deferred,
}

/// A worksheet, a slide, or the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Stem of the main part's file name, e.g. `sheet1`
    pub name: String,
    /// Main part of the container
    pub part: PackURI,
    /// Relationship part of the container
    pub rels: PackURI,
    /// Id of the relationship from the package main part
    pub r_id: String,
    scanned: bool,
}

impl Container {
    fn new(part: PackURI, r_id: &str) -> Result<Self> {
        let rels = part.rels_uri().map_err(OpcError::InvalidPackUri)?;
        Ok(Self {
            name: part.stem().to_string(),
            rels,
            part,
            r_id: r_id.to_string(),
            scanned: false,
        })
    }
}

/// Containers and comment-part owners discovered so far.
#[derive(Debug)]
pub struct RelationshipGraph {
    profile: Profile,
    state: GraphState,
    main_part: Option<PackURI>,
    containers: Vec<Container>,
    /// Keyed by canonical (lowercase) part name
    comment_owners: HashMap<String, usize>,
}

impl RelationshipGraph {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            state: GraphState::Start,
            main_part: None,
            containers: Vec::new(),
            comment_owners: HashMap::new(),
        }
    }

    #[inline]
    pub fn state(&self) -> GraphState {
        self.state
    }

    /// The part named by the package's office-document relationship.
    #[inline]
    pub fn main_part(&self) -> Option<&PackURI> {
        self.main_part.as_ref()
    }

    /// Containers in the order the main part's relationships list them.
    #[inline]
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Index of the container that owns a comment part.
    pub fn owner_of(&self, comment_part: &PackURI) -> Option<usize> {
        self.comment_owners.get(&comment_part.canonical()).copied()
    }

    /// Whether every container is known.
    #[inline]
    pub fn containers_final(&self) -> bool {
        self.state >= GraphState::ContainerRelationsLoaded
    }

    /// Apply one `.rels` part.
    ///
    /// # Errors
    /// Unparsable XML, or a relationship the graph needs whose target cannot be
    /// normalized ([`OpcError::MissingRelationshipTarget`]).
    pub fn load_rels(&mut self, partname: &PackURI, blob: &[u8]) -> Result<RelsOutcome> {
        let is_root_rels = partname.is_package_rels() && partname.base_uri().eq_ignore_ascii_case("/_rels");

        if is_root_rels {
            if self.state != GraphState::Start {
                return Ok(RelsOutcome::Ignored);
            }
            self.load_root_rels(partname, blob)?;
            return Ok(RelsOutcome::Applied);
        }

        if self.state == GraphState::RootRelationLoaded && self.is_main_rels(partname) {
            self.load_main_rels(partname, blob)?;
            return Ok(RelsOutcome::Applied);
        }

        if self.containers_final() {
            let index = self
                .containers
                .iter()
                .position(|c| !c.scanned && c.rels.same_part(partname));
            return match index {
                Some(index) => {
                    let rels = parse_rels_xml(blob)?;
                    self.map_comment_parts(index, partname, &rels)?;
                    self.containers[index].scanned = true;
                    self.update_mapped_state();
                    Ok(RelsOutcome::Applied)
                },
                None => {
                    debug!(part = %partname, "relationships belong to no container");
                    Ok(RelsOutcome::Ignored)
                },
            };
        }

        Ok(RelsOutcome::Deferred)
    }

    fn is_main_rels(&self, partname: &PackURI) -> bool {
        self.main_part
            .as_ref()
            .and_then(|main| main.rels_uri().ok())
            .is_some_and(|rels| rels.same_part(partname))
    }

    fn load_root_rels(&mut self, partname: &PackURI, blob: &[u8]) -> Result<()> {
        let rels = parse_rels_xml(blob)?;

        let office_document = rels
            .iter()
            .find(|rel| rel.reltype() == rt::OFFICE_DOCUMENT && !rel.is_external());
        match office_document {
            Some(rel) => {
                let main = rel.target_partname(PACKAGE_URI, partname)?;
                debug!(main_part = %main, "package main part");
                self.main_part = Some(main);
            },
            None => warn!(part = %partname, "package relationships name no main part"),
        }

        self.state = GraphState::RootRelationLoaded;
        Ok(())
    }

    fn load_main_rels(&mut self, partname: &PackURI, blob: &[u8]) -> Result<()> {
        let rels = parse_rels_xml(blob)?;
        let Some(main) = self.main_part.clone() else {
            return Ok(());
        };

        match self.profile.container_reltype {
            Some(container_reltype) => {
                for rel in rels.iter() {
                    if rel.reltype() != container_reltype || rel.is_external() {
                        continue;
                    }
                    let part = rel.target_partname(main.base_uri(), partname)?;
                    debug!(container = %part, r_id = rel.r_id(), "container discovered");
                    self.containers.push(Container::new(part, rel.r_id())?);
                }
            },
            None => {
                // The main part is the only container and owns its comment parts directly.
                let mut body = Container::new(main, "")?;
                body.scanned = true;
                self.containers.push(body);
                self.map_comment_parts(0, partname, &rels)?;
            },
        }

        self.state = GraphState::ContainerRelationsLoaded;
        self.update_mapped_state();
        Ok(())
    }

    fn map_comment_parts(
        &mut self,
        index: usize,
        rels_part: &PackURI,
        rels: &[Relationship],
    ) -> Result<()> {
        let base_uri = self.containers[index].part.base_uri().to_string();

        for rel in rels {
            if !self.profile.is_comment_reltype(rel.reltype()) || rel.is_external() {
                continue;
            }
            let target = rel.target_partname(&base_uri, rels_part)?;
            debug!(
                comment_part = %target,
                container = %self.containers[index].name,
                "comment part mapped"
            );
            self.comment_owners.insert(target.canonical(), index);
        }
        Ok(())
    }

    fn update_mapped_state(&mut self) {
        if self.state == GraphState::ContainerRelationsLoaded
            && self.containers.iter().all(|c| c.scanned)
        {
            self.state = GraphState::CommentPartsMapped;
        }
    }
}
