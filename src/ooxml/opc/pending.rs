//! Deferred resolution of parts that arrive before the state they depend on.
//!
//! Parts of a package can be stored in any order, so a comment part may be read
//! before the relationship chain that names its owner. Such parts are parked here
//! and retried in full passes until everything resolves or the pass cap is hit.

use crate::ooxml::opc::error::OpcError;
use crate::ooxml::opc::packuri::PackURI;
use tracing::debug;

/// Default number of full passes over the queue.
pub const DEFAULT_MAX_PASSES: usize = 10;

/// Parts waiting for more package state, kept in the order they were deferred.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Vec<(PackURI, Vec<u8>)>,
}

impl PendingQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a part for a later pass. A part deferred twice keeps its latest content.
    pub fn defer(&mut self, partname: PackURI, blob: Vec<u8>) {
        if let Some(slot) = self.entries.iter_mut().find(|(p, _)| *p == partname) {
            slot.1 = blob;
            return;
        }
        debug!(part = %partname, "deferring part");
        self.entries.push((partname, blob));
    }

    /// Number of parts still waiting.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is waiting.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Part names still waiting, in deferral order.
    pub fn partnames(&self) -> impl Iterator<Item = &PackURI> {
        self.entries.iter().map(|(p, _)| p)
    }

    /// Retry every parked part until the queue is empty or `max_passes` full passes ran.
    ///
    /// `try_resolve` returns `Ok(true)` when the part was consumed and `Ok(false)` when
    /// it still lacks state. An error from `try_resolve` aborts the drain. Parts left
    /// over after the last pass produce [`OpcError::UnresolvedPart`].
    ///
    /// Returns the number of passes that ran.
    pub fn drain<F, E>(&mut self, max_passes: usize, mut try_resolve: F) -> Result<usize, E>
    where
        F: FnMut(&PackURI, &[u8]) -> Result<bool, E>,
        E: From<OpcError>,
    {
        let mut passes = 0;

        while !self.entries.is_empty() && passes < max_passes {
            passes += 1;
            let before = self.entries.len();

            let mut waiting = Vec::with_capacity(before);
            for (partname, blob) in std::mem::take(&mut self.entries) {
                if !try_resolve(&partname, &blob)? {
                    waiting.push((partname, blob));
                }
            }
            self.entries = waiting;

            debug!(pass = passes, remaining = self.entries.len(), "pending pass finished");

            // A pass that consumed nothing leaves the state unchanged, so later passes cannot
            // make progress either.
            if self.entries.len() == before {
                break;
            }
        }

        if self.entries.is_empty() {
            Ok(passes)
        } else {
            Err(OpcError::UnresolvedPart {
                passes,
                parts: self.partnames().map(|p| p.to_string()).collect(),
            }
            .into())
        }
    }
}
