//! Ordered track list with a movable "current track" cursor.
//!
//! The playlist is a doubly-linked sequence kept in an index arena, so
//! appending at the tail and stepping in either direction never shift or
//! re-index other tracks. Lookups by ID scan from the head and stop at the
//! first match.
//!
//! Track IDs are expected to be unique. `append` does not check this; when a
//! duplicate slips in, `remove`, `select_by_id`, `update_by_id` and `get` only
//! ever see its first occurrence.
//!
//! The structure is single-owner and does no locking of its own. Share it
//! across threads behind a `Mutex`, as the HTTP server does.

mod arena;

use log::debug;

use crate::domain::track::Track;
use arena::{Arena, Node, NodeId};

#[derive(Debug, Default)]
pub struct Playlist {
    nodes: Arena,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    cursor: Option<NodeId>,
    len: usize,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `track` at the tail. The first track of an empty playlist also
    /// becomes the current one.
    pub fn append(&mut self, track: Track) {
        let id = self.nodes.insert(Node {
            track,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(id),
            None => {
                self.head = Some(id);
                self.cursor = Some(id);
            }
        }

        self.tail = Some(id);
        self.len += 1;
    }

    /// Removes the first track with this ID.
    ///
    /// If it was the current track, the cursor moves to its successor, or to
    /// its predecessor at the tail, or nowhere once the playlist is empty.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.find(id) {
            Some(node) => {
                self.unlink(node);
                true
            }
            None => false,
        }
    }

    /// Steps the cursor forward. Returns `None` at the tail, without wrapping.
    pub fn next(&mut self) -> Option<&Track> {
        let next = self.nodes[self.cursor?].next?;
        self.cursor = Some(next);
        Some(&self.nodes[next].track)
    }

    /// Steps the cursor backward. Returns `None` at the head, without wrapping.
    pub fn previous(&mut self) -> Option<&Track> {
        let prev = self.nodes[self.cursor?].prev?;
        self.cursor = Some(prev);
        Some(&self.nodes[prev].track)
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.map(|node| &self.nodes[node].track)
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current().map(|track| track.id.as_str())
    }

    pub fn is_current(&self, id: &str) -> bool {
        self.current_id() == Some(id)
    }

    /// Moves the cursor to the first track with this ID. An unknown ID leaves
    /// the cursor where it was.
    pub fn select_by_id(&mut self, id: &str) -> Option<&Track> {
        let node = self.find(id)?;
        self.cursor = Some(node);
        Some(&self.nodes[node].track)
    }

    /// Replaces the payload of the first track with this ID in place.
    ///
    /// Position and cursor are untouched, so this is how a duration learned
    /// from the media element gets written back mid-playback. `track.id`
    /// should match `id`; the playlist stores whatever it is given.
    pub fn update_by_id(&mut self, id: &str, track: Track) -> bool {
        match self.find(id) {
            Some(node) => {
                self.nodes[node].track = track;
                true
            }
            None => false,
        }
    }

    /// First track with this ID, without moving the cursor.
    pub fn get(&self, id: &str) -> Option<&Track> {
        self.find(id).map(|node| &self.nodes[node].track)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Owned head-to-tail copy, safe to keep while the playlist changes.
    pub fn all_tracks(&self) -> Vec<Track> {
        self.iter().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            at: self.head,
            remaining: self.len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn find(&self, id: &str) -> Option<NodeId> {
        let mut at = self.head;
        while let Some(node) = at {
            if self.nodes[node].track.id == *id {
                return Some(node);
            }
            at = self.nodes[node].next;
        }
        None
    }

    fn unlink(&mut self, id: NodeId) {
        let (prev, next) = (self.nodes[id].prev, self.nodes[id].next);
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }

        if self.cursor == Some(id) {
            self.cursor = next.or(prev);
            debug!(
                "current track removed, cursor moved to {:?}",
                self.cursor.map(|c| self.nodes[c].track.id.as_str())
            );
        }

        self.nodes.remove(id);
        self.len -= 1;
    }
}

/// Borrowing head-to-tail iterator over a [`Playlist`].
pub struct Iter<'a> {
    nodes: &'a Arena,
    at: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Track;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.at?)?;
        self.at = node.next;
        self.remaining -= 1;
        Some(&node.track)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Playlist {
    type Item = &'a Track;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<Track> for Playlist {
    fn extend<I: IntoIterator<Item = Track>>(&mut self, tracks: I) {
        for track in tracks {
            self.append(track);
        }
    }
}

impl FromIterator<Track> for Playlist {
    fn from_iter<I: IntoIterator<Item = Track>>(tracks: I) -> Self {
        let mut playlist = Playlist::new();
        playlist.extend(tracks);
        playlist
    }
}
