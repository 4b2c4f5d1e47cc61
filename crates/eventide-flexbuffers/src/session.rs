use std::cell::RefCell;
use std::collections::HashSet;

use eventide_serde::SerdeError;

pub(crate) enum FrameKind {
    Array,
    Map,
}

pub(crate) struct Frame {
    pub(crate) kind: FrameKind,
    pub(crate) start: usize,
    pub(crate) seen_keys: HashSet<String>,
}

struct SessionState {
    builder: flexbuffers::Builder,
    frames: Vec<Frame>,
    root_written: bool,
    error: Option<SerdeError>,
}

/// Owns the single [`flexbuffers::Builder`] a write session emits into, plus
/// the contract-compliance bookkeeping (single root, open-frame stack,
/// sticky error) that sits on top of it.
///
/// A [`crate::FlexSerializer`] handle never owns this directly — it borrows
/// it for the duration of exactly one `Serializer` call, which is enough
/// since every nested write happens through synchronous recursion on the
/// same thread.
pub struct Session {
    state: RefCell<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Start a fresh write session with an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SessionState {
                builder: flexbuffers::Builder::default(),
                frames: Vec::new(),
                root_written: false,
                error: None,
            }),
        }
    }

    /// Sticky-error guard: every public operation starts by calling this.
    pub(crate) fn check(&self) -> Result<(), SerdeError> {
        if let Some(err) = self.state.borrow().error {
            return Err(err);
        }
        Ok(())
    }

    fn fail(&self, err: SerdeError) -> SerdeError {
        tracing::debug!(target: "eventide.flexbuffers", code = err.code(), "write session failed");
        self.state.borrow_mut().error = Some(err);
        err
    }

    /// Contract check run before writing any leaf or opening any container:
    /// a second root value, or a value where the enclosing map frame expects
    /// the next call to be a fresh key/value pair entirely (enforced by the
    /// `serialize_entry`/`serialize_field` call shape itself, so there is
    /// nothing further to check there), fails the session.
    pub(crate) fn before_value(&self) -> Result<(), SerdeError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        if state.frames.is_empty() {
            if state.root_written {
                drop(state);
                return Err(self.fail(SerdeError::InvalidState));
            }
            state.root_written = true;
        }
        Ok(())
    }

    pub(crate) fn with_builder<R>(&self, f: impl FnOnce(&mut flexbuffers::Builder) -> R) -> R {
        f(&mut self.state.borrow_mut().builder)
    }

    pub(crate) fn push_frame(&self, kind: FrameKind, start: usize) {
        self.state.borrow_mut().frames.push(Frame {
            kind,
            start,
            seen_keys: HashSet::new(),
        });
    }

    /// Record `key` as seen in the current (innermost) map frame, failing
    /// with [`SerdeError::DuplicateKeys`] if it was already written.
    pub(crate) fn note_map_key(&self, key: &str) -> Result<(), SerdeError> {
        let mut state = self.state.borrow_mut();
        let frame = state.frames.last_mut().expect("note_map_key outside a map frame");
        if !frame.seen_keys.insert(key.to_string()) {
            drop(state);
            return Err(self.fail(SerdeError::DuplicateKeys));
        }
        Ok(())
    }

    /// Pop the innermost frame, asserting it matches `kind`, and return its
    /// start offset for the matching `end_vector`/`end_map` builder call.
    pub(crate) fn pop_frame(&self, kind_matches: impl Fn(&FrameKind) -> bool) -> Result<usize, SerdeError> {
        self.check()?;
        let mut state = self.state.borrow_mut();
        match state.frames.last() {
            Some(frame) if kind_matches(&frame.kind) => {
                let frame = state.frames.pop().expect("checked above");
                Ok(frame.start)
            }
            _ => {
                drop(state);
                Err(self.fail(SerdeError::InvalidState))
            }
        }
    }

    /// Finish the session: legal only once a root value has been written and
    /// every opened container has been closed.
    pub fn finalize(&self) -> Result<Vec<u8>, SerdeError> {
        self.check()?;
        let state = self.state.borrow();
        if !state.root_written || !state.frames.is_empty() {
            drop(state);
            return Err(self.fail(SerdeError::InvalidState));
        }
        Ok(state.builder.view().to_vec())
    }
}

pub(crate) fn matches_array(kind: &FrameKind) -> bool {
    matches!(kind, FrameKind::Array)
}

pub(crate) fn matches_map(kind: &FrameKind) -> bool {
    matches!(kind, FrameKind::Map)
}
