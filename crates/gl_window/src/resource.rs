//! Owns-or-null wrappers for native handles and the teardown policy
//!
//! An [`Owned`] either holds a handle the window is responsible for releasing
//! or holds nothing. Releasing goes through [`Owned::take`], which yields the
//! handle at most once, so a double release cannot be written.

use crate::error::{DestroyError, TeardownErrors};

/// A native handle the window owns, or null
#[derive(Debug)]
#[must_use = "an owned handle must be released through `take`"]
pub struct Owned<H: Copy> {
    handle: Option<H>,
}

impl<H: Copy> Owned<H> {
    /// The null wrapper
    pub const fn null() -> Self {
        Self { handle: None }
    }

    /// Take ownership of a freshly acquired handle
    pub const fn new(handle: H) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Borrow the handle without giving up ownership
    pub const fn get(&self) -> Option<H> {
        self.handle
    }

    /// True if nothing is owned
    pub const fn is_null(&self) -> bool {
        self.handle.is_none()
    }

    /// Give up ownership so the caller can release the handle
    ///
    /// Returns `None` on every call after the first.
    pub fn take(&mut self) -> Option<H> {
        self.handle.take()
    }

    /// Replace the owned handle, returning the previous one for release
    pub fn replace(&mut self, handle: H) -> Option<H> {
        self.handle.replace(handle)
    }
}

impl<H: Copy> Default for Owned<H> {
    fn default() -> Self {
        Self::null()
    }
}

/// Collects teardown failures without ever propagating them mid-sequence
#[derive(Debug, Default)]
pub struct Teardown {
    errors: Vec<DestroyError>,
}

impl Teardown {
    /// Start an empty teardown
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one release step if `owned` still holds a handle
    ///
    /// The handle is taken before the step runs, so a failed release is not
    /// retried by a later teardown.
    pub fn release<H, E, F>(&mut self, owned: &mut Owned<H>, step: F)
    where
        H: Copy,
        F: FnOnce(H) -> Result<(), E>,
        E: Into<DestroyError>,
    {
        if let Some(handle) = owned.take() {
            self.step(|| step(handle));
        }
    }

    /// Run one release step unconditionally
    pub fn step<E, F>(&mut self, step: F)
    where
        F: FnOnce() -> Result<(), E>,
        E: Into<DestroyError>,
    {
        if let Err(error) = step() {
            self.errors.push(error.into());
        }
    }

    /// Finish, returning every collected failure
    pub fn finish(self) -> Result<(), TeardownErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(TeardownErrors(self.errors))
        }
    }

    /// Finish, logging every collected failure instead of returning it
    pub fn finish_logged(self, context: &str) {
        for error in &self.errors {
            log::warn!("{context}: {error}");
        }
    }
}
