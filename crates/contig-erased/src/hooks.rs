//! Per-element behaviour for type-erased storage.
//!
//! The container only sees `element_size`-byte records. When those records
//! own something (a handle into another allocation, say), the container
//! cannot copy or release them correctly on its own; an [`ElementHooks`]
//! implementation supplies that knowledge.

use std::fmt;

/// Deep-copy and deep-free behaviour for one kind of element record.
///
/// Both methods report success as a `bool`. The container never inspects
/// element bytes itself beyond moving them around; it only calls these.
pub trait ElementHooks {
    /// Copy the record `src` into `dest`, duplicating any owned resources.
    ///
    /// `dest` and `src` are both exactly `element_size` bytes. `dest` holds
    /// zeroed or stale bytes that must be overwritten, not released.
    fn deep_copy(&self, dest: &mut [u8], src: &[u8]) -> bool;

    /// Release any resources owned by the record `element`.
    fn deep_free(&self, element: &mut [u8]) -> bool;
}

/// Default hooks: bytewise copy and no-op free.
///
/// Correct for plain records that own nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawHooks;

impl ElementHooks for RawHooks {
    fn deep_copy(&self, dest: &mut [u8], src: &[u8]) -> bool {
        dest.copy_from_slice(src);
        true
    }

    fn deep_free(&self, _element: &mut [u8]) -> bool {
        true
    }
}

type CopyFn = Box<dyn Fn(&mut [u8], &[u8]) -> bool>;
type FreeFn = Box<dyn Fn(&mut [u8]) -> bool>;

/// Hooks assembled from closures.
///
/// Either side may be left at the [`RawHooks`] default.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use contig_erased::{ElementHooks, FnHooks};
///
/// let copies = Rc::new(Cell::new(0));
/// let seen = Rc::clone(&copies);
/// let hooks = FnHooks::new().on_copy(move |dest, src| {
///     seen.set(seen.get() + 1);
///     dest.copy_from_slice(src);
///     true
/// });
/// let mut out = [0u8; 2];
/// assert!(hooks.deep_copy(&mut out, &[1, 2]));
/// assert_eq!(copies.get(), 1);
/// ```
#[derive(Default)]
pub struct FnHooks {
    copy: Option<CopyFn>,
    free: Option<FreeFn>,
}

impl FnHooks {
    /// Hooks that behave like [`RawHooks`] until configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `copy` as the deep-copy hook.
    pub fn on_copy(mut self, copy: impl Fn(&mut [u8], &[u8]) -> bool + 'static) -> Self {
        self.copy = Some(Box::new(copy));
        self
    }

    /// Use `free` as the deep-free hook.
    pub fn on_free(mut self, free: impl Fn(&mut [u8]) -> bool + 'static) -> Self {
        self.free = Some(Box::new(free));
        self
    }
}

impl ElementHooks for FnHooks {
    fn deep_copy(&self, dest: &mut [u8], src: &[u8]) -> bool {
        match &self.copy {
            Some(copy) => copy(dest, src),
            None => RawHooks.deep_copy(dest, src),
        }
    }

    fn deep_free(&self, element: &mut [u8]) -> bool {
        match &self.free {
            Some(free) => free(element),
            None => RawHooks.deep_free(element),
        }
    }
}

impl fmt::Debug for FnHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHooks")
            .field("custom_copy", &self.copy.is_some())
            .field("custom_free", &self.free.is_some())
            .finish()
    }
}
