//! Debug-only reentrancy check for the chain structure.
//!
//! While a map method is relinking chains, user code can still run through
//! the `BuildHasher`. If that code reaches back into the same map, it would
//! observe half-spliced chains. Debug builds detect this and panic; release
//! builds carry no state at all.

#[cfg(debug_assertions)]
use core::cell::Cell;
use core::marker::PhantomData;

/// Embedded in every map. Methods that walk or relink chains open a section
/// with `let _s = self.reentrancy.section();`.
#[derive(Debug)]
pub(crate) struct ReentrancyCheck {
    #[cfg(debug_assertions)]
    busy: Cell<bool>,
    // Single-threaded container: keep the owner !Send + !Sync.
    _single_thread: PhantomData<*mut ()>,
}

impl ReentrancyCheck {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            busy: Cell::new(false),
            _single_thread: PhantomData,
        }
    }

    /// Open a section. Debug builds panic if one is already open.
    #[inline]
    pub(crate) fn section(&self) -> Section<'_> {
        #[cfg(debug_assertions)]
        {
            assert!(
                !self.busy.replace(true),
                "chained map re-entered while its chains were being walked"
            );
            return Section { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            return Section { _lt: PhantomData };
        }
    }
}

impl Default for ReentrancyCheck {
    fn default() -> Self {
        Self::new()
    }
}

/// Closes the section on drop.
pub(crate) struct Section<'a> {
    #[cfg(debug_assertions)]
    owner: &'a ReentrancyCheck,
    #[cfg(not(debug_assertions))]
    _lt: PhantomData<&'a ()>,
}

impl Drop for Section<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            let was_busy = self.owner.busy.replace(false);
            debug_assert!(was_busy);
        }
    }
}
