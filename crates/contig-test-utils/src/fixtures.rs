//! Drop-tracked values and instrumented element hooks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use contig_erased::ElementHooks;

/// Shared counters for [`Tracked`] values.
///
/// `live()` going to zero after a container is dropped means every value
/// was released exactly once.
#[derive(Default)]
pub struct DropLedger {
    live: Cell<isize>,
    clones: Cell<usize>,
    drops: Cell<usize>,
    panic_after_clones: Cell<Option<usize>>,
}

impl DropLedger {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Create a value registered with this ledger.
    pub fn track(self: &Rc<Self>, value: u32) -> Tracked {
        self.live.set(self.live.get() + 1);
        Tracked {
            value,
            ledger: Rc::clone(self),
        }
    }

    /// Make the clone after `n` further successful clones panic.
    pub fn panic_on_clone_after(&self, n: usize) {
        self.panic_after_clones.set(Some(self.clones.get() + n));
    }

    /// Values created or cloned and not yet dropped.
    pub fn live(&self) -> isize {
        self.live.get()
    }

    pub fn clones(&self) -> usize {
        self.clones.get()
    }

    pub fn drops(&self) -> usize {
        self.drops.get()
    }
}

/// A value that reports clones and drops to its [`DropLedger`].
pub struct Tracked {
    pub value: u32,
    ledger: Rc<DropLedger>,
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        if self.ledger.panic_after_clones.get() == Some(self.ledger.clones.get()) {
            panic!("Tracked clone budget exhausted");
        }
        self.ledger.clones.set(self.ledger.clones.get() + 1);
        self.ledger.track(self.value)
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.ledger.drops.set(self.ledger.drops.get() + 1);
        self.ledger.live.set(self.ledger.live.get() - 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}

/// Byte-copy hooks that count invocations and can be told to fail.
#[derive(Default)]
pub struct CountingHooks {
    copies: Cell<usize>,
    frees: Cell<usize>,
    fail_copy_at: Option<usize>,
    fail_free_at: Option<usize>,
}

impl CountingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the copy hook on its `call`-th invocation (0-based).
    pub fn failing_copy_at(mut self, call: usize) -> Self {
        self.fail_copy_at = Some(call);
        self
    }

    /// Fail the free hook on its `call`-th invocation (0-based).
    pub fn failing_free_at(mut self, call: usize) -> Self {
        self.fail_free_at = Some(call);
        self
    }

    pub fn copies(&self) -> usize {
        self.copies.get()
    }

    pub fn frees(&self) -> usize {
        self.frees.get()
    }
}

impl ElementHooks for CountingHooks {
    fn deep_copy(&self, dest: &mut [u8], src: &[u8]) -> bool {
        let call = self.copies.get();
        self.copies.set(call + 1);
        if self.fail_copy_at == Some(call) {
            return false;
        }
        dest.copy_from_slice(src);
        true
    }

    fn deep_free(&self, _element: &mut [u8]) -> bool {
        let call = self.frees.get();
        self.frees.set(call + 1);
        self.fail_free_at != Some(call)
    }
}

/// Size of a [`SlotHeap`] handle record in bytes.
pub const HANDLE_SIZE: usize = 8;

/// A toy heap of strings addressed by non-zero `u64` handles.
///
/// Stands in for any external resource a type-erased record might own.
/// Freeing a handle that is not live fails, which makes double frees and
/// aliasing copies observable.
#[derive(Default)]
pub struct SlotHeap {
    slots: RefCell<Vec<Option<String>>>,
}

impl SlotHeap {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Store `value` and return its handle.
    pub fn alloc(&self, value: &str) -> u64 {
        let mut slots = self.slots.borrow_mut();
        slots.push(Some(value.to_owned()));
        slots.len() as u64
    }

    /// The string behind `handle`, if it is live.
    pub fn get(&self, handle: u64) -> Option<String> {
        let index = usize::try_from(handle.checked_sub(1)?).ok()?;
        self.slots.borrow().get(index)?.clone()
    }

    /// Release `handle`. Returns `false` if it was not live.
    pub fn free(&self, handle: u64) -> bool {
        let Some(index) = handle
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
        else {
            return false;
        };
        match self.slots.borrow_mut().get_mut(index) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    /// Number of live strings.
    pub fn live(&self) -> usize {
        self.slots.borrow().iter().filter(|s| s.is_some()).count()
    }

    /// Encode a handle as a [`HANDLE_SIZE`]-byte record.
    pub fn encode(handle: u64) -> [u8; HANDLE_SIZE] {
        handle.to_le_bytes()
    }

    /// Decode a handle record; `None` if the record has the wrong size.
    pub fn decode(record: &[u8]) -> Option<u64> {
        let bytes: [u8; HANDLE_SIZE] = record.try_into().ok()?;
        Some(u64::from_le_bytes(bytes))
    }
}

/// Hooks for records that hold [`SlotHeap`] handles.
///
/// Deep copy duplicates the string into a fresh slot; deep free releases
/// the slot and zeroes the record.
pub struct HeapHooks {
    heap: Rc<SlotHeap>,
}

impl HeapHooks {
    pub fn new(heap: Rc<SlotHeap>) -> Self {
        Self { heap }
    }
}

impl ElementHooks for HeapHooks {
    fn deep_copy(&self, dest: &mut [u8], src: &[u8]) -> bool {
        let Some(value) = SlotHeap::decode(src).and_then(|h| self.heap.get(h)) else {
            return false;
        };
        let handle = self.heap.alloc(&value);
        dest.copy_from_slice(&SlotHeap::encode(handle));
        true
    }

    fn deep_free(&self, element: &mut [u8]) -> bool {
        let Some(handle) = SlotHeap::decode(element) else {
            return false;
        };
        if !self.heap.free(handle) {
            return false;
        }
        element.fill(0);
        true
    }
}
