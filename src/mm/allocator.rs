//! Kernel Heap Allocator
//!
//! Uses `linked_list_allocator` for heap management. The descriptor
//! table, user-string copies and the exit-message formatting all allocate
//! from here in freestanding builds.
//!
//! # Security Considerations
//! - Heap is initialized once during boot
//! - All allocations go through Rust's global allocator
//! - linked_list_allocator provides bounds checking

use linked_list_allocator::LockedHeap;

/// Global heap allocator instance.
///
/// Hosted tests use std's allocator instead; registering this empty heap
/// there would fail the first test allocation.
#[cfg(not(test))]
#[global_allocator]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

#[cfg(test)]
static ALLOCATOR: LockedHeap = LockedHeap::empty();

/// Maximum heap size (128 KiB, enough for descriptor tables and name
/// copies of every live process in a teaching workload)
const HEAP_SIZE: usize = 128 * 1024;

/// Static heap memory region
/// This avoids relying on linker symbols which can be tricky
static mut HEAP_MEMORY: [u8; HEAP_SIZE] = [0; HEAP_SIZE];

/// Initialize the kernel heap
///
/// # Safety contract (checked by convention, not the type system)
/// Called exactly once during kernel initialization, before any heap
/// allocation and before the first trap is enabled.
pub fn init_heap() {
    // SAFETY:
    // - HEAP_MEMORY is a valid static array
    // - This function is only called once during boot
    // - No other code accesses HEAP_MEMORY directly
    unsafe {
        let heap_start = core::ptr::addr_of_mut!(HEAP_MEMORY) as *mut u8;
        ALLOCATOR.lock().init(heap_start, HEAP_SIZE);
    }
}

/// Get the size of the kernel heap
pub fn heap_size() -> usize {
    HEAP_SIZE
}
