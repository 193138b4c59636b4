//! Allocation checks for the steady-state receive path.
//!
//! A counting global allocator records allocations made by the current
//! thread, so tests running in parallel do not disturb each other's counts.

use std::{
    alloc::{GlobalAlloc, Layout, System},
    cell::Cell,
};

use frameweave::{FragmentAssembler, FrameFlags, FrameHeader, Message, SessionId, StreamId};
use frameweave_testing::TestFrame;

struct CountingAllocator;

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

fn record_allocation() {
    let _ = ALLOCATIONS.try_with(|count| count.set(count.get() + 1));
}

#[global_allocator]
static GLOBAL_ALLOCATOR: CountingAllocator = CountingAllocator;

// SAFETY: This allocator forwards all allocation operations directly to
// `System` while incrementing a thread-local counter. It does not change
// pointer ownership or layout semantics.
unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record_allocation();
        // SAFETY: Delegates to the system allocator with unchanged `layout`.
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: Delegates to the system allocator with unchanged arguments.
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record_allocation();
        // SAFETY: Delegates to the system allocator with unchanged `layout`.
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record_allocation();
        // SAFETY: Delegates to the system allocator with unchanged arguments.
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

fn count_allocations(operation: impl FnOnce()) -> usize {
    let before = ALLOCATIONS.with(Cell::get);
    operation();
    ALLOCATIONS.with(Cell::get).saturating_sub(before)
}

fn deliver_all(
    assembler: &mut FragmentAssembler<impl FnMut(Message<'_>)>,
    frames: &[TestFrame],
) {
    for frame in frames {
        assembler.on_frame(&frame.payload, 0, frame.payload.len(), &frame.header);
    }
}

#[test]
fn unfragmented_delivery_does_not_allocate() {
    let payload = [9_u8; 256];
    let header = FrameHeader::data(
        SessionId::new(1),
        StreamId::new(1),
        FrameFlags::UNFRAGMENTED,
        payload.len(),
    );
    let mut delivered = 0_usize;
    let mut assembler = FragmentAssembler::new(|message: Message<'_>| delivered += message.len());

    let allocations = count_allocations(|| {
        for _ in 0..1000 {
            assembler.on_frame(&payload, 0, payload.len(), &header);
        }
    });
    drop(assembler);

    assert_eq!(allocations, 0);
    assert_eq!(delivered, 256_000);
}

#[test]
fn warmed_reassembly_does_not_allocate() {
    let payload = vec![4_u8; 64 * 1024];
    let first = TestFrame::split(SessionId::new(1), StreamId::new(1), &payload, 1408);
    let second = TestFrame::split(SessionId::new(2), StreamId::new(1), &payload, 1408);
    let mut delivered = 0_usize;
    let mut assembler = FragmentAssembler::new(|message: Message<'_>| delivered += message.len());
    deliver_all(&mut assembler, &first);

    let allocations = count_allocations(|| {
        for _ in 0..10 {
            deliver_all(&mut assembler, &first);
            deliver_all(&mut assembler, &second);
        }
    });
    drop(assembler);

    assert_eq!(allocations, 0);
    assert_eq!(delivered, 21 * payload.len());
}
