use super::*;

#[test]
fn test_sequential_alloc() {
    let mut slots = DescriptorSlots::new(8);
    assert_eq!(slots.alloc(), Some(0));
    assert_eq!(slots.alloc(), Some(1));
    assert_eq!(slots.alloc(), Some(2));
    assert_eq!(slots.len(), 3);
}

#[test]
fn test_new_is_empty() {
    let slots = DescriptorSlots::new(16);
    assert!(slots.is_empty());
    assert_eq!(slots.capacity(), 16);
}

#[test]
fn test_full_heap_returns_none() {
    let mut slots = DescriptorSlots::new(2);
    slots.alloc();
    slots.alloc();
    assert_eq!(slots.alloc(), None);
    // A failed allocation does not count as a live slot
    assert_eq!(slots.len(), 2);
}

#[test]
fn test_zero_capacity() {
    let mut slots = DescriptorSlots::new(0);
    assert_eq!(slots.alloc(), None);
}

#[test]
fn test_freed_slots_recycle_lifo() {
    let mut slots = DescriptorSlots::new(4);
    let a = slots.alloc().unwrap();
    let _b = slots.alloc().unwrap();
    let c = slots.alloc().unwrap();
    slots.free(a);
    slots.free(c);

    assert_eq!(slots.alloc(), Some(2));
    assert_eq!(slots.alloc(), Some(0));
    assert_eq!(slots.alloc(), Some(3));
    assert_eq!(slots.alloc(), None);
}

#[test]
fn test_full_heap_recovers_after_free() {
    let mut slots = DescriptorSlots::new(3);
    let ids: Vec<u32> = (0..3).filter_map(|_| slots.alloc()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
    assert_eq!(slots.alloc(), None);

    slots.free(1);
    assert_eq!(slots.len(), 2);
    assert_eq!(slots.alloc(), Some(1));
}

#[test]
fn test_live_slots_are_unique() {
    let mut slots = DescriptorSlots::new(64);
    let mut seen = std::collections::HashSet::new();

    for _ in 0..50 {
        seen.insert(slots.alloc().unwrap());
    }
    for id in 0..10 {
        slots.free(id);
        seen.remove(&id);
    }
    for _ in 0..14 {
        let id = slots.alloc().unwrap();
        assert!(seen.insert(id), "duplicate descriptor slot: {}", id);
    }
    assert_eq!(seen.len(), 54);
    assert_eq!(slots.len(), 54);
}
