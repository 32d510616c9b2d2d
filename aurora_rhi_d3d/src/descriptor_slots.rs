/// Fixed-capacity slot allocator for D3D12 descriptor heaps
///
/// A heap is created once with a fixed number of descriptors. Slots are
/// handed out in order and freed slots are recycled before fresh ones.
///
/// # Example
///
/// ```
/// use aurora_rhi_d3d::DescriptorSlots;
///
/// let mut slots = DescriptorSlots::new(2);
/// let a = slots.alloc().unwrap(); // 0
/// let _b = slots.alloc().unwrap(); // 1
/// assert_eq!(slots.alloc(), None); // heap full
/// slots.free(a);
/// assert_eq!(slots.alloc(), Some(0));
/// ```
#[derive(Debug)]
pub struct DescriptorSlots {
    free_list: Vec<u32>,
    next_id: u32,
    capacity: u32,
    len: u32,
}

impl DescriptorSlots {
    pub fn new(capacity: u32) -> Self {
        Self {
            free_list: Vec::new(),
            next_id: 0,
            capacity,
            len: 0,
        }
    }

    /// Next free slot, `None` once every slot of the heap is in use
    pub fn alloc(&mut self) -> Option<u32> {
        let id = match self.free_list.pop() {
            Some(id) => id,
            None if self.next_id < self.capacity => {
                let id = self.next_id;
                self.next_id += 1;
                id
            }
            None => return None,
        };
        self.len += 1;
        Some(id)
    }

    /// Return a slot for reuse
    pub fn free(&mut self, id: u32) {
        debug_assert!(id < self.next_id, "freeing an unallocated descriptor slot: {}", id);
        debug_assert!(!self.free_list.contains(&id), "descriptor slot {} freed twice", id);
        self.len -= 1;
        self.free_list.push(id);
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Slots currently in use
    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
#[path = "descriptor_slots_tests.rs"]
mod tests;
