//! A dense, generation-checked slot pool: the storage backing
//! [`crate::scene::Scene`]'s nodes. Same shape as any generational-index
//! arena (record slot + generation, recycle freed slots via a free list)
//! but kept local to this crate since the scene graph is its only user.

use crate::handle::Handle;

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Free { generation: u32 },
}

pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, value: T) -> Handle<T> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = match slot {
                Slot::Free { generation } => *generation + 1,
                Slot::Occupied { .. } => unreachable!("free list pointed at an occupied slot"),
            };
            *slot = Slot::Occupied { generation, value };
            Handle::new(index, generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied {
                generation: 0,
                value,
            });
            Handle::new(index, 0)
        }
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        match self.slots.get(handle.index()) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index()) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation() => {
                Some(value)
            }
            _ => None,
        }
    }

    pub fn is_valid(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Removes the node at `handle`, returning its value if the handle was
    /// still valid (stale handles - already-freed generation - are a no-op).
    pub fn free(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == handle.generation() => {
                let generation = *generation;
                let taken = std::mem::replace(slot, Slot::Free { generation });
                self.free.push(handle.index() as u32);
                match taken {
                    Slot::Occupied { value, .. } => Some(value),
                    Slot::Free { .. } => None,
                }
            }
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|s| match s {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Free { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_handle_fails_after_free_and_reuse() {
        let mut pool: Pool<i32> = Pool::new();
        let h1 = pool.spawn(1);
        pool.free(h1);
        let h2 = pool.spawn(2);
        assert!(pool.get(h1).is_none());
        assert_eq!(pool.get(h2), Some(&2));
    }

    #[test]
    fn occupied_slots_round_trip() {
        let mut pool: Pool<&str> = Pool::new();
        let h = pool.spawn("a");
        assert_eq!(pool.get(h), Some(&"a"));
        *pool.get_mut(h).unwrap() = "b";
        assert_eq!(pool.get(h), Some(&"b"));
    }
}
