//! Dense observer registries (spec 9: "cyclic references... broken by
//! representing observers as indices into a dense observer registry owned
//! by the scene"). Two instances live on [`crate::scene::Scene`]: one for
//! destruction notifications, one for per-tick advance-time callbacks.

use crate::handle::Handle;
use crate::node::SceneNode;

/// Invoked once, with the handle of the node being destroyed, then dropped.
/// Typical use: schedule a dependent object (a tire, a follower camera) for
/// its own deletion after the current frame (spec 4.E "Destruction
/// observers").
pub trait DestructionObserver: Send {
    fn notify_destroyed(&mut self, destroyed: Handle<SceneNode>);
}

/// Invoked every tick with the elapsed time; used by objects that need to
/// step independently of the physics/render passes (spec 9 "AdvanceTime
/// token").
pub trait AdvanceTime: Send {
    fn advance_time(&mut self, dt: f32);
}

enum Entry<T: ?Sized> {
    Occupied(Box<T>),
    Free,
}

/// A dense `Vec<Option<Box<dyn Trait>>>`-like registry with a free list, so
/// an observer's index stays stable for the lifetime of its registration
/// and can be referenced from a node without a strong/cyclic pointer.
pub struct ObserverRegistry<T: ?Sized> {
    entries: Vec<Entry<T>>,
    free: Vec<usize>,
}

impl<T: ?Sized> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T: ?Sized> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<T>) -> usize {
        if let Some(index) = self.free.pop() {
            self.entries[index] = Entry::Occupied(observer);
            index
        } else {
            self.entries.push(Entry::Occupied(observer));
            self.entries.len() - 1
        }
    }

    pub fn unregister(&mut self, index: usize) {
        if let Some(entry @ Entry::Occupied(_)) = self.entries.get_mut(index) {
            *entry = Entry::Free;
            self.free.push(index);
        }
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        match self.entries.get_mut(index) {
            Some(Entry::Occupied(observer)) => Some(observer.as_mut()),
            _ => None,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut().filter_map(|e| match e {
            Entry::Occupied(observer) => Some(observer.as_mut()),
            Entry::Free => None,
        })
    }
}

pub type DestructionObserverRegistry = ObserverRegistry<dyn DestructionObserver>;
pub type AdvanceTimeRegistry = ObserverRegistry<dyn AdvanceTime>;
