//! Draw-distance trimming window (spec 4.F): a static substitution info
//! keeps two parallel id arrays (local<->global) backing a packed triangle
//! buffer; each tick a sliding window of triangles is tested and
//! swapped/re-inserted against `draw_distance_add + slop`.

/// One static substitution's packed triangle buffer bookkeeping. `local_id`
/// maps a packed slot to its position in `global_id`/`distances`;
/// `global_id` is the reverse map, letting a triangle be found by its
/// original (global) index and swap-removed in O(1).
pub struct DrawDistanceWindow {
    local_id: Vec<u32>,
    global_id: Vec<u32>,
    distances: Vec<f32>,
    live_count: usize,
    capacity: usize,
}

impl DrawDistanceWindow {
    /// `distances` is the per-triangle distance to the camera, indexed by
    /// global id; all triangles start live.
    pub fn new(distances: Vec<f32>) -> Self {
        let capacity = distances.len();
        let local_id: Vec<u32> = (0..capacity as u32).collect();
        let global_id = local_id.clone();
        Self {
            local_id,
            global_id,
            distances,
            live_count: capacity,
            capacity,
        }
    }

    pub fn live_triangles(&self) -> &[u32] {
        &self.global_id[..self.live_count]
    }

    pub fn update_distance(&mut self, global_index: usize, distance: f32) {
        self.distances[global_index] = distance;
    }

    /// Swap-removes `global_index` from the live window.
    fn remove_live(&mut self, global_index: usize) {
        let local = self.local_id[global_index] as usize;
        debug_assert!(local < self.live_count);
        let last_local = self.live_count - 1;
        let last_global = self.global_id[last_local];
        self.global_id.swap(local, last_local);
        self.local_id[last_global as usize] = local as u32;
        self.local_id[global_index] = last_local as u32;
        self.live_count -= 1;
    }

    /// Re-inserts `global_index` (previously trimmed) at the end of the
    /// live window.
    fn insert_live(&mut self, global_index: usize) {
        debug_assert!(self.live_count < self.capacity);
        let local = self.live_count;
        self.global_id[local] = global_index as u32;
        self.local_id[global_index] = local as u32;
        self.live_count += 1;
    }

    fn is_live(&self, global_index: usize) -> bool {
        (self.local_id[global_index] as usize) < self.live_count
    }

    /// Tests every triangle in `window` (a slice of global ids, the
    /// "sliding window" the render thread processes this tick) and
    /// trims/restores against `draw_distance_add + slop`.
    pub fn tick(&mut self, window: &[u32], draw_distance_add: f32, slop: f32) {
        let threshold = draw_distance_add + slop;
        for &global in window {
            let global = global as usize;
            let outside = self.distances[global] > threshold;
            match (outside, self.is_live(global)) {
                (true, true) => self.remove_live(global),
                (false, false) => self.insert_live(global),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_triangle_is_trimmed() {
        let mut w = DrawDistanceWindow::new(vec![1.0, 2.0, 100.0]);
        assert_eq!(w.live_triangles().len(), 3);
        w.tick(&[0, 1, 2], 10.0, 0.0);
        assert_eq!(w.live_triangles().len(), 2);
        assert!(!w.live_triangles().contains(&2));
    }

    #[test]
    fn triangle_moving_back_into_range_is_reinserted() {
        let mut w = DrawDistanceWindow::new(vec![100.0]);
        w.tick(&[0], 10.0, 0.0);
        assert_eq!(w.live_triangles().len(), 0);
        w.update_distance(0, 1.0);
        w.tick(&[0], 10.0, 0.0);
        assert_eq!(w.live_triangles().len(), 1);
    }

    #[test]
    fn repeated_ticks_are_idempotent() {
        let mut w = DrawDistanceWindow::new(vec![1.0, 100.0]);
        w.tick(&[0, 1], 10.0, 0.0);
        w.tick(&[0, 1], 10.0, 0.0);
        assert_eq!(w.live_triangles(), &[0]);
    }
}
