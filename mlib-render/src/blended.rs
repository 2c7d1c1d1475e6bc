//! Blended pass ordering (spec 4.F): renderables in the blended list are
//! sorted by descending post-MVP z and drawn last with depth write
//! disabled (depth test still enabled - a render-thread GL state concern,
//! not modeled here).

use mlib_scene::Handle;
use mlib_scene::SceneNode;

#[derive(Debug, Clone, Copy)]
pub struct BlendedItem {
    pub node: Handle<SceneNode>,
    pub view_z: f32,
}

/// Sorts `items` by descending `view_z` (farthest first), the order-
/// independent draw sequence the blended pass commits in.
pub fn sort_blended(items: &mut [BlendedItem]) {
    items.sort_by(|a, b| b.view_z.partial_cmp(&a.view_z).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlib_scene::{NodeKind, Scene};

    #[test]
    fn farthest_item_drawn_first() {
        let mut scene = Scene::new();
        let a = scene.add_root_node(SceneNode::new("a", NodeKind::Mesh { blended: true })).unwrap();
        let b = scene.add_root_node(SceneNode::new("b", NodeKind::Mesh { blended: true })).unwrap();
        let mut items = vec![
            BlendedItem { node: a, view_z: 1.0 },
            BlendedItem { node: b, view_z: 5.0 },
        ];
        sort_blended(&mut items);
        assert_eq!(items[0].node, b);
        assert_eq!(items[1].node, a);
    }
}
