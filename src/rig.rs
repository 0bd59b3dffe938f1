//! Bone Tree
//!
//! Engine-owned mirror of an entity's bone hierarchy.
//!
//! # Design Principles
//!
//! - Bones live in a [`SlotMap`] arena and refer to each other by [`BoneKey`]
//! - A `Uuid -> BoneKey` index resolves the stable ids used by skins and
//!   animations without inspecting host nodes
//! - Static authoring data ([`Bone`]) is kept apart from the mutable live
//!   state ([`Pose`] and [`Appearance`]) that playback and skins write

use glam::Vec2;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use uuid::Uuid;

use crate::animation::keyframe::Keyframe;
use crate::animation::values::Color;
use crate::errors::{InkError, Result};

new_key_type! {
    pub struct BoneKey;
}

/// Sprite blend mode, numbered as in entity documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    Alpha,
    Add,
    Subtract,
    Multiply,
    MultiplyX2,
    Screen,
    Replace,
    MultiplyAlpha,
}

impl TryFrom<i32> for BlendMode {
    type Error = InkError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => BlendMode::Alpha,
            1 => BlendMode::Add,
            2 => BlendMode::Subtract,
            3 => BlendMode::Multiply,
            4 => BlendMode::MultiplyX2,
            5 => BlendMode::Screen,
            6 => BlendMode::Replace,
            7 => BlendMode::MultiplyAlpha,
            other => {
                return Err(InkError::malformed(format!("unknown blendMode {other}")));
            }
        })
    }
}

/// Animatable state of a bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec2,
    pub rotation: f32,
    pub size: Vec2,
    pub scale: Vec2,
    pub color: Color,
    pub color_blend_factor: f32,
    pub alpha: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
            color: Color::TRANSPARENT,
            color_blend_factor: 0.0,
            alpha: 1.0,
        }
    }
}

impl Pose {
    /// Snaps every channel to the keyframe's values.
    pub fn apply_keyframe(&mut self, keyframe: &Keyframe) {
        self.position = keyframe.position;
        self.rotation = keyframe.rotation;
        self.size = keyframe.size;
        self.scale = keyframe.scale;
        self.color = keyframe.color;
        self.color_blend_factor = keyframe.color_blend_factor;
        self.alpha = keyframe.alpha;
    }
}

/// Skin-driven state of a bone; independent of its pose.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Appearance {
    pub visible: bool,
    /// Host texture lookup key.
    pub texture: Option<String>,
    pub tint: Option<Color>,
}

/// Immutable authoring data of a bone.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub uuid: Uuid,
    pub name: String,
    pub document_name: String,
    pub blend_mode: BlendMode,
    pub z_position: f32,
    pub anchor_point: Vec2,
    /// The statically authored pose, restored when playback stops.
    pub rest_pose: Pose,
}

#[derive(Debug, Clone)]
pub struct BoneNode {
    pub bone: Bone,
    pub(crate) parent: Option<BoneKey>,
    pub(crate) children: Vec<BoneKey>,
    pub pose: Pose,
    pub appearance: Appearance,
}

impl BoneNode {
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.bone.uuid
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<BoneKey> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[BoneKey] {
        &self.children
    }
}

#[derive(Debug, Clone, Default)]
pub struct BoneTree {
    nodes: SlotMap<BoneKey, BoneNode>,
    by_uuid: FxHashMap<Uuid, BoneKey>,
    roots: Vec<BoneKey>,
}

impl BoneTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bone under `parent` (or as a root). Bone ids must be unique.
    pub fn insert(&mut self, bone: Bone, parent: Option<BoneKey>) -> Result<BoneKey> {
        if self.by_uuid.contains_key(&bone.uuid) {
            return Err(InkError::malformed(format!(
                "duplicate bone uuid {}",
                bone.uuid
            )));
        }
        if let Some(parent) = parent
            && !self.nodes.contains_key(parent)
        {
            return Err(InkError::malformed(format!(
                "parent of bone \"{}\" is not part of the tree",
                bone.name
            )));
        }

        let uuid = bone.uuid;
        let pose = bone.rest_pose;
        let key = self.nodes.insert(BoneNode {
            bone,
            parent,
            children: Vec::new(),
            pose,
            appearance: Appearance {
                visible: true,
                ..Appearance::default()
            },
        });

        match parent.and_then(|p| self.nodes.get_mut(p)) {
            Some(parent_node) => parent_node.children.push(key),
            None => self.roots.push(key),
        }
        self.by_uuid.insert(uuid, key);
        Ok(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn roots(&self) -> &[BoneKey] {
        &self.roots
    }

    #[must_use]
    pub fn contains(&self, uuid: &Uuid) -> bool {
        self.by_uuid.contains_key(uuid)
    }

    #[must_use]
    pub fn key_of(&self, uuid: &Uuid) -> Option<BoneKey> {
        self.by_uuid.get(uuid).copied()
    }

    #[must_use]
    pub fn node(&self, key: BoneKey) -> Option<&BoneNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: BoneKey) -> Option<&mut BoneNode> {
        self.nodes.get_mut(key)
    }

    #[must_use]
    pub fn get(&self, uuid: &Uuid) -> Option<&BoneNode> {
        self.key_of(uuid).and_then(|key| self.nodes.get(key))
    }

    pub fn get_mut(&mut self, uuid: &Uuid) -> Option<&mut BoneNode> {
        let key = self.key_of(uuid)?;
        self.nodes.get_mut(key)
    }

    /// Live pose of a bone.
    #[must_use]
    pub fn pose(&self, uuid: &Uuid) -> Option<&Pose> {
        self.get(uuid).map(|node| &node.pose)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BoneKey, &BoneNode)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BoneKey, &mut BoneNode)> {
        self.nodes.iter_mut()
    }

    /// Pre-order traversal from the roots, in authoring order.
    #[must_use]
    pub fn walk_depth_first(&self) -> Vec<BoneKey> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<BoneKey> = self.roots.iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            if let Some(node) = self.nodes.get(key) {
                order.push(key);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Restores every bone to its statically authored pose.
    pub fn reset_poses(&mut self) {
        for node in self.nodes.values_mut() {
            node.pose = node.bone.rest_pose;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bone(name: &str) -> Bone {
        Bone {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            document_name: format!("{name}.png"),
            blend_mode: BlendMode::Alpha,
            z_position: 0.0,
            anchor_point: Vec2::splat(0.5),
            rest_pose: Pose::default(),
        }
    }

    #[test]
    fn insert_links_parent_and_child() {
        let mut tree = BoneTree::new();
        let root = tree.insert(bone("body"), None).unwrap();
        let child = tree.insert(bone("arm"), Some(root)).unwrap();

        assert_eq!(tree.roots(), &[root]);
        assert_eq!(tree.node(root).unwrap().children(), &[child]);
        assert_eq!(tree.node(child).unwrap().parent(), Some(root));
    }

    #[test]
    fn duplicate_uuid_is_rejected() {
        let mut tree = BoneTree::new();
        let b = bone("body");
        tree.insert(b.clone(), None).unwrap();
        assert!(matches!(
            tree.insert(b, None),
            Err(InkError::MalformedDocument(_))
        ));
    }

    #[test]
    fn depth_first_order_follows_authoring() {
        let mut tree = BoneTree::new();
        let body = tree.insert(bone("body"), None).unwrap();
        let arm = tree.insert(bone("arm"), Some(body)).unwrap();
        let hand = tree.insert(bone("hand"), Some(arm)).unwrap();
        let leg = tree.insert(bone("leg"), Some(body)).unwrap();
        let hat = tree.insert(bone("hat"), None).unwrap();

        assert_eq!(tree.walk_depth_first(), vec![body, arm, hand, leg, hat]);
    }

    #[test]
    fn reset_poses_restores_rest_pose() {
        let mut tree = BoneTree::new();
        let b = bone("body");
        let uuid = b.uuid;
        tree.insert(b, None).unwrap();

        tree.get_mut(&uuid).unwrap().pose.position = Vec2::new(3.0, 4.0);
        tree.reset_poses();
        assert_eq!(tree.pose(&uuid).unwrap().position, Vec2::ZERO);
    }
}
