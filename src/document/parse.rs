//! Element → runtime type conversion.
//!
//! Every function here fails fast: a missing or invalid required attribute
//! is a [`InkError::MalformedDocument`] naming the attribute and element, and
//! an unexpected tag is a [`InkError::StructuralMismatch`].

use glam::Vec2;
use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::animation::clip::Animation;
use crate::animation::keyframe::{Keyframe, TimingMode};
use crate::animation::tracks::KeyframeTrack;
use crate::animation::values::Color;
use crate::document::{Element, names, parse_bool};
use crate::errors::{InkError, ResourceKind, Result};
use crate::rig::{BlendMode, Bone, BoneKey, BoneTree, Pose};
use crate::skin::Skin;

// ============================================================================
// Value elements
// ============================================================================

/// `<point x=".." y=".."/>`
pub fn read_point(element: &Element) -> Result<Vec2> {
    Ok(Vec2::new(element.parse_attr("x")?, element.parse_attr("y")?))
}

/// `<size width=".." height=".."/>`
pub fn read_size(element: &Element) -> Result<Vec2> {
    Ok(Vec2::new(
        element.parse_attr("width")?,
        element.parse_attr("height")?,
    ))
}

/// `<float value=".."/>`
pub fn read_scalar(element: &Element) -> Result<f32> {
    element.parse_attr("value")
}

/// `<color red=".." green=".." blue=".." alpha=".."/>`, components default to 0.
pub fn read_color(element: &Element) -> Result<Color> {
    Ok(Color::new(
        element.parse_attr_or("red", 0.0)?,
        element.parse_attr_or("green", 0.0)?,
        element.parse_attr_or("blue", 0.0)?,
        element.parse_attr_or("alpha", 0.0)?,
    ))
}

pub fn read_uuid(element: &Element) -> Result<Uuid> {
    let raw = element.required_attr(names::UUID_ATTR)?;
    Uuid::parse_str(raw).map_err(|_| {
        InkError::malformed(format!(
            "invalid \"uuid\" attribute \"{raw}\" in <{}> element",
            element.name
        ))
    })
}

fn optional_child<T>(
    element: &Element,
    name: &str,
    read: impl FnOnce(&Element) -> Result<T>,
    default: T,
) -> Result<T> {
    element.child(name).map_or(Ok(default), read)
}

// ============================================================================
// Keyframes & animations
// ============================================================================

/// `<keyframe frame=".." timingMode="..">` with its channel children.
pub fn parse_keyframe(element: &Element) -> Result<(i32, Keyframe)> {
    element.expect_name(names::KEYFRAME)?;

    let frame = element.parse_attr(names::FRAME_ATTR)?;
    let timing_mode: TimingMode = element.parse_attr(names::TIMING_MODE_ATTR)?;

    let defaults = Keyframe::default();
    let keyframe = Keyframe {
        position: read_point(element.required_child(names::POSITION)?)?,
        rotation: read_scalar(element.required_child(names::ROTATION)?)?,
        size: read_size(element.required_child(names::SIZE)?)?,
        scale: read_point(element.required_child(names::SCALE)?)?,
        timing_mode,
        color_blend_factor: element
            .parse_attr_or(names::COLOR_BLEND_FACTOR_ATTR, defaults.color_blend_factor)?,
        alpha: element.parse_attr_or(names::ALPHA_ATTR, defaults.alpha)?,
        color: optional_child(element, names::COLOR, read_color, defaults.color)?,
    };

    Ok((frame, keyframe))
}

/// `<keyframeWrapper uuid="..">` → the bone id and its track.
pub fn parse_track(element: &Element) -> Result<(Uuid, KeyframeTrack)> {
    element.expect_name(names::KEYFRAME_WRAPPER)?;
    let bone = read_uuid(element)?;

    let mut track = KeyframeTrack::new();
    for child in &element.children {
        let (frame, keyframe) = parse_keyframe(child)?;
        track.insert(frame, keyframe)?;
    }
    Ok((bone, track))
}

/// `<animation name=".." startFrame=".." endFrame=".." frameDuration="..">`
pub fn parse_animation(element: &Element) -> Result<Animation> {
    element.expect_name(names::ANIMATION)?;

    let name = element.required_attr(names::NAME_ATTR)?;
    let start_frame = element.parse_attr(names::START_FRAME_ATTR)?;
    let end_frame = element.parse_attr(names::END_FRAME_ATTR)?;
    let frame_duration = element.parse_attr(names::FRAME_DURATION_ATTR)?;

    let mut tracks = FxHashMap::default();
    for child in &element.children {
        let (bone, track) = parse_track(child)?;
        if tracks.insert(bone, track).is_some() {
            return Err(InkError::malformed(format!(
                "animation \"{name}\" has two keyframeWrapper elements for bone {bone}"
            )));
        }
    }

    Animation::new(name, start_frame, end_frame, frame_duration, tracks)
}

/// Finds `<animations><animation name="{name}">` under the document root.
pub fn find_animation<'a>(root: &'a Element, name: &str) -> Result<&'a Element> {
    root.child(names::ANIMATIONS)
        .into_iter()
        .flat_map(|animations| animations.children_named(names::ANIMATION))
        .find(|element| element.attr(names::NAME_ATTR) == Some(name))
        .ok_or_else(|| InkError::not_found(ResourceKind::Animation, name))
}

/// Names of every animation in the document, in authoring order.
#[must_use]
pub fn animation_names(root: &Element) -> Vec<String> {
    root.child(names::ANIMATIONS)
        .into_iter()
        .flat_map(|animations| animations.children_named(names::ANIMATION))
        .filter_map(|element| element.attr(names::NAME_ATTR).map(str::to_owned))
        .collect()
}

// ============================================================================
// Skins
// ============================================================================

/// `<entityInfo><texture uuid=".." name=".."/>…</entityInfo>` → bone id to
/// texture base name. An absent `entityInfo` yields an empty map.
pub fn parse_entity_info(root: &Element) -> Result<FxHashMap<Uuid, String>> {
    let mut info = FxHashMap::default();
    let Some(entity_info) = root.child(names::ENTITY_INFO) else {
        return Ok(info);
    };
    for element in &entity_info.children {
        element.expect_name(names::TEXTURE)?;
        let bone = read_uuid(element)?;
        let base = element.required_attr(names::NAME_ATTR)?;
        info.insert(bone, base.to_string());
    }
    Ok(info)
}

/// `<skin name="..">` with `<bone uuid=".." isVisible="..">` children, each
/// optionally tinted by a `<color>` child.
pub fn parse_skin(element: &Element, entity_info: &FxHashMap<Uuid, String>) -> Result<Skin> {
    element.expect_name(names::SKIN)?;
    let name = element.required_attr(names::NAME_ATTR)?;

    let mut visibility = FxHashMap::default();
    let mut tints = FxHashMap::default();
    for bone in &element.children {
        bone.expect_name(names::BONE)?;
        let uuid = read_uuid(bone)?;
        let raw = bone.required_attr(names::VISIBLE_ATTR)?;
        let visible = parse_bool(raw).ok_or_else(|| {
            InkError::malformed(format!(
                "invalid \"isVisible\" attribute \"{raw}\" in <bone> element of skin \"{name}\""
            ))
        })?;
        visibility.insert(uuid, visible);
        if let Some(color) = bone.child(names::COLOR) {
            tints.insert(uuid, read_color(color)?);
        }
    }

    Ok(Skin::new(name, visibility, tints, entity_info))
}

/// Finds `<skins><skin name="{name}">` under the document root.
pub fn find_skin<'a>(root: &'a Element, name: &str) -> Result<&'a Element> {
    root.child(names::SKINS)
        .into_iter()
        .flat_map(|skins| skins.children_named(names::SKIN))
        .find(|element| element.attr(names::NAME_ATTR) == Some(name))
        .ok_or_else(|| InkError::not_found(ResourceKind::Skin, name))
}

/// The first authored skin, used when no skin is requested explicitly.
pub fn default_skin_name(root: &Element) -> Result<String> {
    let skin = root
        .required_child(names::SKINS)?
        .required_child(names::SKIN)?;
    Ok(skin.required_attr(names::NAME_ATTR)?.to_string())
}

// ============================================================================
// Bones
// ============================================================================

/// `<bone uuid=".." name=".." documentName="..">`, without its children.
///
/// `uuid` and `documentName` are required; every other property falls back
/// to its neutral value.
pub fn parse_bone(element: &Element) -> Result<Bone> {
    element.expect_name(names::BONE)?;

    let uuid = read_uuid(element)?;
    let document_name = element.required_attr(names::DOCUMENT_NAME_ATTR)?.to_string();
    let name = element.attr(names::NAME_ATTR).unwrap_or_default().to_string();
    let blend_mode = match element.attr(names::BLEND_MODE_ATTR) {
        Some(_) => BlendMode::try_from(element.parse_attr::<i32>(names::BLEND_MODE_ATTR)?)?,
        None => BlendMode::default(),
    };

    let rest_pose = Pose {
        position: optional_child(element, names::POSITION, read_point, Vec2::ZERO)?,
        rotation: optional_child(element, names::ROTATION, read_scalar, 0.0)?,
        size: optional_child(element, names::SIZE, read_size, Vec2::ZERO)?,
        scale: Vec2::ONE,
        color: optional_child(element, names::COLOR, read_color, Color::TRANSPARENT)?,
        color_blend_factor: element.parse_attr_or(names::COLOR_BLEND_FACTOR_ATTR, 0.0)?,
        alpha: element.parse_attr_or(names::ALPHA_ATTR, 1.0)?,
    };

    Ok(Bone {
        uuid,
        name,
        document_name,
        blend_mode,
        z_position: optional_child(element, names::Z_POSITION, read_scalar, 0.0)?,
        anchor_point: optional_child(element, names::ANCHOR_POINT, read_point, Vec2::ZERO)?,
        rest_pose,
    })
}

fn insert_bone_subtree(
    tree: &mut BoneTree,
    element: &Element,
    parent: Option<BoneKey>,
) -> Result<()> {
    let key = tree.insert(parse_bone(element)?, parent)?;
    if let Some(children) = element.child(names::CHILDREN) {
        for child in &children.children {
            insert_bone_subtree(tree, child, Some(key))?;
        }
    }
    Ok(())
}

/// `<entity><bone><size/><children>…</children></bone></entity>`.
///
/// The outer bone only frames the entity: its `size` is the entity size and
/// its children become the roots of the bone tree.
pub fn parse_bone_tree(root: &Element) -> Result<(Vec2, BoneTree)> {
    let entity = root.required_child(names::ENTITY)?;
    let main_bone = entity.required_child(names::BONE)?;
    let size = read_size(main_bone.required_child(names::SIZE)?)?;

    let mut tree = BoneTree::new();
    if let Some(children) = main_bone.child(names::CHILDREN) {
        for child in &children.children {
            insert_bone_subtree(&mut tree, child, None)?;
        }
    }
    Ok((size, tree))
}
