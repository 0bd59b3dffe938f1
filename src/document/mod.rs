//! Entity Documents
//!
//! Entity documents are tree-shaped markup (XML). The text is read once into a
//! generic [`Element`] tree; everything downstream works on that tree, so the
//! markup reader itself stays an interchangeable detail.
//!
//! - [`Element`]: name, attributes and child elements
//! - [`parse`]: turns elements into keyframes, tracks, animations, skins and
//!   bone trees, failing fast with the offending element/attribute named

use std::str::FromStr;

use rustc_hash::FxHashMap;

use crate::errors::{InkError, Result};

pub mod parse;

/// Element and attribute names used by entity documents.
pub mod names {
    pub const ENTITY: &str = "entity";
    pub const BONE: &str = "bone";
    pub const CHILDREN: &str = "children";
    pub const POSITION: &str = "position";
    pub const Z_POSITION: &str = "zPosition";
    pub const ANCHOR_POINT: &str = "anchorPoint";
    pub const SIZE: &str = "size";
    pub const ROTATION: &str = "rotation";
    pub const SCALE: &str = "scale";
    pub const COLOR: &str = "color";

    pub const SKINS: &str = "skins";
    pub const SKIN: &str = "skin";
    pub const ENTITY_INFO: &str = "entityInfo";
    pub const TEXTURE: &str = "texture";

    pub const ANIMATIONS: &str = "animations";
    pub const ANIMATION: &str = "animation";
    pub const KEYFRAME_WRAPPER: &str = "keyframeWrapper";
    pub const KEYFRAME: &str = "keyframe";

    pub const UUID_ATTR: &str = "uuid";
    pub const NAME_ATTR: &str = "name";
    pub const DOCUMENT_NAME_ATTR: &str = "documentName";
    pub const BLEND_MODE_ATTR: &str = "blendMode";
    pub const ALPHA_ATTR: &str = "alpha";
    pub const COLOR_BLEND_FACTOR_ATTR: &str = "colorBlendFactor";
    pub const VISIBLE_ATTR: &str = "isVisible";
    pub const FRAME_ATTR: &str = "frame";
    pub const TIMING_MODE_ATTR: &str = "timingMode";
    pub const START_FRAME_ATTR: &str = "startFrame";
    pub const END_FRAME_ATTR: &str = "endFrame";
    pub const FRAME_DURATION_ATTR: &str = "frameDuration";
}

/// One node of a parsed markup document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: FxHashMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder helper: adds an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Builder helper: appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Reads XML text into an element tree rooted at the document element.
    pub fn parse_str(text: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(text)?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            children: node
                .children()
                .filter(roxmltree::Node::is_element)
                .map(Self::from_node)
                .collect(),
        }
    }

    /// Fails with [`InkError::StructuralMismatch`] unless this element is `<name>`.
    pub fn expect_name(&self, name: &str) -> Result<()> {
        if self.name == name {
            Ok(())
        } else {
            Err(InkError::StructuralMismatch {
                expected: name.to_string(),
                found: self.name.clone(),
            })
        }
    }

    /// First child element named `name`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn required_child(&self, name: &str) -> Result<&Element> {
        self.child(name).ok_or_else(|| {
            InkError::malformed(format!(
                "expected <{name}> element in <{}> element",
                self.name
            ))
        })
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn required_attr(&self, name: &str) -> Result<&str> {
        self.attr(name).ok_or_else(|| {
            InkError::malformed(format!(
                "expected \"{name}\" attribute in <{}> element",
                self.name
            ))
        })
    }

    /// Parses a required attribute.
    pub fn parse_attr<T: FromStr>(&self, name: &str) -> Result<T> {
        let raw = self.required_attr(name)?;
        self.parse_value(name, raw)
    }

    /// Parses an optional attribute, falling back to `default` when absent.
    /// A present but unparsable value is still an error.
    pub fn parse_attr_or<T: FromStr>(&self, name: &str, default: T) -> Result<T> {
        match self.attr(name) {
            Some(raw) => self.parse_value(name, raw),
            None => Ok(default),
        }
    }

    fn parse_value<T: FromStr>(&self, name: &str, raw: &str) -> Result<T> {
        raw.trim().parse().map_err(|_| {
            InkError::malformed(format!(
                "invalid \"{name}\" attribute \"{raw}\" in <{}> element",
                self.name
            ))
        })
    }
}

/// Accepts `true`/`True`/`false`/`False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "True" => Some(true),
        "false" | "False" => Some(false),
        _ => None,
    }
}
