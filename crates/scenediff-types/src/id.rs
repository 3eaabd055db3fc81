use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identity of a record within one version of a document.
///
/// A `FileId` is unique within a single record set but is **not** stable
/// across versions: the serializer is free to renumber records between saves.
/// The value `0` is the null reference ("no object").
#[derive(
    Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FileId(i64);

impl FileId {
    /// The null identity. Represents "no object".
    pub const NULL: FileId = FileId(0);

    /// Wrap a raw identity value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw signed value.
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Returns `true` if this is the null identity.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `Some(self)` unless this is the null identity.
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for FileId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for FileId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidFileId(s.to_string()))
    }
}

/// Numeric record type code (the `!u!N` class tag of a record header).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeCode(u32);

impl TypeCode {
    pub const GAME_OBJECT: TypeCode = TypeCode(1);
    pub const TRANSFORM: TypeCode = TypeCode(4);
    pub const MONO_BEHAVIOUR: TypeCode = TypeCode(114);
    pub const RECT_TRANSFORM: TypeCode = TypeCode(224);
    pub const PREFAB_INSTANCE: TypeCode = TypeCode(1001);

    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Object records own components and carry the display name.
    pub fn is_object(self) -> bool {
        self == Self::GAME_OBJECT
    }

    /// Both transform kinds are interchangeable for hierarchy purposes.
    pub fn is_transform_like(self) -> bool {
        self == Self::TRANSFORM || self == Self::RECT_TRANSFORM
    }

    /// Cross-file instance records, which are neither objects nor components.
    pub fn is_instance_reference(self) -> bool {
        self == Self::PREFAB_INSTANCE
    }

    /// Static name for well-known codes, used when a body carries no type key.
    pub fn fallback_name(self) -> Option<&'static str> {
        let name = match self.0 {
            1 => "GameObject",
            4 => "Transform",
            20 => "Camera",
            23 => "MeshRenderer",
            29 => "OcclusionCullingSettings",
            33 => "MeshFilter",
            54 => "Rigidbody",
            65 => "BoxCollider",
            82 => "AudioSource",
            95 => "Animator",
            104 => "RenderSettings",
            108 => "Light",
            114 => "MonoBehaviour",
            157 => "LightmapSettings",
            196 => "NavMeshSettings",
            222 => "CanvasRenderer",
            223 => "Canvas",
            224 => "RectTransform",
            1001 => "PrefabInstance",
            1660057539 => "SceneRoots",
            _ => return None,
        };
        Some(name)
    }

    /// The fallback name, or `Type<N>` for unknown codes.
    pub fn display_name(self) -> String {
        match self.fallback_name() {
            Some(name) => name.to_string(),
            None => format!("Type{}", self.0),
        }
    }
}

impl fmt::Debug for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeCode({})", self.0)
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TypeCode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| TypeError::InvalidTypeCode(s.to_string()))
    }
}
