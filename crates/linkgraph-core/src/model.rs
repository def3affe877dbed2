//! Node and library metadata types shared by every pipeline stage.
//!
//! # Kind tokens
//!
//! Every [`LibraryKind`] has a canonical token used by filters, fact files
//! and exports:
//!
//! | kind              | token        |
//! |-------------------|--------------|
//! | `StaticArchive`   | `.a`         |
//! | `DynamicLibrary`  | `.dylib`     |
//! | `TextBasedStub`   | `.tbd`       |
//! | `Framework`       | `.framework` |
//! | `PackageProduct`  | `spm`        |
//! | `Unknown`         | (empty)      |

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Which namespace a node name lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Target,
    Library,
}

/// Link flavour of a library node.
///
/// Declaration order matters: when two registrations disagree on a known
/// kind, the earlier variant wins so ingestion stays order-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum LibraryKind {
    StaticArchive,
    DynamicLibrary,
    TextBasedStub,
    Framework,
    PackageProduct,
    #[default]
    Unknown,
}

impl LibraryKind {
    pub const ALL: [Self; 6] = [
        Self::StaticArchive,
        Self::DynamicLibrary,
        Self::TextBasedStub,
        Self::Framework,
        Self::PackageProduct,
        Self::Unknown,
    ];

    /// Canonical token for this kind.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::StaticArchive => ".a",
            Self::DynamicLibrary => ".dylib",
            Self::TextBasedStub => ".tbd",
            Self::Framework => ".framework",
            Self::PackageProduct => "spm",
            Self::Unknown => "",
        }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Normalize a user-supplied kind tag.
    ///
    /// Accepts the canonical token, the token without its leading dot, and a
    /// few aliases. Matching is case-insensitive and ignores surrounding
    /// whitespace. Returns `None` for anything else.
    #[must_use]
    pub fn from_tag(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_ascii_lowercase();
        let bare = tag.strip_prefix('.').unwrap_or(&tag);
        match bare {
            "a" | "static" => Some(Self::StaticArchive),
            "dylib" | "dynamic" => Some(Self::DynamicLibrary),
            "tbd" | "stub" => Some(Self::TextBasedStub),
            "framework" => Some(Self::Framework),
            "spm" | "package" | "swiftpm" => Some(Self::PackageProduct),
            "" | "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Infer the kind from a library file name or path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let lowered = path.to_ascii_lowercase();
        if lowered.ends_with(".framework") {
            Self::Framework
        } else if lowered.ends_with(".a") {
            Self::StaticArchive
        } else if lowered.ends_with(".tbd") {
            Self::TextBasedStub
        } else if lowered.ends_with(".dylib") {
            Self::DynamicLibrary
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl Serialize for LibraryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

impl<'de> Deserialize<'de> for LibraryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_tag(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown library kind '{raw}'")))
    }
}

/// Accumulated metadata for one library name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LibraryMeta {
    pub is_system: bool,
    pub kind: LibraryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl LibraryMeta {
    /// Fold another registration of the same library into this record.
    ///
    /// `is_system` OR-combines. A known kind replaces `Unknown`; two known
    /// kinds keep the smaller one. A subtitle fills an empty slot; two
    /// subtitles keep the lexicographically smaller one. Returns `true` when
    /// two known kinds disagreed.
    pub fn merge(&mut self, is_system: bool, kind: LibraryKind, subtitle: Option<&str>) -> bool {
        self.is_system |= is_system;

        let mut conflict = false;
        if kind.is_known() {
            if self.kind.is_known() && self.kind != kind {
                conflict = true;
            }
            self.kind = self.kind.min(kind);
        }

        if let Some(sub) = subtitle.filter(|s| !s.is_empty()) {
            match &self.subtitle {
                Some(existing) if existing.as_str() <= sub => {}
                _ => self.subtitle = Some(sub.to_string()),
            }
        }

        conflict
    }
}

// ---------------------------------------------------------------------------
// Path helpers for ingestion collaborators
// ---------------------------------------------------------------------------

const LIBRARY_EXTENSIONS: [&str; 4] = [".framework", ".a", ".tbd", ".dylib"];

/// Whether a file name looks like something a target links.
#[must_use]
pub fn is_library_path(path: &str) -> bool {
    let lowered = path.to_ascii_lowercase();
    LIBRARY_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

/// Display name for a library path: file name without its library extension.
///
/// `System/Library/Frameworks/UIKit.framework` becomes `UIKit`,
/// `libz.tbd` becomes `libz`.
#[must_use]
pub fn library_name_from_path(path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    let lowered = base.to_ascii_lowercase();
    LIBRARY_EXTENSIONS
        .iter()
        .find(|ext| lowered.ends_with(*ext))
        .map_or_else(|| base.to_string(), |ext| base[..base.len() - ext.len()].to_string())
}

/// Heuristic for SDK-provided libraries.
///
/// True when the path points into the system frameworks or `/usr/lib/`, or
/// when the reference is resolved relative to the SDK or developer dir.
#[must_use]
pub fn is_system_path(path: &str, source_tree: Option<&str>) -> bool {
    let lowered = path.to_ascii_lowercase();
    if lowered.contains("system/library/frameworks") || lowered.contains("/usr/lib/") {
        return true;
    }
    source_tree.is_some_and(|tree| {
        let tree = tree.to_ascii_uppercase();
        tree == "SDKROOT" || tree == "DEVELOPER_DIR"
    })
}
