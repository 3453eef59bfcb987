//! Version detection and capability gating.
//!
//! A document declares exactly one of `swagger` or `openapi`. The declared
//! string is normalized (`"3.0"` is the same as `"3.0.0"`) and mapped to a
//! [`VersionFamily`], which in turn answers [`Capability`] queries for the
//! rest of the pipeline.

use std::fmt;

use crate::error::ParseError;

/// Which key the version was declared under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionKey {
    Swagger,
    OpenApi,
}

impl VersionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionKey::Swagger => "swagger",
            VersionKey::OpenApi => "openapi",
        }
    }
}

/// Supported specification families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VersionFamily {
    Swagger2,
    OpenApi30,
    OpenApi31,
    OpenApi32,
}

impl VersionFamily {
    /// The newest OpenAPI 3.x family; unknown newer minors fall back to it.
    pub const NEWEST_OPENAPI: VersionFamily = VersionFamily::OpenApi32;

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionFamily::Swagger2 => "swagger2",
            VersionFamily::OpenApi30 => "openapi30",
            VersionFamily::OpenApi31 => "openapi31",
            VersionFamily::OpenApi32 => "openapi32",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        Capabilities { family: self }
    }

    pub fn is_swagger2(self) -> bool {
        self == VersionFamily::Swagger2
    }

    fn openapi_minor(minor: u32) -> Option<VersionFamily> {
        match minor {
            0 => Some(VersionFamily::OpenApi30),
            1 => Some(VersionFamily::OpenApi31),
            2 => Some(VersionFamily::OpenApi32),
            _ => None,
        }
    }
}

impl fmt::Display for VersionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named, closed set of version-dependent features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `const` literals narrow a schema to the literal's primitive type.
    ConstLiterals,
    /// JSON Schema 2020-12 keywords, notably `type` arrays.
    JsonSchema202012,
    /// Top-level `webhooks` section.
    Webhooks,
    /// Request payloads declared as `in: body` parameters.
    BodyParameters,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::ConstLiterals,
        Capability::JsonSchema202012,
        Capability::Webhooks,
        Capability::BodyParameters,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ConstLiterals => "const_literals",
            Capability::JsonSchema202012 => "json_schema_2020_12",
            Capability::Webhooks => "webhooks",
            Capability::BodyParameters => "body_parameters",
        }
    }
}

/// Capability lookup for one family. Every capability has an answer; a
/// feature the family lacks reports `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    family: VersionFamily,
}

impl Capabilities {
    pub fn family(&self) -> VersionFamily {
        self.family
    }

    pub fn supports(&self, capability: Capability) -> bool {
        use VersionFamily::*;
        match capability {
            Capability::ConstLiterals | Capability::JsonSchema202012 | Capability::Webhooks => {
                matches!(self.family, OpenApi31 | OpenApi32)
            }
            Capability::BodyParameters => self.family == Swagger2,
        }
    }

    /// All capabilities with their state, in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        Capability::ALL.into_iter().map(|c| (c, self.supports(c)))
    }
}

/// A validated version declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecVersion {
    pub raw: String,
    pub key: VersionKey,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub family: VersionFamily,
}

impl SpecVersion {
    /// Zero-filled `major.minor.patch` form.
    pub fn normalized(&self) -> String {
        format!("{}.{}.{}", self.major, self.minor, self.patch)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.family.capabilities()
    }
}

/// Detect the version from the two possible declarations of a document.
pub fn detect(swagger: Option<&str>, openapi: Option<&str>) -> Result<SpecVersion, ParseError> {
    match (swagger, openapi) {
        (Some(s), None) => detect_version(VersionKey::Swagger, s),
        (None, Some(o)) => detect_version(VersionKey::OpenApi, o),
        (None, None) => Err(ParseError::MissingVersionDeclaration),
        (Some(s), Some(o)) => Err(ParseError::ConflictingVersionDeclaration {
            swagger: s.to_string(),
            openapi: o.to_string(),
        }),
    }
}

/// Map a single declared version string to its family.
pub fn detect_version(key: VersionKey, raw: &str) -> Result<SpecVersion, ParseError> {
    let unsupported = || ParseError::UnsupportedVersion(format!("{} {}", key.as_str(), raw));
    let (major, minor, patch) = normalize(raw).ok_or_else(unsupported)?;

    let family = match (key, major) {
        (VersionKey::Swagger, 2) => VersionFamily::Swagger2,
        (VersionKey::OpenApi, 3) => match VersionFamily::openapi_minor(minor) {
            Some(family) => family,
            None => {
                log::warn!(
                    "openapi {raw} is newer than any known 3.x release, treating it as {}",
                    VersionFamily::NEWEST_OPENAPI
                );
                VersionFamily::NEWEST_OPENAPI
            }
        },
        _ => return Err(unsupported()),
    };

    Ok(SpecVersion {
        raw: raw.to_string(),
        key,
        major,
        minor,
        patch,
        family,
    })
}

/// Parse `major[.minor[.patch]]`, zero-filling missing components and
/// ignoring any pre-release or build suffix.
pub fn normalize(raw: &str) -> Option<(u32, u32, u32)> {
    let core = raw.trim().split(['-', '+']).next().unwrap_or_default();
    if core.is_empty() {
        return None;
    }

    let mut parts = [0u32; 3];
    let mut count = 0;
    for piece in core.split('.') {
        if count == parts.len() {
            return None;
        }
        parts[count] = piece.parse().ok()?;
        count += 1;
    }
    Some((parts[0], parts[1], parts[2]))
}
