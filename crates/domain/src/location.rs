//! Location — a geolocated structure (household, building) expressed as a
//! GeoJSON `Feature`.
//!
//! The serialized feature is the canonical storage payload: repositories
//! persist it verbatim next to a handful of indexed scalar columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{StructuraError, ValidationError};
use crate::time::Timestamp;

const FEATURE: &str = "Feature";

fn feature() -> String {
    FEATURE.to_string()
}

/// A structure or administrative location in GeoJSON `Feature` form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(rename = "type", default = "feature")]
    pub feature_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: LocationProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<i64>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            feature_type: feature(),
            id: None,
            geometry: None,
            properties: LocationProperties::default(),
            server_version: None,
        }
    }
}

/// Descriptive attributes carried in the feature's `properties` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LocationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_level: Option<i32>,
    #[serde(
        default,
        with = "crate::time::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub effective_start_date: Option<Timestamp>,
    #[serde(
        default,
        with = "crate::time::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub effective_end_date: Option<Timestamp>,
    #[serde(default)]
    pub version: i32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, String>,
}

/// Lifecycle status of a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationStatus {
    Active,
    Inactive,
    Pending,
    #[serde(rename = "Not Eligible")]
    NotEligible,
}

/// GeoJSON geometry object. Coordinates are kept as raw JSON since their
/// nesting depth depends on [`GeometryType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: GeometryType,
    pub coordinates: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

impl Location {
    /// Create a builder for constructing a [`Location`].
    #[must_use]
    pub fn builder() -> LocationBuilder {
        LocationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::Validation`] when `id` is absent or blank.
    pub fn validate(&self) -> Result<(), StructuraError> {
        self.require_id()?;
        Ok(())
    }

    /// Return the identifier, or [`ValidationError::MissingIdentifier`] when
    /// it is absent or blank.
    ///
    /// # Errors
    ///
    /// See above.
    pub fn require_id(&self) -> Result<&str, ValidationError> {
        match self.id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(id),
            _ => Err(ValidationError::MissingIdentifier),
        }
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.properties.uid.as_deref()
    }

    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        self.properties.parent_id.as_deref()
    }

    #[must_use]
    pub fn location_type(&self) -> Option<&str> {
        self.properties.location_type.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.properties.name.as_deref()
    }
}

/// Step-by-step builder for [`Location`].
#[derive(Debug, Default)]
pub struct LocationBuilder {
    id: Option<String>,
    uid: Option<String>,
    parent_id: Option<String>,
    location_type: Option<String>,
    name: Option<String>,
    status: Option<LocationStatus>,
    geographic_level: Option<i32>,
    geometry: Option<Geometry>,
    server_version: Option<i64>,
}

impl LocationBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[must_use]
    pub fn location_type(mut self, location_type: impl Into<String>) -> Self {
        self.location_type = Some(location_type.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: LocationStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn geographic_level(mut self, level: i32) -> Self {
        self.geographic_level = Some(level);
        self
    }

    #[must_use]
    pub fn geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    #[must_use]
    pub fn server_version(mut self, server_version: i64) -> Self {
        self.server_version = Some(server_version);
        self
    }

    /// Consume the builder, validate, and return a [`Location`].
    ///
    /// A random `uid` is generated when none was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`StructuraError::Validation`] if `id` is missing or blank.
    pub fn build(self) -> Result<Location, StructuraError> {
        let location = Location {
            feature_type: feature(),
            id: self.id,
            geometry: self.geometry,
            properties: LocationProperties {
                uid: Some(
                    self.uid
                        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                ),
                location_type: self.location_type,
                status: self.status,
                parent_id: self.parent_id,
                name: self.name,
                geographic_level: self.geographic_level,
                ..LocationProperties::default()
            },
            server_version: self.server_version,
        };
        location.validate()?;
        Ok(location)
    }
}
