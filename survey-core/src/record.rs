//! Record model shared by stars, worlds and surveys.

use crate::audit::AuditTrail;
use crate::error::ValidationError;
use crate::identity::{new_record_id, parse_record_id, RecordId, Timestamp};
use crate::normalize::{display_name, normalize_opt, tidy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Flat attribute set as submitted by a client.
pub type Attributes = serde_json::Map<String, Value>;

/// Attribute names clients may never set directly.
pub const RESERVED_FIELDS: &[&str] = &[
    "id",
    "kind",
    "updaters",
    "creator",
    "created_at",
    "updated_at",
];

/// Kind of survey record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Star,
    World,
    Survey,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [RecordKind::Star, RecordKind::World, RecordKind::Survey];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Star => "star",
            RecordKind::World => "world",
            RecordKind::Survey => "survey",
        }
    }

    /// Collection name, also the JSON:API `type`.
    pub fn plural(&self) -> &'static str {
        match self {
            RecordKind::Star => "stars",
            RecordKind::World => "worlds",
            RecordKind::Survey => "surveys",
        }
    }

    /// Attribute naming the body inside a system, for kinds that have one.
    pub fn body_field(&self) -> Option<&'static str> {
        match self {
            RecordKind::Star => Some("star"),
            RecordKind::World => Some("world"),
            RecordKind::Survey => None,
        }
    }

    /// Attribute naming the reporter of record.
    pub fn owner_field(&self) -> &'static str {
        match self {
            RecordKind::Star | RecordKind::World => "updater",
            RecordKind::Survey => "commander",
        }
    }

    /// Whether `(system, body)` must be unique within the kind.
    pub fn has_unique_identity(&self) -> bool {
        matches!(self, RecordKind::Star | RecordKind::World)
    }

    /// Whether changes are restricted to the record's owner.
    pub fn is_owner_protected(&self) -> bool {
        matches!(self, RecordKind::Survey)
    }

    /// Text columns the kind stores outside the opaque attribute payload.
    pub fn text_fields(&self) -> &'static [TextField] {
        match self {
            RecordKind::Star | RecordKind::World => {
                &[TextField::System, TextField::Body, TextField::Owner]
            }
            RecordKind::Survey => &[TextField::Resource, TextField::Owner],
        }
    }

    /// Foreign keys the kind carries.
    pub fn reference_fields(&self) -> &'static [RefField] {
        match self {
            RecordKind::Star => &[],
            RecordKind::World => &[RefField::System],
            RecordKind::Survey => &[RefField::World, RefField::Basecamp, RefField::System],
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "star" | "stars" => Ok(RecordKind::Star),
            "world" | "worlds" => Ok(RecordKind::World),
            "survey" | "surveys" => Ok(RecordKind::Survey),
            other => Err(format!("Unknown record kind: {}", other)),
        }
    }
}

/// Normalized free-text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    System,
    /// Star or world name.
    Body,
    /// Updater (stars, worlds) or commander (surveys).
    Owner,
    Resource,
}

impl TextField {
    /// Attribute name for this column on the given kind.
    pub fn attribute(&self, kind: RecordKind) -> &'static str {
        match self {
            TextField::System => "system",
            TextField::Body => kind.body_field().unwrap_or("body"),
            TextField::Owner => kind.owner_field(),
            TextField::Resource => "resource",
        }
    }

    /// Storage column name.
    pub fn column(&self) -> &'static str {
        match self {
            TextField::System => "system",
            TextField::Body => "body",
            TextField::Owner => "owner",
            TextField::Resource => "resource",
        }
    }
}

/// Foreign-key columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefField {
    World,
    Basecamp,
    System,
}

impl RefField {
    /// Relationship name, e.g. `world`.
    pub fn relationship(&self) -> &'static str {
        match self {
            RefField::World => "world",
            RefField::Basecamp => "basecamp",
            RefField::System => "system",
        }
    }

    /// Attribute and column name, e.g. `world_id`.
    pub fn attribute(&self) -> &'static str {
        match self {
            RefField::World => "world_id",
            RefField::Basecamp => "basecamp_id",
            RefField::System => "system_id",
        }
    }

    /// JSON:API `type` accepted for references of this relationship.
    pub fn target_type(&self) -> &'static str {
        match self {
            RefField::World => "worlds",
            RefField::Basecamp => "basecamps",
            RefField::System => "systems",
        }
    }
}

/// Normalized identity of a star or world: `(system, body)` after trim and
/// upper-casing. A missing body is the empty key and still participates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub kind: RecordKind,
    pub system: String,
    pub body: String,
}

impl IdentityKey {
    pub fn new(kind: RecordKind, system: Option<&str>, body: Option<&str>) -> Self {
        Self {
            kind,
            system: normalize_opt(system),
            body: normalize_opt(body),
        }
    }

    /// Single-string form used as a storage index value.
    pub fn encoded(&self) -> String {
        format!("{}\u{1f}{}", self.system, self.body)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.system, self.body)
    }
}

/// A star, world or survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub kind: RecordKind,
    pub system: Option<String>,
    pub body: Option<String>,
    pub owner: Option<String>,
    pub resource: Option<String>,
    pub world_id: Option<RecordId>,
    pub basecamp_id: Option<RecordId>,
    pub system_id: Option<RecordId>,
    /// Domain measurements, opaque to this crate.
    pub attributes: Attributes,
    pub updaters: AuditTrail,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Insertion order assigned by the store; stable sort tie-breaker.
    #[serde(default)]
    pub sequence: i64,
}

impl Record {
    pub fn new(kind: RecordKind, now: Timestamp) -> Self {
        Self {
            id: new_record_id(),
            kind,
            system: None,
            body: None,
            owner: None,
            resource: None,
            world_id: None,
            basecamp_id: None,
            system_id: None,
            attributes: Attributes::new(),
            updaters: AuditTrail::new(),
            created_at: now,
            updated_at: now,
            sequence: 0,
        }
    }

    pub fn text(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::System => self.system.as_deref(),
            TextField::Body => self.body.as_deref(),
            TextField::Owner => self.owner.as_deref(),
            TextField::Resource => self.resource.as_deref(),
        }
    }

    fn text_mut(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::System => &mut self.system,
            TextField::Body => &mut self.body,
            TextField::Owner => &mut self.owner,
            TextField::Resource => &mut self.resource,
        }
    }

    pub fn reference(&self, field: RefField) -> Option<RecordId> {
        match field {
            RefField::World => self.world_id,
            RefField::Basecamp => self.basecamp_id,
            RefField::System => self.system_id,
        }
    }

    fn reference_mut(&mut self, field: RefField) -> &mut Option<RecordId> {
        match field {
            RefField::World => &mut self.world_id,
            RefField::Basecamp => &mut self.basecamp_id,
            RefField::System => &mut self.system_id,
        }
    }

    /// Derived creator: the first entry of the audit trail.
    pub fn creator(&self) -> Option<&str> {
        self.updaters.creator()
    }

    /// Uniqueness key, for kinds that have one.
    pub fn identity_key(&self) -> Option<IdentityKey> {
        self.kind
            .has_unique_identity()
            .then(|| IdentityKey::new(self.kind, self.system.as_deref(), self.body.as_deref()))
    }

    /// Merge client attributes into the record.
    ///
    /// Known columns are parsed into their typed slots; everything else lands
    /// in the opaque payload. A `null` clears the value. Reserved names are
    /// ignored. All type errors are collected before returning.
    pub fn apply_attributes(&mut self, attrs: &Attributes) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let kind = self.kind;

        'fields: for (name, value) in attrs {
            if RESERVED_FIELDS.contains(&name.as_str()) {
                continue;
            }

            for field in kind.text_fields() {
                if name == field.attribute(kind) {
                    match text_value(name, value, *field) {
                        Ok(text) => *self.text_mut(*field) = text,
                        Err(err) => errors.push(err),
                    }
                    continue 'fields;
                }
            }

            for field in kind.reference_fields() {
                if name == field.attribute() {
                    match reference_value(name, value) {
                        Ok(id) => *self.reference_mut(*field) = id,
                        Err(err) => errors.push(err),
                    }
                    continue 'fields;
                }
            }

            if value.is_null() {
                self.attributes.remove(name);
            } else {
                self.attributes.insert(name.clone(), value.clone());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Presence checks for identity fields and mandatory associations.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        let kind = self.kind;

        match kind {
            RecordKind::Star => {
                require(&mut errors, "system", self.system.as_deref());
            }
            RecordKind::World => {
                require(&mut errors, "system", self.system.as_deref());
                require(&mut errors, "world", self.body.as_deref());
            }
            RecordKind::Survey => {
                if self.world_id.is_none() {
                    errors.push(ValidationError::MissingAssociation {
                        field: "world".to_string(),
                    });
                }
            }
        }
        require(&mut errors, kind.owner_field(), self.owner.as_deref());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn require(errors: &mut Vec<ValidationError>, field: &str, value: Option<&str>) {
    if value.map_or(true, |v| v.trim().is_empty()) {
        errors.push(ValidationError::required(field));
    }
}

fn text_value(
    name: &str,
    value: &Value,
    field: TextField,
) -> Result<Option<String>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if field == TextField::Owner => Ok(display_name(s)),
        Value::String(s) => Ok(tidy(s)),
        _ => Err(ValidationError::invalid(name, "must be a string")),
    }
}

fn reference_value(name: &str, value: &Value) -> Result<Option<RecordId>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => parse_record_id(s)
            .map(Some)
            .ok_or_else(|| ValidationError::invalid(name, "must be a valid UUID")),
        _ => Err(ValidationError::invalid(name, "must be a valid UUID")),
    }
}

/// Names of the fields a client submitted, minus reserved ones.
pub fn submitted_fields(attrs: &Attributes) -> BTreeSet<String> {
    attrs
        .keys()
        .filter(|name| !RESERVED_FIELDS.contains(&name.as_str()))
        .cloned()
        .collect()
}
