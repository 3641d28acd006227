//! Schema data model and its JSON form.
//!
//! A schema document is either an object keyed by entity name, or a plain
//! array of entities. Both load into the same ordered [`Schema`]; output
//! always uses the keyed form.

use std::collections::HashSet;
use std::fmt;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub entity: String,
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub datatype: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub primary_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
            primary_key: false,
            foreign_key: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn references(mut self, entity: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            entity: entity.into(),
            attribute: attribute.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl Entity {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| a.primary_key)
    }
}

/// A foreign key edge between two attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub from_entity: String,
    pub from_attribute: String,
    pub to_entity: String,
    pub to_attribute: String,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.from_entity, self.from_attribute, self.to_entity, self.to_attribute
        )
    }
}

/// Ordered set of uniquely named entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entities: Vec<Entity>,
}

impl Schema {
    /// Build a schema, rejecting duplicate entity names.
    pub fn new(entities: Vec<Entity>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entity in &entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(Error::DuplicateEntity {
                    name: entity.name.clone(),
                });
            }
        }
        Ok(Self { entities })
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let entities = match serde_json::from_str::<Document>(input)? {
            Document::Keyed(entries) => {
                let mut entities = Vec::with_capacity(entries.len());
                for (key, entity) in entries {
                    if entity.name != key {
                        return Err(Error::EntityKeyMismatch {
                            key,
                            name: entity.name,
                        });
                    }
                    entities.push(entity);
                }
                entities
            }
            Document::List(entities) => entities,
        };
        Self::new(entities)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// All foreign keys, in entity then attribute order.
    pub fn references(&self) -> Vec<Reference> {
        self.entities
            .iter()
            .flat_map(|e| {
                e.attributes.iter().filter_map(move |a| {
                    a.foreign_key.as_ref().map(|fk| Reference {
                        from_entity: e.name.clone(),
                        from_attribute: a.name.clone(),
                        to_entity: fk.entity.clone(),
                        to_attribute: fk.attribute.clone(),
                    })
                })
            })
            .collect()
    }

    /// Foreign keys whose target entity or attribute is missing.
    pub fn dangling_references(&self) -> Vec<Reference> {
        self.references()
            .into_iter()
            .filter(|r| {
                self.entity(&r.to_entity)
                    .and_then(|e| e.attribute(&r.to_attribute))
                    .is_none()
            })
            .collect()
    }
}

impl Serialize for Schema {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entities.len()))?;
        for entity in &self.entities {
            map.serialize_entry(&entity.name, entity)?;
        }
        map.end()
    }
}

/// A schema document as written. Object entries are kept in order and a
/// repeated key stays a separate entry.
enum Document {
    Keyed(Vec<(String, Entity)>),
    List(Vec<Entity>),
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object keyed by entity name or an array of entities")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Document, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(entry) = map.next_entry::<String, Entity>()? {
            entries.push(entry);
        }
        Ok(Document::Keyed(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Document, A::Error> {
        let mut entities = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(entity) = seq.next_element::<Entity>()? {
            entities.push(entity);
        }
        Ok(Document::List(entities))
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
