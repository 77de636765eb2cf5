//! HAL envelopes: resource content plus a `_links` object, collections under
//! `_embedded`.

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};

use crate::model::Employee;

pub const SELF_REL: &str = "self";

/// A named relation pointing at a resource path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    rel: String,
    href: String,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }

    pub fn self_link(href: impl Into<String>) -> Self {
        Self::new(SELF_REL, href)
    }

    pub fn rel(&self) -> &str {
        &self.rel
    }

    pub fn href(&self) -> &str {
        &self.href
    }
}

/// Links keyed by relation, at most one per relation, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `link`, replacing any previous link with the same relation.
    pub fn with(mut self, link: Link) -> Self {
        match self.0.iter_mut().find(|existing| existing.rel == link.rel) {
            Some(existing) => *existing = link,
            None => self.0.push(link),
        }
        self
    }

    pub fn get(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.rel == rel)
    }

    pub fn href(&self, rel: &str) -> Option<&str> {
        self.get(rel).map(Link::href)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.0.iter()
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        iter.into_iter().fold(Links::new(), Links::with)
    }
}

#[derive(Serialize)]
struct HrefRef<'a> {
    href: &'a str,
}

#[derive(Deserialize)]
struct Href {
    href: String,
}

impl Serialize for Links {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for link in &self.0 {
            map.serialize_entry(&link.rel, &HrefRef { href: &link.href })?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Links {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LinksVisitor)
    }
}

struct LinksVisitor;

impl<'de> Visitor<'de> for LinksVisitor {
    type Value = Links;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of relation names to {\"href\": ...} objects")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Links, A::Error> {
        let mut links = Links::new();
        while let Some((rel, target)) = access.next_entry::<String, Href>()? {
            links = links.with(Link::new(rel, target.href));
        }
        Ok(links)
    }
}

/// Single resource with its links; the content's fields sit next to `_links`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityModel<T> {
    #[serde(flatten)]
    pub content: T,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl<T> EntityModel<T> {
    pub fn of(content: T, links: Links) -> Self {
        Self { content, links }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedEmployees {
    #[serde(rename = "employeeList", default)]
    pub employees: Vec<EntityModel<Employee>>,
}

/// The employee collection: every item keeps its own links, the collection
/// adds its own `self`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionModel {
    #[serde(rename = "_embedded", default)]
    pub embedded: EmbeddedEmployees,
    #[serde(rename = "_links")]
    pub links: Links,
}

impl CollectionModel {
    pub fn of(employees: Vec<EntityModel<Employee>>, links: Links) -> Self {
        Self {
            embedded: EmbeddedEmployees { employees },
            links,
        }
    }

    pub fn employees(&self) -> &[EntityModel<Employee>] {
        &self.embedded.employees
    }
}
