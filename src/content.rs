use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const BUNDLED: &str = include_str!("../content/site.json");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfo {
    pub name: String,
    pub institution: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub image: Option<String>,
    /// Markup, rendered as-is.
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventItem {
    pub id: String,
    pub title: String,
    /// ISO date-time, usually without an offset (site local time).
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub orcid: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub research_interests: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub youtube_id: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl Video {
    pub fn embed_url(&self) -> String { format!("https://www.youtube.com/embed/{}", self.youtube_id) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaboration {
    pub name: String,
    pub institution: String,
    #[serde(default)]
    pub description: String,
}

/// Staff grouped by category. Categories keep the order they were authored in.
#[derive(Debug, Clone, Default)]
pub struct Staff(Vec<(String, Vec<Person>)>);

impl Staff {
    pub fn category(&self, name: &str) -> Option<&[Person]> {
        self.0.iter().find(|(c, _)| c == name).map(|(_, people)| people.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> { self.0.iter().map(|(c, _)| c.as_str()) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Person])> {
        self.0.iter().map(|(c, people)| (c.as_str(), people.as_slice()))
    }

    pub fn people(&self) -> impl Iterator<Item = &Person> { self.0.iter().flat_map(|(_, people)| people.iter()) }

    pub fn len(&self) -> usize { self.0.iter().map(|(_, people)| people.len()).sum() }
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl Serialize for Staff {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (category, people) in &self.0 {
            map.serialize_entry(category, people)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Staff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct StaffVisitor;

        impl<'de> Visitor<'de> for StaffVisitor {
            type Value = Staff;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of staff category to people")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Staff, A::Error> {
                let mut groups = Vec::new();
                while let Some((category, people)) = map.next_entry::<String, Vec<Person>>()? {
                    groups.push((category, people));
                }
                Ok(Staff(groups))
            }
        }

        deserializer.deserialize_map(StaffVisitor)
    }
}

/// Read-only description of the site: built once, then shared by every widget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default)]
    pub navigation: Vec<NavLink>,
    #[serde(default)]
    pub research_areas: Vec<String>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub events: Vec<EventItem>,
    #[serde(default)]
    pub staff: Staff,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub network: Vec<Collaboration>,
}

impl ContentRecord {
    /// The record shipped with the crate.
    pub fn bundled() -> Result<Self> { Self::from_json(BUNDLED).context("parsing bundled content/site.json") }

    pub fn from_json(raw: &str) -> Result<Self> { serde_json::from_str(raw).map_err(Into::into) }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading content file: {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing content file: {}", path.display()))
    }

    /// Most recent news first, at most `limit` items. Equal dates keep authoring order.
    pub fn recent_news(&self, limit: usize) -> Vec<&NewsItem> {
        let mut items: Vec<&NewsItem> = self.news.iter().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items.truncate(limit);
        items
    }

    pub fn next_event(&self) -> Option<&EventItem> { self.events.first() }

    pub fn find_person(&self, id: &str) -> Option<&Person> { self.staff.people().find(|p| p.id == id) }

    /// Ids that appear more than once across news, events and staff.
    pub fn duplicate_ids(&self) -> Vec<String> {
        let ids = self.news.iter().map(|n| n.id.as_str())
            .chain(self.events.iter().map(|e| e.id.as_str()))
            .chain(self.staff.people().map(|p| p.id.as_str()));
        let mut seen = HashSet::new();
        let mut dupes = Vec::new();
        for id in ids {
            if !seen.insert(id) && !dupes.iter().any(|d| d == id) { dupes.push(id.to_string()); }
        }
        dupes
    }
}
