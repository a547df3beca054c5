// The hub's program slot table, stored at /projects/.slots as a Python dict
// literal `{slot: {'name': .., 'created': .., ...}}`.

use crate::sedes::{Deserialize, Literal, SedesError, Serialize};
use std::fmt;

pub const SLOTS_PATH: &str = "/projects/.slots";
pub const MAX_SLOT: u8 = 20;
const ID_BASE: u32 = 10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectType {
    #[default]
    Python,
    Scratch,
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Scratch => write!(f, "scratch"),
        }
    }
}

pub fn file_id(slot: u8) -> u32 {
    ID_BASE + slot as u32
}

/// Where the program for `slot` lives on the hub.
pub fn program_path(slot: u8) -> String {
    format!("/projects/{}.py", file_id(slot))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRecord {
    pub name: String,
    pub created: i64,
    pub modified: i64,
    pub size: u64,
    pub id: u32,
    pub project_id: String,
    pub kind: ProjectType,
}

impl SlotRecord {
    pub fn new(slot: u8, name: &str, created: i64, modified: i64, size: u64, kind: ProjectType) -> Self {
        let id = file_id(slot);
        Self {
            name: String::from(name),
            created,
            modified,
            size,
            id,
            project_id: format!("prj{id}"),
            kind,
        }
    }
}

impl From<&SlotRecord> for Literal {
    fn from(r: &SlotRecord) -> Self {
        Literal::Dict(vec![
            (Literal::str("name"), Literal::str(&r.name)),
            (Literal::str("created"), Literal::Int(r.created)),
            (Literal::str("modified"), Literal::Int(r.modified)),
            (Literal::str("size"), Literal::Int(r.size as i64)),
            (Literal::str("id"), Literal::Int(r.id as i64)),
            (Literal::str("project_id"), Literal::str(&r.project_id)),
            (Literal::str("type"), Literal::str(&r.kind.to_string())),
        ])
    }
}

/// Slot table with entries kept in file order. Records this tool did not
/// write are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotRegistry {
    entries: Vec<(Literal, Literal)>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slot: u8) -> Option<&Literal> {
        let key = Literal::Int(slot as i64);
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Replace the record for `slot` in place, or append it.
    pub fn set(&mut self, slot: u8, record: &SlotRecord) {
        let key = Literal::Int(slot as i64);
        let value = Literal::from(record);
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl Serialize for SlotRegistry {
    fn serialize(&self) -> String {
        Literal::Dict(self.entries.clone()).serialize()
    }
}

impl Deserialize for SlotRegistry {
    fn deserialize(src: &str) -> Result<Self, SedesError> {
        if src.trim().is_empty() {
            return Ok(Self::new());
        }
        match Literal::deserialize(src)? {
            Literal::Dict(entries) => Ok(Self { entries }),
            other => Err(SedesError::Shape(format!("slot table is not a dict: {other}"))),
        }
    }
}
