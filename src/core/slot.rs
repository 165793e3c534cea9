use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    #[default]
    Markup,
    Script,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Markup, Slot::Script];

    pub fn as_str(self) -> &'static str {
        match self {
            Slot::Markup => "html",
            Slot::Script => "javascript",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Markup => "HTML",
            Slot::Script => "JavaScript",
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::Markup => Slot::Script,
            Slot::Script => Slot::Markup,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown slot: {0}")]
pub struct UnknownSlot(pub String);

impl FromStr for Slot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" | "markup" => Ok(Slot::Markup),
            "javascript" | "js" | "script" => Ok(Slot::Script),
            other => Err(UnknownSlot(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPair<T> {
    pub markup: T,
    pub script: T,
}

impl<T> SlotPair<T> {
    pub fn new(markup: T, script: T) -> Self {
        Self { markup, script }
    }

    pub fn map<U>(self, mut f: impl FnMut(Slot, T) -> U) -> SlotPair<U> {
        SlotPair {
            markup: f(Slot::Markup, self.markup),
            script: f(Slot::Script, self.script),
        }
    }

    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::Markup => &self.markup,
            Slot::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::Markup => &mut self.markup,
            Slot::Script => &mut self.script,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        Slot::ALL.into_iter().map(move |slot| (slot, self.get(slot)))
    }
}

impl<T> Index<Slot> for SlotPair<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &T {
        self.get(slot)
    }
}

impl<T> IndexMut<Slot> for SlotPair<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        self.get_mut(slot)
    }
}
