//! Navigation and view switching utilities.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum View {
    Correlations,
    Entities,
    Agents,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Correlations => "Correlations",
            View::Entities => "Entities",
            View::Agents => "Agents",
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Correlations, View::Entities, View::Agents]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let idx = self.index();
        let all = Self::all();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
