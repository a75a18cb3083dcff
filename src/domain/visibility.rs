// Tri-state content visibility - persisted configuration, resolution, and
// draft editing
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog;

/// One selection set as the resolver sees it.
///
/// `Unset` means the operator never saved a configuration, so everything is
/// visible. `Explicit` lists exactly the visible keys, and an explicit empty
/// set hides every key of that kind. The two must never collapse into a
/// single "empty" state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Unset,
    Explicit(BTreeSet<String>),
}

impl Selection {
    pub fn allows(&self, key: &str) -> bool {
        match self {
            Selection::Unset => true,
            Selection::Explicit(keys) => keys.contains(key),
        }
    }
}

/// Persisted per-client dashboard configuration.
///
/// `updated_at` is the sole discriminator between never-saved and saved:
/// while it is absent every set resolves to `Selection::Unset`, whatever the
/// set fields hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub selected_kpis: Option<Vec<String>>,
    #[serde(default)]
    pub visible_sections: Option<Vec<String>>,
    #[serde(default)]
    pub selected_charts: Option<Vec<String>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DashboardConfig {
    fn selection(&self, keys: &Option<Vec<String>>) -> Selection {
        if self.updated_at.is_none() {
            return Selection::Unset;
        }
        Selection::Explicit(keys.iter().flatten().cloned().collect())
    }

    pub fn kpi_selection(&self) -> Selection {
        self.selection(&self.selected_kpis)
    }

    pub fn section_selection(&self) -> Selection {
        self.selection(&self.visible_sections)
    }

    pub fn chart_selection(&self) -> Selection {
        self.selection(&self.selected_charts)
    }
}

/// Resolved visibility for one render pass. Pure lookups; never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityView {
    kpis: Selection,
    sections: Selection,
    charts: Selection,
}

impl VisibilityView {
    /// Everything visible. Operator mode uses this, and public mode falls
    /// back to it when no configuration can be loaded.
    pub fn open() -> Self {
        Self {
            kpis: Selection::Unset,
            sections: Selection::Unset,
            charts: Selection::Unset,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            kpis: config.kpi_selection(),
            sections: config.section_selection(),
            charts: config.chart_selection(),
        }
    }

    pub fn shows_section(&self, key: &str) -> bool {
        self.sections.allows(key)
    }

    /// A hidden section hides every KPI it owns; a visible section still
    /// requires the KPI itself to be selected.
    pub fn shows_kpi(&self, key: &str) -> bool {
        let section_open = catalog::section_of_kpi(key)
            .map(|s| self.sections.allows(s.key))
            .unwrap_or(true);
        section_open && self.kpis.allows(key)
    }

    pub fn shows_chart(&self, key: &str) -> bool {
        let section_open = catalog::section_of_chart(key)
            .map(|s| self.sections.allows(s.key))
            .unwrap_or(true);
        section_open && self.charts.allows(key)
    }

    /// Keys of the sections to render, in catalog order.
    pub fn visible_sections(&self) -> Vec<&'static str> {
        catalog::SECTIONS
            .iter()
            .filter(|s| self.shows_section(s.key))
            .map(|s| s.key)
            .collect()
    }
}

/// Select-all state of a section's KPIs or charts in a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    All,
    None,
    Partial,
}

/// Operator-side editing buffer.
///
/// Holds the committed configuration plus a draft copy of the three
/// selection sets. Draft mutations never touch the committed copy;
/// `save_payload` hands the draft to the store verbatim, `mark_saved`
/// records a successful save, and `cancel` rebuilds the draft from the
/// committed copy.
#[derive(Debug, Clone)]
pub struct VisibilityEditor {
    committed: DashboardConfig,
    kpis: BTreeSet<String>,
    sections: BTreeSet<String>,
    charts: BTreeSet<String>,
}

impl VisibilityEditor {
    pub fn new(committed: DashboardConfig) -> Self {
        let mut editor = Self {
            committed,
            kpis: BTreeSet::new(),
            sections: BTreeSet::new(),
            charts: BTreeSet::new(),
        };
        editor.reset_draft();
        editor
    }

    /// Materialize the draft from the committed copy. An unset committed
    /// selection becomes everything-selected, which is what it renders as.
    fn reset_draft(&mut self) {
        self.kpis = match self.committed.kpi_selection() {
            Selection::Unset => catalog::all_kpi_keys().map(str::to_owned).collect(),
            Selection::Explicit(keys) => keys,
        };
        self.sections = match self.committed.section_selection() {
            Selection::Unset => catalog::SECTIONS.iter().map(|s| s.key.to_owned()).collect(),
            Selection::Explicit(keys) => keys,
        };
        self.charts = match self.committed.chart_selection() {
            Selection::Unset => catalog::all_chart_keys().map(str::to_owned).collect(),
            Selection::Explicit(keys) => keys,
        };
    }

    pub fn committed(&self) -> &DashboardConfig {
        &self.committed
    }

    /// Replace the whole draft with externally edited sets, deduplicating
    /// and ordering them in the process.
    pub fn replace_draft(&mut self, kpis: Vec<String>, sections: Vec<String>, charts: Vec<String>) {
        self.kpis = kpis.into_iter().collect();
        self.sections = sections.into_iter().collect();
        self.charts = charts.into_iter().collect();
    }

    pub fn section_kpi_state(&self, section_key: &str) -> ToggleState {
        match catalog::section(section_key) {
            Some(section) => Self::toggle_state(section.kpis, &self.kpis),
            None => ToggleState::None,
        }
    }

    pub fn section_chart_state(&self, section_key: &str) -> ToggleState {
        match catalog::section(section_key) {
            Some(section) => Self::toggle_state(section.charts, &self.charts),
            None => ToggleState::None,
        }
    }

    fn toggle_state(owned: &'static [&'static str], selected: &BTreeSet<String>) -> ToggleState {
        let picked = owned.iter().filter(|k| selected.contains(**k)).count();
        if picked == 0 {
            ToggleState::None
        } else if picked == owned.len() {
            ToggleState::All
        } else {
            ToggleState::Partial
        }
    }

    /// Visibility of the draft as it would render, for live preview.
    pub fn draft_view(&self) -> VisibilityView {
        VisibilityView {
            kpis: Selection::Explicit(self.kpis.clone()),
            sections: Selection::Explicit(self.sections.clone()),
            charts: Selection::Explicit(self.charts.clone()),
        }
    }

    /// The draft sets exactly as they should be persisted, empty or not.
    pub fn save_payload(&self) -> (Vec<String>, Vec<String>, Vec<String>) {
        (
            self.kpis.iter().cloned().collect(),
            self.sections.iter().cloned().collect(),
            self.charts.iter().cloned().collect(),
        )
    }

    /// Record a successful save as the new committed copy.
    pub fn mark_saved(&mut self, saved: DashboardConfig) {
        self.committed = saved;
        self.reset_draft();
    }
}

// Single-step draft mutations for the editor UI. The HTTP surface saves
// whole drafts through `replace_draft`, so no handler calls these directly.
#[allow(dead_code)]
impl VisibilityEditor {
    pub fn toggle_kpi(&mut self, key: &str) {
        if !self.kpis.remove(key) {
            self.kpis.insert(key.to_owned());
        }
    }

    pub fn toggle_chart(&mut self, key: &str) {
        if !self.charts.remove(key) {
            self.charts.insert(key.to_owned());
        }
    }

    /// Select or deselect every KPI a section owns.
    pub fn set_section_kpis(&mut self, section_key: &str, selected: bool) {
        if let Some(section) = catalog::section(section_key) {
            for key in section.kpis {
                if selected {
                    self.kpis.insert((*key).to_owned());
                } else {
                    self.kpis.remove(*key);
                }
            }
        }
    }

    /// Select or deselect every chart a section owns.
    pub fn set_section_charts(&mut self, section_key: &str, selected: bool) {
        if let Some(section) = catalog::section(section_key) {
            for key in section.charts {
                if selected {
                    self.charts.insert((*key).to_owned());
                } else {
                    self.charts.remove(*key);
                }
            }
        }
    }

    /// Toggle a whole section: one draft mutation that flips the section
    /// together with every KPI and chart it owns.
    pub fn toggle_section(&mut self, section_key: &str) {
        if catalog::section(section_key).is_none() {
            return;
        }
        let selected = !self.sections.contains(section_key);
        if selected {
            self.sections.insert(section_key.to_owned());
        } else {
            self.sections.remove(section_key);
        }
        self.set_section_kpis(section_key, selected);
        self.set_section_charts(section_key, selected);
    }

    /// Discard draft edits and rebuild the draft from the committed copy.
    pub fn cancel(&mut self) {
        self.reset_draft();
    }
}
