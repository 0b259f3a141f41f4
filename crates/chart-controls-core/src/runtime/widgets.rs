// crates/chart-controls-core/src/runtime/widgets.rs
// ============================================================================
// Module: Datasource Widget State
// Description: Per-datasource disclosure and modal flags for datasource pickers.
// Purpose: Track UI toggles for each attached datasource by explicit index.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Each attached datasource owns one [`DatasourceWidgetState`]. Entries are
//! addressed by position, and position 0 is the first datasource whether the
//! chart has one datasource or many. Single mode tracks exactly one entry.
//! Toggling flips one flag of one entry.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Whether the picker manages one datasource or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetMode {
    /// One datasource.
    Single,
    /// Several datasources.
    Multiple,
}

/// Toggleable flag of a datasource widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetFlag {
    /// Column and metric details are expanded.
    ShowDetails,
    /// Actions menu is open.
    MenuExpanded,
    /// Edit modal is open.
    ShowEditModal,
    /// Change-datasource modal is open.
    ShowChangeModal,
}

/// UI flags of one datasource widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceWidgetState {
    /// Column and metric details are expanded.
    pub show_details: bool,
    /// Actions menu is open.
    pub menu_expanded: bool,
    /// Edit modal is open.
    pub show_edit_modal: bool,
    /// Change-datasource modal is open.
    pub show_change_modal: bool,
}

impl DatasourceWidgetState {
    /// Returns the current value of a flag.
    #[must_use]
    pub const fn get(&self, flag: WidgetFlag) -> bool {
        match flag {
            WidgetFlag::ShowDetails => self.show_details,
            WidgetFlag::MenuExpanded => self.menu_expanded,
            WidgetFlag::ShowEditModal => self.show_edit_modal,
            WidgetFlag::ShowChangeModal => self.show_change_modal,
        }
    }

    /// Flips a flag.
    const fn flip(&mut self, flag: WidgetFlag) {
        let slot = match flag {
            WidgetFlag::ShowDetails => &mut self.show_details,
            WidgetFlag::MenuExpanded => &mut self.menu_expanded,
            WidgetFlag::ShowEditModal => &mut self.show_edit_modal,
            WidgetFlag::ShowChangeModal => &mut self.show_change_modal,
        };
        *slot = !*slot;
    }
}

/// Errors raised by widget state updates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetStateError {
    /// Index does not address an attached datasource.
    #[error("datasource index {index} out of range for {len} datasources")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of attached datasources.
        len: usize,
    },
    /// Single mode tracks exactly one datasource.
    #[error("single datasource mode expects exactly one datasource, got {0}")]
    SingleModeCount(usize),
}

/// Widget states of every attached datasource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceWidgets {
    /// Picker mode.
    mode: WidgetMode,
    /// One entry per attached datasource.
    states: Vec<DatasourceWidgetState>,
}

impl DatasourceWidgets {
    /// Creates all-false state for `count` datasources.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetStateError::SingleModeCount`] when single mode is
    /// asked to track anything but one datasource.
    pub fn new(mode: WidgetMode, count: usize) -> Result<Self, WidgetStateError> {
        if mode == WidgetMode::Single && count != 1 {
            return Err(WidgetStateError::SingleModeCount(count));
        }
        Ok(Self {
            mode,
            states: vec![DatasourceWidgetState::default(); count],
        })
    }

    /// Returns the picker mode.
    #[must_use]
    pub const fn mode(&self) -> WidgetMode {
        self.mode
    }

    /// Returns the number of tracked datasources.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true when no datasource is tracked.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns the state of one datasource widget.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DatasourceWidgetState> {
        self.states.get(index)
    }

    /// Flips one flag of the widget at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetStateError::IndexOutOfRange`] when `index` is not an
    /// attached datasource.
    pub fn toggle(&mut self, index: usize, flag: WidgetFlag) -> Result<bool, WidgetStateError> {
        let len = self.states.len();
        let state = self.states.get_mut(index).ok_or(WidgetStateError::IndexOutOfRange {
            index,
            len,
        })?;
        state.flip(flag);
        Ok(state.get(flag))
    }
}
