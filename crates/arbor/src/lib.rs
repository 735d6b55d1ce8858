#![forbid(unsafe_code)]

//! Arbor public facade crate.
//!
//! Virtualized tree, list, table and tree-picker state built on
//! `arbor-core` (keys, flattening, expansion and selection) and
//! `arbor-virtual` (windowing and measurement). Rendering is left to the
//! caller: every component hands back a [`RenderFrame`] of row geometry plus
//! whatever the row callback produced.

use std::fmt;

pub mod frame;
pub mod list;
pub mod table;
pub mod tree;
pub mod tree_select;

// --- Core re-exports -------------------------------------------------------

pub use arbor_core::{
    DebounceAction, ExpandPolicy, FlatRow, Key, KeyError, KeyPath, KeySet, NodeText, Ownership,
    QueryDebouncer, RowFlags, SelectInfo, SelectionMode, TreeNode, filter_by_query, filter_tree,
    find_node, flatten, validate_unique_keys,
};

// --- Virtual re-exports ----------------------------------------------------

pub use arbor_virtual::{
    Align, CacheStats, ScriptedProbe, SizeProbe, VirtualItem, Virtualizer, VirtualizerOptions,
};

// --- Component re-exports --------------------------------------------------

pub use frame::{RenderFrame, RenderedRow};
pub use list::{ListConfig, VirtualList};
pub use table::{
    RowSelectionType, RowSize, SelectAll, SelectAllJob, SelectAllStep, TableConfig,
    TableRowState, VirtualTable,
};
pub use tree::{ExpandAction, RowClick, RowContext, Tree, TreeConfig};
pub use tree_select::{TreeSelect, TreeSelectConfig};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for arbor components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The dataset breaks key uniqueness.
    Key(KeyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Key(err) => Some(err),
        }
    }
}

impl From<KeyError> for Error {
    fn from(err: KeyError) -> Self {
        Self::Key(err)
    }
}

/// Standard result type for arbor APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Align, Error, ExpandAction, ExpandPolicy, Key, KeySet, ListConfig, RenderFrame, Result,
        RowContext, RowSelectionType, RowSize, SelectionMode, TableConfig, Tree, TreeConfig,
        TreeNode, TreeSelect, TreeSelectConfig, VirtualList, VirtualTable,
    };

    pub use crate::{core, virtualize};
}

pub use arbor_core as core;
pub use arbor_virtual as virtualize;
