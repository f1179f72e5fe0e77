//! Decision variable handles and metadata.

use std::fmt;

/// Opaque handle to a variable created by a [`ModelBuilder`](super::ModelBuilder).
///
/// Handles are dense indices in creation order, so a backend can store
/// per-variable data in a plain `Vec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub(crate) usize);

impl VarId {
    /// Position of the variable in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Integrality class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// General integer within `[lb, ub]`.
    Integer,
    /// 0/1 indicator.
    Boolean,
}

/// A variable as recorded in a [`LinearModel`](super::LinearModel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    /// Variable name (used for LP export and diagnostics).
    pub name: String,
    /// Integer or boolean.
    pub kind: VarKind,
    /// Lower bound.
    pub lb: i64,
    /// Upper bound.
    pub ub: i64,
}

impl VarInfo {
    /// Creates an integer variable with the given bounds.
    pub fn integer(name: impl Into<String>, lb: i64, ub: i64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Integer,
            lb,
            ub,
        }
    }

    /// Creates a boolean variable.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Boolean,
            lb: 0,
            ub: 1,
        }
    }

    /// Whether the domain holds a single value.
    pub fn is_fixed(&self) -> bool {
        self.lb == self.ub
    }

    /// Domain size (ub - lb + 1).
    pub fn domain_size(&self) -> i64 {
        self.ub - self.lb + 1
    }
}
