//! Interned integer handles for every entity in the data model.
//!
//! All entities are identified by these handles rather than by string; the
//! strings themselves live once in an interner (`types::interning`) and are
//! referenced by handle everywhere else, including across the storage
//! boundary and inside the call graph.

use serde::{Deserialize, Serialize};

macro_rules! interned_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

interned_id!(FileId, "Interned path handle for a `File` entity.");
interned_id!(FunctionId, "Interned handle for a `Function` symbol.");
interned_id!(ClassId, "Interned handle for a `Class`/interface/struct/enum symbol.");
interned_id!(ModuleId, "Interned handle for a module/package identifier.");
interned_id!(PatternId, "Interned handle for a learned `Pattern`.");
interned_id!(DetectorId, "Stable identifier for a registered detector.");
interned_id!(SymbolId, "Interned handle for any `Symbol` in the call graph (Function | Class | Variable | Field | Route | Model).");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Function,
    Class,
    Variable,
    Field,
    Route,
    Model,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Variable => "variable",
            SymbolKind::Field => "field",
            SymbolKind::Route => "route",
            SymbolKind::Model => "model",
        }
    }
}
