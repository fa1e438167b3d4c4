//! normalisation"): every supported language's CST is mapped onto this
//! ~30-member set so detectors that only care about canonical kinds work
//! unmodified across languages. Detectors that need raw CST detail may
//! still subscribe to a language-specific `raw_kind` string.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GastKind {
    Function,
    Method,
    Class,
    Interface,
    Import,
    Export,
    Call,
    Route,
    TryCatch,
    Loop,
    Conditional,
    Assignment,
    Decorator,
    StringLiteral,
    NumberLiteral,
    Parameter,
    ReturnStatement,
    VariableDeclaration,
    FieldAccess,
    Module,
    Comment,
    Other,
}

impl GastKind {
    pub const ALL: &'static [GastKind] = &[
        GastKind::Function,
        GastKind::Method,
        GastKind::Class,
        GastKind::Interface,
        GastKind::Import,
        GastKind::Export,
        GastKind::Call,
        GastKind::Route,
        GastKind::TryCatch,
        GastKind::Loop,
        GastKind::Conditional,
        GastKind::Assignment,
        GastKind::Decorator,
        GastKind::StringLiteral,
        GastKind::NumberLiteral,
        GastKind::Parameter,
        GastKind::ReturnStatement,
        GastKind::VariableDeclaration,
        GastKind::FieldAccess,
        GastKind::Module,
        GastKind::Comment,
        GastKind::Other,
    ];
}
