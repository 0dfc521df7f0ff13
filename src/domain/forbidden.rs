//! Forbidden identifiers.
//!
//! Kuri has no loops, conditionals, user functions or host access. Names from
//! those vocabularies are rejected during semantic analysis with a message
//! specific to the category they come from.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenCategory {
    Loop,
    Conditional,
    FunctionDefinition,
    Async,
    ObjectOriented,
    Module,
    Dangerous,
    HostGlobal,
}

const LOOP: &[&str] = &[
    "for", "while", "do", "loop", "until", "foreach", "repeat", "break", "continue",
];
const CONDITIONAL: &[&str] = &["if", "else", "elif", "elseif", "switch", "case", "match", "when"];
const FUNCTION_DEFINITION: &[&str] = &[
    "function", "func", "fn", "def", "lambda", "return", "yield",
];
const ASYNC: &[&str] = &[
    "async",
    "await",
    "promise",
    "settimeout",
    "setinterval",
    "thread",
    "spawn",
];
const OBJECT_ORIENTED: &[&str] = &[
    "class",
    "new",
    "this",
    "self",
    "super",
    "extends",
    "prototype",
    "constructor",
    "interface",
];
const MODULE: &[&str] = &["import", "export", "require", "module", "include", "package"];
const DANGEROUS: &[&str] = &[
    "eval",
    "exec",
    "system",
    "fetch",
    "xmlhttprequest",
    "websocket",
    "shell",
    "syscall",
    "delete",
];
const HOST_GLOBAL: &[&str] = &[
    "window",
    "document",
    "global",
    "globalthis",
    "console",
    "localstorage",
    "sessionstorage",
    "navigator",
    "process",
];

impl ForbiddenCategory {
    pub const ALL: [ForbiddenCategory; 8] = [
        ForbiddenCategory::Loop,
        ForbiddenCategory::Conditional,
        ForbiddenCategory::FunctionDefinition,
        ForbiddenCategory::Async,
        ForbiddenCategory::ObjectOriented,
        ForbiddenCategory::Module,
        ForbiddenCategory::Dangerous,
        ForbiddenCategory::HostGlobal,
    ];

    pub fn words(&self) -> &'static [&'static str] {
        match self {
            ForbiddenCategory::Loop => LOOP,
            ForbiddenCategory::Conditional => CONDITIONAL,
            ForbiddenCategory::FunctionDefinition => FUNCTION_DEFINITION,
            ForbiddenCategory::Async => ASYNC,
            ForbiddenCategory::ObjectOriented => OBJECT_ORIENTED,
            ForbiddenCategory::Module => MODULE,
            ForbiddenCategory::Dangerous => DANGEROUS,
            ForbiddenCategory::HostGlobal => HOST_GLOBAL,
        }
    }

    pub fn message(&self, word: &str) -> String {
        match self {
            ForbiddenCategory::Loop => {
                format!("'{word}' is a loop keyword; Kuri has no loops")
            }
            ForbiddenCategory::Conditional => {
                format!("'{word}' is a conditional keyword; Kuri v1 has no conditionals")
            }
            ForbiddenCategory::FunctionDefinition => {
                format!("'{word}' defines functions; Kuri has no user-defined functions")
            }
            ForbiddenCategory::Async => {
                format!("'{word}' is an asynchronous construct; scripts run synchronously")
            }
            ForbiddenCategory::ObjectOriented => {
                format!("'{word}' is an object-oriented keyword; Kuri has no objects")
            }
            ForbiddenCategory::Module => {
                format!("'{word}' loads modules; scripts cannot import code")
            }
            ForbiddenCategory::Dangerous => {
                format!("'{word}' is not allowed in a sandboxed script")
            }
            ForbiddenCategory::HostGlobal => {
                format!("'{word}' refers to the host environment, which scripts cannot access")
            }
        }
    }

    pub fn hint(&self) -> &'static str {
        match self {
            ForbiddenCategory::Loop => {
                "indicator functions already operate on the whole series; no iteration is needed"
            }
            ForbiddenCategory::Conditional => {
                "use comparisons with 'and'/'or' to build a boolean series instead"
            }
            ForbiddenCategory::FunctionDefinition => {
                "assign the expression to a variable and reuse the variable"
            }
            ForbiddenCategory::Async => "remove the construct; every statement runs in order",
            ForbiddenCategory::ObjectOriented => "use plain variables holding series or numbers",
            ForbiddenCategory::Module => "only the built-in functions are available",
            ForbiddenCategory::Dangerous => "only the built-in functions are available",
            ForbiddenCategory::HostGlobal => "scripts can only read open, high, low, close and volume",
        }
    }
}

/// Category of `name`, if forbidden. Matching is case-insensitive and looks at
/// the first segment of a dotted name (`window.alert` -> `window`).
pub fn classify(name: &str) -> Option<ForbiddenCategory> {
    let head = name.split('.').next().unwrap_or(name).to_lowercase();
    ForbiddenCategory::ALL
        .into_iter()
        .find(|c| c.words().contains(&head.as_str()))
}
