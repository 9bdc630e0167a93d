use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use super::Func;
use crate::Expr;

/// Definition of an elementary function: evaluation and differentiation logic
#[derive(Clone)]
pub(crate) struct FunctionDefinition {
    /// Canonical name of the function (e.g., "sin", "ln")
    pub name: &'static str,

    /// Extra names the parser accepts
    pub aliases: &'static [&'static str],

    /// LaTeX command, e.g. `\sin`
    pub latex: &'static str,

    /// Numerical evaluation
    pub eval: fn(f64) -> f64,

    /// Real domain check, applied before `eval`
    pub domain: fn(f64) -> bool,

    /// Derivative with respect to the argument, evaluated at `u`.
    /// The chain-rule factor `u'` is applied by the caller.
    pub derivative: fn(&Expr) -> Expr,
}

struct Tables {
    definitions: Vec<FunctionDefinition>,
    by_name: FxHashMap<&'static str, Func>,
}

/// Static registry storing all function definitions
static REGISTRY: OnceLock<Tables> = OnceLock::new();

fn init_registry() -> Tables {
    let definitions: Vec<FunctionDefinition> = Func::ALL
        .iter()
        .map(|&f| super::definitions::definition(f))
        .collect();

    let mut by_name = FxHashMap::default();
    for (func, def) in Func::ALL.iter().zip(&definitions) {
        by_name.insert(def.name, *func);
        for alias in def.aliases {
            by_name.insert(*alias, *func);
        }
    }

    Tables {
        definitions,
        by_name,
    }
}

/// Central registry for getting function definitions
pub(crate) struct Registry;

impl Registry {
    /// Get a function by name - O(1) HashMap lookup
    pub(crate) fn lookup(name: &str) -> Option<Func> {
        REGISTRY.get_or_init(init_registry).by_name.get(name).copied()
    }

    pub(crate) fn definition(func: Func) -> &'static FunctionDefinition {
        // Built from Func::ALL, which lists variants in declaration order
        &REGISTRY.get_or_init(init_registry).definitions[func as usize]
    }

    /// Every accepted name and alias (used by the lexer's word splitter)
    pub(crate) fn names() -> impl Iterator<Item = &'static str> {
        REGISTRY.get_or_init(init_registry).by_name.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_names_and_aliases() {
        assert_eq!(Registry::lookup("sin"), Some(Func::Sin));
        assert_eq!(Registry::lookup("log"), Some(Func::Ln));
        assert_eq!(Registry::lookup("arctan"), Some(Func::Atan));
        assert_eq!(Registry::lookup("besselj"), None);
    }

    #[test]
    fn test_definitions_line_up_with_variants() {
        for func in Func::ALL {
            assert_eq!(Registry::lookup(func.name()), Some(func));
        }
    }
}
