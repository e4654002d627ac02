//! Discovery of construct bindings from macro imports.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use swc_core::ecma::{
    ast::*,
    visit::{Visit, VisitWith},
};
use tracing::trace;

use crate::rules::Construct;

/// `babel-plugin-macros` naming convention: `pkg/macro`, `pkg/react.macro.js`, ...
static MACRO_SOURCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[./]macro(\.c?js)?$").expect("macro source pattern"));

/// Module specifiers whose named imports are constructs.
#[derive(Debug, Clone, Default)]
pub struct ImportSources {
    extra: Vec<String>,
}

impl ImportSources {
    pub fn new(extra: Vec<String>) -> Self {
        Self { extra }
    }

    pub fn is_macro_source(&self, src: &str) -> bool {
        MACRO_SOURCE.is_match(src) || self.extra.iter().any(|s| s == src)
    }
}

pub type Bindings = HashMap<Id, Construct>;

/// Maps every local binding imported from a macro source to its construct.
pub fn collect_bindings(module: &Module, sources: &ImportSources) -> Bindings {
    let mut out = Bindings::new();
    module.visit_with(&mut ImportCollector {
        sources,
        out: &mut out,
    });
    out
}

struct ImportCollector<'a> {
    sources: &'a ImportSources,
    out: &'a mut Bindings,
}

impl Visit for ImportCollector<'_> {
    fn visit_import_decl(&mut self, n: &ImportDecl) {
        if n.type_only || !self.sources.is_macro_source(&n.src.value.to_string()) {
            return;
        }
        for s in &n.specifiers {
            if let ImportSpecifier::Named(named) = s {
                if named.is_type_only {
                    continue;
                }
                let imported = imported_name(named);
                if let Some(construct) = Construct::from_name(&imported) {
                    self.out.insert(named.local.to_id(), construct);
                }
            }
        }
    }
}

fn imported_name(named: &ImportNamedSpecifier) -> String {
    match &named.imported {
        Some(ModuleExportName::Ident(i)) => i.sym.to_string(),
        Some(ModuleExportName::Str(s)) => s.value.to_string(),
        None => named.local.sym.to_string(),
    }
}

/// Drops construct specifiers, and any import left empty by that.
pub fn strip_macro_imports(module: &mut Module, bindings: &Bindings) {
    module.body.retain_mut(|item| {
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item else {
            return true;
        };
        let before = import.specifiers.len();
        import.specifiers.retain(|s| match s {
            ImportSpecifier::Named(named) => !bindings.contains_key(&named.local.to_id()),
            _ => true,
        });
        if import.specifiers.len() == before {
            return true;
        }
        trace!(source = %import.src.value, "stripped construct import");
        !import.specifiers.is_empty()
    });
}
