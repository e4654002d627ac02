//! The rewrite pass.
//!
//! Every call or element bound to a construct is resolved exactly once, inner
//! sites first, and replaced in place by whichever subtree its rule picked.

use std::mem;

use swc_core::{
    common::{Span, Spanned, SyntaxContext, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith},
    },
};
use tracing::debug;

use crate::classify::{classify, take_case};
use crate::collect::{collect_bindings, strip_macro_imports, Bindings, ImportSources};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::markup;
use crate::rules::{self, Construct, Decision, Input, Pick, Position};

/// A site that could not be resolved. The site is left as written.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteError {
    pub span: Span,
    pub error: Error,
}

pub struct ConditionalTransform {
    ctx: Context,
    sources: ImportSources,
    bindings: Bindings,
    failures: Vec<SiteError>,
    rewritten: usize,
}

enum Resolved {
    Node(Box<Expr>),
    Removed,
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Replaced,
    /// Statement position only: the caller drops the statement.
    Removed,
    Failed,
}

impl ConditionalTransform {
    pub fn new(ctx: Context, sources: ImportSources) -> Self {
        Self {
            ctx,
            sources,
            bindings: Default::default(),
            failures: vec![],
            rewritten: 0,
        }
    }

    pub fn failures(&self) -> &[SiteError] {
        &self.failures
    }

    pub fn take_failures(&mut self) -> Vec<SiteError> {
        mem::take(&mut self.failures)
    }

    /// Number of sites resolved so far.
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    // ---------- site detection ----------

    fn element_construct(&self, el: &JSXElement) -> Option<Construct> {
        match &el.opening.name {
            JSXElementName::Ident(id) => self.bindings.get(&id.to_id()).copied(),
            _ => None,
        }
    }

    fn construct_at(&self, expr: &Expr) -> Option<Construct> {
        match expr {
            Expr::Call(CallExpr {
                callee: Callee::Expr(callee),
                ..
            }) => match &**callee {
                Expr::Ident(id) => self.bindings.get(&id.to_id()).copied(),
                _ => None,
            },
            Expr::JSXElement(el) => self.element_construct(el),
            _ => None,
        }
    }

    fn fail(&mut self, span: Span, error: Error) {
        debug!(%error, "site left unresolved");
        self.failures.push(SiteError { span, error });
    }

    // ---------- resolution ----------

    fn rewrite_expr(&mut self, construct: Construct, expr: &mut Expr, position: Position) -> Outcome {
        let span = expr.span();
        let resolved = match expr {
            Expr::Call(call) => self.decide_call(construct, call, position),
            Expr::JSXElement(el) => self.decide_element(construct, el, position),
            _ => return Outcome::Failed,
        };
        match resolved {
            Err(error) => {
                self.fail(span, error);
                Outcome::Failed
            }
            Ok(Resolved::Node(node)) => {
                self.rewritten += 1;
                *expr = *node;
                Outcome::Replaced
            }
            Ok(Resolved::Removed) => {
                self.rewritten += 1;
                if position == Position::Statement {
                    return Outcome::Removed;
                }
                *expr = *placeholder(construct);
                Outcome::Replaced
            }
        }
    }

    fn decide_call(&mut self, construct: Construct, call: &mut CallExpr, position: Position) -> Result<Resolved> {
        call.args.visit_mut_with(self);
        if call.args.iter().any(|a| a.spread.is_some()) {
            return Err(Error::Spread {
                construct: construct.name(),
                what: "arguments",
            });
        }
        let classes = call.args.iter().map(|a| classify(&a.expr)).collect();
        let decision = rules::decide(construct, &Input::Args(classes), position, &self.ctx)?;
        debug!(construct = construct.name(), ?decision, "resolved call");

        let slots = mem::take(&mut call.args).into_iter().map(|a| a.expr).collect();
        resolve(construct, decision, slots)
    }

    fn decide_element(&mut self, construct: Construct, el: &mut JSXElement, position: Position) -> Result<Resolved> {
        el.opening.attrs.visit_mut_with(self);
        el.children.visit_mut_with(self);
        if !construct.is_markup() {
            return Err(Error::NotMarkup {
                construct: construct.name(),
            });
        }
        let (slots, props) = markup::read_element(construct, el)?;
        let decision = rules::decide(construct, &Input::Markup(props), position, &self.ctx)?;
        debug!(construct = construct.name(), ?decision, "resolved element");

        resolve(construct, decision, slots)
    }
}

fn resolve(construct: Construct, decision: Decision, slots: Vec<Box<Expr>>) -> Result<Resolved> {
    let mut slots: Vec<Option<Box<Expr>>> = slots.into_iter().map(Some).collect();
    let mut take = |pick: Pick| {
        let node = match pick {
            Pick::Arg(i) => slots.get_mut(i).and_then(Option::take),
            Pick::Case { arg, case } => slots
                .get_mut(arg)
                .and_then(Option::take)
                .and_then(|cases| take_case(cases, case)),
        };
        node.ok_or(Error::MissingBranch {
            construct: construct.name(),
        })
    };
    Ok(match decision {
        Decision::Replace(pick) => Resolved::Node(take(pick)?),
        Decision::WrapAndCall(pick) => Resolved::Node(invoke(take(pick)?)),
        Decision::Remove => Resolved::Removed,
        Decision::EmptyComponent => Resolved::Node(empty_component()),
    })
}

// ---------- node builders ----------

/// `(f)()`
fn invoke(f: Box<Expr>) -> Box<Expr> {
    let callee = if matches!(*f, Expr::Paren(_)) {
        f
    } else {
        Box::new(Expr::Paren(ParenExpr {
            span: DUMMY_SP,
            expr: f,
        }))
    };
    Box::new(Expr::Call(CallExpr {
        span: DUMMY_SP,
        callee: Callee::Expr(callee),
        args: vec![],
        type_args: None,
        ctxt: SyntaxContext::empty(),
    }))
}

/// `() => null`
fn empty_component() -> Box<Expr> {
    Box::new(Expr::Arrow(ArrowExpr {
        span: DUMMY_SP,
        params: vec![],
        body: Box::new(BlockStmtOrExpr::Expr(null())),
        is_async: false,
        is_generator: false,
        type_params: None,
        return_type: None,
        ctxt: SyntaxContext::empty(),
    }))
}

fn null() -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP })))
}

/// What a removed site leaves behind where an expression is still required.
fn placeholder(construct: Construct) -> Box<Expr> {
    if construct.is_markup() {
        return null();
    }
    // void 0
    Box::new(Expr::Unary(UnaryExpr {
        span: DUMMY_SP,
        op: UnaryOp::Void,
        arg: Box::new(Expr::Lit(Lit::Num(Number {
            span: DUMMY_SP,
            value: 0.0,
            raw: None,
        }))),
    }))
}

/// `const x = (site)` binds the site just like `const x = site`.
fn unparen(expr: &Expr) -> &Expr {
    match expr {
        Expr::Paren(p) => unparen(&p.expr),
        _ => expr,
    }
}

fn unparen_mut(expr: &mut Expr) -> &mut Expr {
    match expr {
        Expr::Paren(p) => unparen_mut(&mut p.expr),
        _ => expr,
    }
}

fn removed_stmt() -> Stmt {
    Stmt::Empty(EmptyStmt { span: DUMMY_SP })
}

fn is_removed(stmt: &Stmt) -> bool {
    matches!(stmt, Stmt::Empty(e) if e.span.is_dummy())
}

// -----------------------------------------------------------------------------
// Traversal
// -----------------------------------------------------------------------------

impl VisitMut for ConditionalTransform {
    fn visit_mut_module(&mut self, m: &mut Module) {
        self.bindings = collect_bindings(m, &self.sources);
        if self.bindings.is_empty() {
            return;
        }
        strip_macro_imports(m, &self.bindings);
        m.visit_mut_children_with(self);
        debug!(
            rewritten = self.rewritten,
            failed = self.failures.len(),
            "conditional constructs resolved"
        );
    }

    fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
        items.visit_mut_children_with(self);
        items.retain(|item| !matches!(item, ModuleItem::Stmt(s) if is_removed(s)));
    }

    fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
        stmts.visit_mut_children_with(self);
        stmts.retain(|s| !is_removed(s));
    }

    fn visit_mut_stmt(&mut self, stmt: &mut Stmt) {
        if let Stmt::Expr(ExprStmt { expr, .. }) = stmt {
            if let Some(construct) = self.construct_at(expr) {
                if self.rewrite_expr(construct, expr, Position::Statement) == Outcome::Removed {
                    *stmt = removed_stmt();
                }
                return;
            }
        }
        stmt.visit_mut_children_with(self);
    }

    fn visit_mut_var_declarator(&mut self, d: &mut VarDeclarator) {
        let construct = d.init.as_deref().and_then(|init| self.construct_at(unparen(init)));
        match (construct, d.init.as_deref_mut()) {
            (Some(construct), Some(init)) => {
                d.name.visit_mut_with(self);
                self.rewrite_expr(construct, unparen_mut(init), Position::VarInit);
            }
            _ => d.visit_mut_children_with(self),
        }
    }

    fn visit_mut_expr(&mut self, expr: &mut Expr) {
        match self.construct_at(expr) {
            Some(construct) => {
                self.rewrite_expr(construct, expr, Position::Expression);
            }
            None => expr.visit_mut_children_with(self),
        }
    }

    fn visit_mut_jsx_element_childs(&mut self, children: &mut Vec<JSXElementChild>) {
        let mut out = Vec::with_capacity(children.len());
        for mut child in children.drain(..) {
            let construct = match &child {
                JSXElementChild::JSXElement(el) => self.element_construct(el),
                _ => None,
            };
            let (Some(construct), JSXElementChild::JSXElement(el)) = (construct, &mut child) else {
                child.visit_mut_with(self);
                out.push(child);
                continue;
            };
            let span = el.span;
            match self.decide_element(construct, el, Position::JsxChild) {
                Ok(Resolved::Node(node)) => {
                    self.rewritten += 1;
                    out.push(markup::into_child(node));
                }
                Ok(Resolved::Removed) => self.rewritten += 1,
                Err(error) => {
                    self.fail(span, error);
                    out.push(child);
                }
            }
        }
        *children = out;
    }

    fn visit_mut_jsx_attr_value(&mut self, value: &mut JSXAttrValue) {
        // `attr=<DevOnly />` is resolved like `attr={<DevOnly />}`
        let is_site = matches!(value, JSXAttrValue::JSXElement(el) if self.element_construct(el).is_some());
        if is_site {
            let empty = JSXAttrValue::JSXExprContainer(JSXExprContainer {
                span: DUMMY_SP,
                expr: JSXExpr::JSXEmptyExpr(JSXEmptyExpr { span: DUMMY_SP }),
            });
            if let JSXAttrValue::JSXElement(el) = mem::replace(value, empty) {
                *value = JSXAttrValue::JSXExprContainer(JSXExprContainer {
                    span: el.span,
                    expr: JSXExpr::Expr(Box::new(Expr::JSXElement(el))),
                });
            }
        }
        value.visit_mut_children_with(self);
    }

    fn visit_mut_ident(&mut self, ident: &mut Ident) {
        if let Some(construct) = self.bindings.get(&ident.to_id()).copied() {
            self.fail(
                ident.span,
                Error::StrayReference {
                    construct: construct.name(),
                },
            );
        }
    }
}
