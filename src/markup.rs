//! Reading markup constructs written as JSX elements.
//!
//! Attributes and children are copied out into argument slots so the element
//! itself stays untouched until a decision has been made.

use swc_core::{
    common::DUMMY_SP,
    ecma::ast::*,
};
use tracing::trace;

use crate::classify::classify;
use crate::error::{Error, Result};
use crate::rules::{Construct, MarkupProps, Pick};

/// Slots referenced by the returned props, plus the props themselves.
pub fn read_element(construct: Construct, el: &JSXElement) -> Result<(Vec<Box<Expr>>, MarkupProps)> {
    let mut slots = Vec::new();
    let mut props = MarkupProps::default();
    let mut children_attr = None;

    for attr in &el.opening.attrs {
        let JSXAttrOrSpread::JSXAttr(attr) = attr else {
            return Err(Error::Spread {
                construct: construct.name(),
                what: "attributes",
            });
        };
        let JSXAttrName::Ident(name) = &attr.name else {
            continue;
        };
        let value = attr.value.as_ref();
        match &*name.sym {
            "isDev" => props.is_dev = flag(construct, "isDev", value)?,
            "isProd" => props.is_prod = flag(construct, "isProd", value)?,
            "is" => props.is = Some(names(construct, "is", value)?),
            "feature" => props.feature = Some(names(construct, "feature", value)?),
            "fallback" => props.fallback = value.and_then(attr_expr).map(|e| push(&mut slots, e)),
            "children" => children_attr = value.and_then(attr_expr),
            other => trace!(construct = construct.name(), attr = other, "ignoring attribute"),
        }
    }

    props.children = children_expr(&el.children)
        .or(children_attr)
        .map(|e| push(&mut slots, e));
    Ok((slots, props))
}

fn push(slots: &mut Vec<Box<Expr>>, expr: Box<Expr>) -> Pick {
    slots.push(expr);
    Pick::Arg(slots.len() - 1)
}

/// Bare attribute means `true`.
fn flag(construct: Construct, attr: &str, value: Option<&JSXAttrValue>) -> Result<bool> {
    let Some(value) = value else {
        return Ok(true);
    };
    match attr_expr(value).as_deref() {
        Some(Expr::Lit(Lit::Bool(b))) => Ok(b.value),
        other => Err(Error::Unresolvable {
            construct: construct.name(),
            slot: format!("`{attr}`"),
            expected: "a boolean literal",
            found: other.map_or("an empty expression", |e| classify(e).describe()),
        }),
    }
}

fn names(construct: Construct, attr: &str, value: Option<&JSXAttrValue>) -> Result<Vec<String>> {
    let class = value.and_then(attr_expr).map(|e| classify(&e));
    class
        .as_ref()
        .and_then(|c| c.names())
        .ok_or_else(|| Error::Unresolvable {
            construct: construct.name(),
            slot: format!("`{attr}`"),
            expected: "a string literal or an array of string literals",
            found: class.as_ref().map_or("nothing", |c| c.describe()),
        })
}

fn attr_expr(value: &JSXAttrValue) -> Option<Box<Expr>> {
    match value {
        JSXAttrValue::Lit(lit) => Some(Box::new(Expr::Lit(lit.clone()))),
        JSXAttrValue::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(e),
            ..
        }) => Some(e.clone()),
        JSXAttrValue::JSXExprContainer(_) => None,
        JSXAttrValue::JSXElement(el) => Some(Box::new(Expr::JSXElement(el.clone()))),
        JSXAttrValue::JSXFragment(f) => Some(Box::new(Expr::JSXFragment(f.clone()))),
    }
}

fn is_blank(child: &JSXElementChild) -> bool {
    match child {
        JSXElementChild::JSXText(t) => t.value.trim().is_empty(),
        JSXElementChild::JSXExprContainer(c) => matches!(c.expr, JSXExpr::JSXEmptyExpr(_)),
        _ => false,
    }
}

/// A single child is used as-is; several are wrapped in a fragment.
fn children_expr(children: &[JSXElementChild]) -> Option<Box<Expr>> {
    let meaningful: Vec<&JSXElementChild> = children.iter().filter(|c| !is_blank(c)).collect();
    match meaningful.as_slice() {
        [] => None,
        [JSXElementChild::JSXElement(el)] => Some(Box::new(Expr::JSXElement(el.clone()))),
        [JSXElementChild::JSXFragment(f)] => Some(Box::new(Expr::JSXFragment(f.clone()))),
        [JSXElementChild::JSXExprContainer(JSXExprContainer {
            expr: JSXExpr::Expr(e),
            ..
        })] => Some(e.clone()),
        _ => Some(Box::new(Expr::JSXFragment(JSXFragment {
            span: DUMMY_SP,
            opening: JSXOpeningFragment { span: DUMMY_SP },
            children: children.to_vec(),
            closing: JSXClosingFragment { span: DUMMY_SP },
        }))),
    }
}

/// Converts a surviving expression back into JSX child position.
pub fn into_child(expr: Box<Expr>) -> JSXElementChild {
    match *expr {
        Expr::JSXElement(el) => JSXElementChild::JSXElement(el),
        Expr::JSXFragment(f) => JSXElementChild::JSXFragment(f),
        other => JSXElementChild::JSXExprContainer(JSXExprContainer {
            span: DUMMY_SP,
            expr: JSXExpr::Expr(Box::new(other)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::{sync::Lrc, FileName, SourceMap};
    use swc_core::ecma::parser::{parse_file_as_expr, EsSyntax, Syntax};

    fn element(src: &str) -> Box<JSXElement> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Anon.into(), src.to_string());
        let expr = parse_file_as_expr(
            &fm,
            Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
            EsVersion::latest(),
            None,
            &mut vec![],
        )
        .expect("test source should parse");
        match *expr {
            Expr::JSXElement(el) => el,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn reads_keyword_attributes() {
        let el = element(r#"<When isDev is="qa" feature={["A", "B"]} fallback={<Off />}><On /></When>"#);
        let (slots, props) = read_element(Construct::WhenElement, &el).unwrap();
        assert_eq!(slots.len(), 2);
        assert_eq!(
            props,
            MarkupProps {
                is_dev: true,
                is_prod: false,
                is: Some(vec!["qa".into()]),
                feature: Some(vec!["A".into(), "B".into()]),
                children: Some(Pick::Arg(1)),
                fallback: Some(Pick::Arg(0)),
            }
        );
        assert!(matches!(*slots[1], Expr::JSXElement(_)));
    }

    #[test]
    fn explicit_boolean_attributes() {
        let el = element("<When isProd={false} isDev={true}><On /></When>");
        let (_, props) = read_element(Construct::WhenElement, &el).unwrap();
        assert!(props.is_dev);
        assert!(!props.is_prod);
    }

    #[test]
    fn several_children_become_a_fragment() {
        let el = element("<DevOnly>\n  <A />\n  text\n</DevOnly>");
        let (slots, props) = read_element(Construct::DevOnly, &el).unwrap();
        assert_eq!(props.children, Some(Pick::Arg(0)));
        assert!(matches!(*slots[0], Expr::JSXFragment(_)));
    }

    #[test]
    fn whitespace_children_are_ignored() {
        let el = element("<DevOnly fallback=\"none\">\n  {/* nothing */}\n</DevOnly>");
        let (slots, props) = read_element(Construct::DevOnly, &el).unwrap();
        assert_eq!(props.children, None);
        assert_eq!(props.fallback, Some(Pick::Arg(0)));
        assert!(matches!(*slots[0], Expr::Lit(Lit::Str(_))));
    }

    #[test]
    fn children_attribute_is_used_without_element_children() {
        let el = element("<ProdOnly children={<A />} />");
        let (_, props) = read_element(Construct::ProdOnly, &el).unwrap();
        assert_eq!(props.children, Some(Pick::Arg(0)));
    }

    #[test]
    fn dynamic_guards_are_rejected() {
        let el = element("<When is={env}><A /></When>");
        assert!(matches!(
            read_element(Construct::WhenElement, &el),
            Err(Error::Unresolvable { .. })
        ));

        let el = element("<When isDev={flag}><A /></When>");
        assert!(read_element(Construct::WhenElement, &el).is_err());

        let el = element("<When {...props}><A /></When>");
        assert_eq!(
            read_element(Construct::WhenElement, &el).unwrap_err(),
            Error::Spread {
                construct: "When",
                what: "attributes"
            }
        );
    }

    #[test]
    fn surviving_expressions_become_containers() {
        let child = into_child(Box::new(Expr::Lit(Lit::Null(Null { span: DUMMY_SP }))));
        assert!(matches!(child, JSXElementChild::JSXExprContainer(_)));
    }
}
