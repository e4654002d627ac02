//! Shape classification of construct arguments.
//!
//! This is the only place that looks at the raw shape of an argument. Rules
//! receive a [`Classification`] per argument and never inspect nodes again.

use swc_core::ecma::ast::*;

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// Function or arrow function literal.
    Function,
    /// Numeric or bigint literal.
    Scalar,
    Str(String),
    /// Array literal; the names are present when every element is a string
    /// literal.
    Array(Option<Vec<String>>),
    Bool(bool),
    /// JSX element or fragment.
    Markup,
    /// Object literal with static keys, in source order.
    Cases(Vec<String>),
    Other,
}

impl Classification {
    /// Literal values substituted as-is (string, number or boolean).
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Classification::Scalar | Classification::Str(_) | Classification::Bool(_)
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Classification::Function)
    }

    /// A string literal normalized to a one-element list, or an array of strings.
    pub fn names(&self) -> Option<Vec<String>> {
        match self {
            Classification::Str(s) => Some(vec![s.clone()]),
            Classification::Array(items) => items.clone(),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Classification::Function => "a function",
            Classification::Scalar => "a literal value",
            Classification::Str(_) => "a string literal",
            Classification::Array(Some(_)) => "an array of strings",
            Classification::Array(None) => "an array with non-literal elements",
            Classification::Bool(_) => "a boolean literal",
            Classification::Markup => "a JSX element",
            Classification::Cases(_) => "an object literal",
            Classification::Other => "an expression",
        }
    }
}

pub fn classify(expr: &Expr) -> Classification {
    match expr {
        Expr::Paren(p) => classify(&p.expr),
        Expr::Fn(_) | Expr::Arrow(_) => Classification::Function,
        Expr::Lit(Lit::Str(s)) => Classification::Str(s.value.to_string()),
        Expr::Lit(Lit::Bool(b)) => Classification::Bool(b.value),
        Expr::Lit(Lit::Num(_)) | Expr::Lit(Lit::BigInt(_)) => Classification::Scalar,
        Expr::Unary(UnaryExpr {
            op: UnaryOp::Minus,
            arg,
            ..
        }) if matches!(&**arg, Expr::Lit(Lit::Num(_))) => Classification::Scalar,
        Expr::Array(a) => Classification::Array(string_elements(a)),
        Expr::JSXElement(_) | Expr::JSXFragment(_) => Classification::Markup,
        Expr::Object(o) => case_keys(o)
            .map(Classification::Cases)
            .unwrap_or(Classification::Other),
        _ => Classification::Other,
    }
}

fn string_elements(a: &ArrayLit) -> Option<Vec<String>> {
    a.elems
        .iter()
        .map(|el| match el {
            Some(ExprOrSpread { spread: None, expr }) => match &**expr {
                Expr::Lit(Lit::Str(s)) => Some(s.value.to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect()
}

fn case_keys(o: &ObjectLit) -> Option<Vec<String>> {
    o.props
        .iter()
        .map(|prop| match prop {
            PropOrSpread::Prop(p) => match &**p {
                Prop::KeyValue(kv) => prop_key(&kv.key),
                Prop::Shorthand(id) => Some(id.sym.to_string()),
                _ => None,
            },
            PropOrSpread::Spread(_) => None,
        })
        .collect()
}

fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(i) => Some(i.sym.to_string()),
        PropName::Str(s) => Some(s.value.to_string()),
        // `{ 1: x }` is keyed "1", not "1.0"
        PropName::Num(n) if n.value.fract() == 0.0 && n.value.is_finite() => {
            Some(format!("{}", n.value as i64))
        }
        PropName::Num(n) => Some(n.value.to_string()),
        _ => None,
    }
}

/// Takes the value of the `index`-th case out of an object literal that
/// classified as [`Classification::Cases`].
pub fn take_case(expr: Box<Expr>, index: usize) -> Option<Box<Expr>> {
    match *expr {
        Expr::Paren(p) => take_case(p.expr, index),
        Expr::Object(o) => match o.props.into_iter().nth(index)? {
            PropOrSpread::Prop(p) => match *p {
                Prop::KeyValue(kv) => Some(kv.value),
                Prop::Shorthand(id) => Some(Box::new(Expr::Ident(id))),
                _ => None,
            },
            PropOrSpread::Spread(_) => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::{sync::Lrc, FileName, SourceMap};
    use swc_core::ecma::parser::{parse_file_as_expr, EsSyntax, Syntax};

    fn expr(src: &str) -> Box<Expr> {
        let cm: Lrc<SourceMap> = Default::default();
        let fm = cm.new_source_file(FileName::Anon.into(), src.to_string());
        parse_file_as_expr(
            &fm,
            Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
            EsVersion::latest(),
            None,
            &mut vec![],
        )
        .expect("test source should parse")
    }

    #[test]
    fn functions() {
        assert_eq!(classify(&expr("() => 1")), Classification::Function);
        assert_eq!(classify(&expr("function () {}")), Classification::Function);
        assert_eq!(classify(&expr("(async () => {})")), Classification::Function);
    }

    #[test]
    fn literal_values() {
        assert_eq!(classify(&expr("'a'")), Classification::Str("a".into()));
        assert_eq!(classify(&expr("42")), Classification::Scalar);
        assert_eq!(classify(&expr("-1")), Classification::Scalar);
        assert_eq!(classify(&expr("false")), Classification::Bool(false));
        assert!(classify(&expr("true")).is_value());
        assert!(!classify(&expr("null")).is_value());
        assert!(!classify(&expr("foo")).is_value());
    }

    #[test]
    fn arrays_carry_names_only_when_static() {
        let names = classify(&expr("['qa', 'staging']"));
        assert_eq!(names, Classification::Array(Some(vec!["qa".into(), "staging".into()])));
        assert_eq!(names.names(), Some(vec!["qa".into(), "staging".into()]));
        assert_eq!(classify(&expr("[]")), Classification::Array(Some(vec![])));

        let dynamic = classify(&expr("['qa', env]"));
        assert_eq!(dynamic, Classification::Array(None));
        assert_eq!(dynamic.names(), None);
        assert_eq!(classify(&expr("[...envs]")), Classification::Array(None));
    }

    #[test]
    fn markup() {
        assert_eq!(classify(&expr("<X />")), Classification::Markup);
        assert_eq!(classify(&expr("<><X /></>")), Classification::Markup);
    }

    #[test]
    fn objects_keep_key_order() {
        assert_eq!(
            classify(&expr("({ staging: 1, 'production': 2, 3: x, qa })")),
            Classification::Cases(vec![
                "staging".into(),
                "production".into(),
                "3".into(),
                "qa".into()
            ])
        );
        assert_eq!(classify(&expr("({ [k]: 1 })")), Classification::Other);
        assert_eq!(classify(&expr("({ ...rest })")), Classification::Other);
    }

    #[test]
    fn names_normalize_singletons() {
        assert_eq!(
            Classification::Str("qa".into()).names(),
            Some(vec!["qa".to_string()])
        );
        assert_eq!(Classification::Scalar.names(), None);
    }

    #[test]
    fn take_case_returns_the_indexed_value() {
        let taken = take_case(expr("({ a: 1, b: 'two', c })"), 1).unwrap();
        assert_eq!(classify(&taken), Classification::Str("two".into()));

        let shorthand = take_case(expr("({ a: 1, c })"), 1).unwrap();
        assert!(matches!(*shorthand, Expr::Ident(ref id) if &*id.sym == "c"));

        assert!(take_case(expr("({ a: 1 })"), 3).is_none());
        assert!(take_case(expr("[1]"), 0).is_none());
    }
}
