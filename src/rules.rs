//! Per-construct decision rules.
//!
//! Rules are pure: they see argument classifications and the build context,
//! and return a [`Decision`] naming which argument survives. They never touch
//! the syntax tree; the transform applies the decision.

use crate::classify::Classification;
use crate::context::Context;
use crate::error::{Arity, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    WhenDev,
    WhenProd,
    When,
    WhenEnv,
    SwitchEnv,
    WhenFeature,
    SwitchFeature,
    DevOnly,
    ProdOnly,
    WhenElement,
    WithDev,
    WithProd,
    WithEnv,
    WithFeature,
}

impl Construct {
    pub const ALL: [Construct; 14] = [
        Construct::WhenDev,
        Construct::WhenProd,
        Construct::When,
        Construct::WhenEnv,
        Construct::SwitchEnv,
        Construct::WhenFeature,
        Construct::SwitchFeature,
        Construct::DevOnly,
        Construct::ProdOnly,
        Construct::WhenElement,
        Construct::WithDev,
        Construct::WithProd,
        Construct::WithEnv,
        Construct::WithFeature,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Exported name as written in user source.
    pub fn name(self) -> &'static str {
        match self {
            Construct::WhenDev => "whenDev",
            Construct::WhenProd => "whenProd",
            Construct::When => "when",
            Construct::WhenEnv => "whenEnv",
            Construct::SwitchEnv => "switchEnv",
            Construct::WhenFeature => "whenFeature",
            Construct::SwitchFeature => "switchFeature",
            Construct::DevOnly => "DevOnly",
            Construct::ProdOnly => "ProdOnly",
            Construct::WhenElement => "When",
            Construct::WithDev => "withDev",
            Construct::WithProd => "withProd",
            Construct::WithEnv => "withEnv",
            Construct::WithFeature => "withFeature",
        }
    }

    pub fn is_markup(self) -> bool {
        matches!(
            self,
            Construct::DevOnly | Construct::ProdOnly | Construct::WhenElement
        )
    }

    pub fn arity(self) -> Arity {
        match self {
            Construct::WhenDev => Arity::Exactly(2),
            Construct::WhenProd => Arity::Between(1, 2),
            Construct::When => Arity::Exactly(3),
            Construct::WhenEnv => Arity::Between(2, 3),
            Construct::SwitchEnv => Arity::Exactly(2),
            Construct::WhenFeature => Arity::Exactly(3),
            Construct::SwitchFeature => Arity::Exactly(2),
            Construct::DevOnly | Construct::ProdOnly => Arity::Between(1, 2),
            Construct::WhenElement => Arity::Any,
            Construct::WithDev | Construct::WithProd => Arity::Exactly(1),
            Construct::WithEnv | Construct::WithFeature => Arity::Exactly(2),
        }
    }
}

/// Where the call site sits in the surrounding tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Whole expression statement.
    Statement,
    /// Direct initializer of a variable declarator.
    VarInit,
    Expression,
    JsxChild,
}

/// A surviving subtree, by argument index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Arg(usize),
    /// Value of the `case`-th property of the object literal at `arg`.
    Case { arg: usize, case: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Replace(Pick),
    /// Replace with an immediate invocation of the picked function.
    WrapAndCall(Pick),
    Remove,
    /// Replace with a component that renders nothing.
    EmptyComponent,
}

/// Keyword-style inputs of the markup constructs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkupProps {
    pub is_dev: bool,
    pub is_prod: bool,
    pub is: Option<Vec<String>>,
    pub feature: Option<Vec<String>>,
    pub children: Option<Pick>,
    pub fallback: Option<Pick>,
}

impl MarkupProps {
    /// `DevOnly(children, fallback?)` call form.
    pub fn positional(count: usize) -> Self {
        Self {
            children: (count > 0).then_some(Pick::Arg(0)),
            fallback: (count > 1).then_some(Pick::Arg(1)),
            ..Default::default()
        }
    }

    /// `When(...)` call form: arguments are told apart by shape, not position.
    ///
    /// Only the first boolean literal is honored (`true` guards on development,
    /// `false` on production); later ones are ignored. For the other slots the
    /// last matching argument wins. Any array literal is the feature list, so
    /// one with non-literal elements cannot be resolved.
    pub fn classified(args: &[Classification]) -> Result<Self> {
        let mut props = Self::default();
        let mut guarded = false;
        for (i, class) in args.iter().enumerate() {
            match class {
                Classification::Str(env) => props.is = Some(vec![env.clone()]),
                Classification::Array(Some(features)) => props.feature = Some(features.clone()),
                Classification::Array(None) => {
                    return Err(Error::Unresolvable {
                        construct: Construct::WhenElement.name(),
                        slot: format!("argument {}", i + 1),
                        expected: "an array of string literals",
                        found: class.describe(),
                    })
                }
                Classification::Markup => props.children = Some(Pick::Arg(i)),
                Classification::Bool(_) if guarded => {}
                Classification::Bool(dev) => {
                    guarded = true;
                    if *dev {
                        props.is_dev = true;
                    } else {
                        props.is_prod = true;
                    }
                }
                _ => props.fallback = Some(Pick::Arg(i)),
            }
        }
        Ok(props)
    }
}

/// What a rule is decided from.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// Positional call arguments.
    Args(Vec<Classification>),
    /// Attributes and children of a markup element.
    Markup(MarkupProps),
}

pub fn decide(
    construct: Construct,
    input: &Input,
    position: Position,
    ctx: &Context,
) -> Result<Decision> {
    let args = match input {
        Input::Markup(props) => return markup(construct, props, ctx),
        Input::Args(args) => args,
    };

    let arity = construct.arity();
    if !arity.admits(args.len()) {
        return Err(Error::Arity {
            construct: construct.name(),
            expected: arity,
            found: args.len(),
        });
    }

    match construct {
        Construct::WhenDev => Ok(Decision::Replace(Pick::Arg(if ctx.is_dev() { 0 } else { 1 }))),
        Construct::WhenProd => when_prod(args, position, ctx),
        Construct::When | Construct::WhenEnv => {
            let envs = names(construct, args, 0)?;
            Ok(branch(ctx.matches_env(&envs), args.len()))
        }
        Construct::WhenFeature => {
            let features = names(construct, args, 0)?;
            Ok(branch(ctx.matches_feature(&features), args.len()))
        }
        Construct::SwitchEnv => {
            let keys = cases(construct, args)?;
            Ok(switch(ctx.select_case(keys.iter().zip(0..))))
        }
        Construct::SwitchFeature => {
            let keys = cases(construct, args)?;
            Ok(switch(ctx.select_feature_case(keys.iter().zip(0..))))
        }
        Construct::DevOnly | Construct::ProdOnly => {
            markup(construct, &MarkupProps::positional(args.len()), ctx)
        }
        Construct::WhenElement => markup(construct, &MarkupProps::classified(args)?, ctx),
        Construct::WithDev => Ok(forward(ctx.is_dev())),
        Construct::WithProd => Ok(forward(ctx.is_prod())),
        Construct::WithEnv => Ok(forward(ctx.matches_env(&names(construct, args, 1)?))),
        Construct::WithFeature => Ok(forward(ctx.matches_feature(&names(construct, args, 1)?))),
    }
}

fn when_prod(args: &[Classification], position: Position, ctx: &Context) -> Result<Decision> {
    let deferred = args[0].is_function();
    if deferred && position == Position::VarInit {
        return Err(Error::IllegalBinding {
            construct: Construct::WhenProd.name(),
        });
    }

    if ctx.is_prod() {
        return Ok(if deferred {
            Decision::WrapAndCall(Pick::Arg(0))
        } else {
            Decision::Replace(Pick::Arg(0))
        });
    }

    // The development alternative only survives when it has the same shape as
    // the production one: a function for a function, a literal for a literal.
    Ok(match args.get(1) {
        Some(alt) if deferred && alt.is_function() => Decision::WrapAndCall(Pick::Arg(1)),
        Some(alt) if !deferred && alt.is_value() => Decision::Replace(Pick::Arg(1)),
        _ => Decision::Remove,
    })
}

fn markup(construct: Construct, props: &MarkupProps, ctx: &Context) -> Result<Decision> {
    let show = match construct {
        Construct::DevOnly => ctx.is_dev(),
        Construct::ProdOnly => ctx.is_prod(),
        Construct::WhenElement => when_guards(props, ctx),
        _ => return Err(Error::NotMarkup { construct: construct.name() }),
    };
    let survivor = if show { props.children } else { props.fallback };
    Ok(survivor.map_or(Decision::Remove, Decision::Replace))
}

/// Guards checked in fixed order; the first failing one selects the fallback.
fn when_guards(props: &MarkupProps, ctx: &Context) -> bool {
    if props.is_dev && !ctx.is_dev() {
        return false;
    }
    if props.is_prod && !ctx.is_prod() {
        return false;
    }
    if let Some(envs) = &props.is {
        if !ctx.matches_env(envs) {
            return false;
        }
    }
    if let Some(features) = &props.feature {
        if !ctx.matches_feature(features) {
            return false;
        }
    }
    true
}

/// `(predicate, value, default?)` shaped constructs.
fn branch(matched: bool, count: usize) -> Decision {
    match (matched, count) {
        (true, _) => Decision::Replace(Pick::Arg(1)),
        (false, 3) => Decision::Replace(Pick::Arg(2)),
        (false, _) => Decision::Remove,
    }
}

fn switch(case: Option<usize>) -> Decision {
    match case {
        Some(case) => Decision::Replace(Pick::Case { arg: 0, case }),
        None => Decision::Replace(Pick::Arg(1)),
    }
}

fn forward(matched: bool) -> Decision {
    if matched {
        Decision::Replace(Pick::Arg(0))
    } else {
        Decision::EmptyComponent
    }
}

fn names(construct: Construct, args: &[Classification], at: usize) -> Result<Vec<String>> {
    args[at].names().ok_or_else(|| Error::Unresolvable {
        construct: construct.name(),
        slot: format!("argument {}", at + 1),
        expected: "a string literal or an array of string literals",
        found: args[at].describe(),
    })
}

fn cases(construct: Construct, args: &[Classification]) -> Result<&[String]> {
    match &args[0] {
        Classification::Cases(keys) => Ok(keys),
        other => Err(Error::Unresolvable {
            construct: construct.name(),
            slot: "argument 1".to_string(),
            expected: "an object literal with static keys",
            found: other.describe(),
        }),
    }
}
