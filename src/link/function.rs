//! Function-call shaped links: `name(args)`, `IN [..]`, grouped
//! conditions and APOC bitwise operations.

use std::fmt;

use super::{Render, RenderContext};
use crate::error::{BuilderError, Result};
use crate::value::{Args, Value};

/// `name(arg, arg)`. Arguments are bound as parameters unless the function
/// is raw, in which case they are emitted literally.
#[derive(Debug, Clone, Default)]
pub struct Func {
    name: String,
    args: Vec<Value>,
    raw: bool,
}

impl Func {
    pub fn new(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            args,
            raw: false,
        }
    }

    pub fn raw(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            raw: true,
            ..Self::new(name, args)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

impl Render for Func {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let args = if self.raw {
            ctx.join(&self.args, |arg| ctx.literal(arg))?
        } else {
            ctx.join(&self.args, |arg| ctx.placeholder(arg))?
        };
        Ok(format!("{}({})", self.name, args))
    }
}

/// `IN [a, b]`, or `IN f(x)` when `f` is known to return a list.
#[derive(Debug, Clone, Default)]
pub struct In {
    args: Vec<Value>,
}

impl In {
    pub fn new(args: Vec<Value>) -> Self {
        Self { args }
    }
}

impl Render for In {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let args = ctx.join(&self.args, |arg| ctx.placeholder(arg))?;
        let head = args.split('(').next().unwrap_or_default();
        if ctx.returns_list(head) {
            Ok(format!("IN {}", args))
        } else {
            Ok(format!("IN [{}]", args))
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConditionalKind {
    #[default]
    Comma,
    And,
    Or,
}

impl ConditionalKind {
    pub fn separator(&self) -> &'static str {
        match self {
            ConditionalKind::Comma => ", ",
            ConditionalKind::And => " AND ",
            ConditionalKind::Or => " OR ",
        }
    }
}

/// A parenthesised group `(a OP b OP c)`.
#[derive(Debug, Clone, Default)]
pub struct Conditional {
    kind: ConditionalKind,
    args: Vec<Value>,
}

impl Conditional {
    pub fn new(kind: ConditionalKind, args: Vec<Value>) -> Self {
        Self { kind, args }
    }
}

impl Render for Conditional {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        let parts = self
            .args
            .iter()
            .map(|arg| ctx.placeholder(arg))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", parts.join(self.kind.separator())))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BitwiseOp {
    #[default]
    And,
    Or,
    Xor,
    Not,
    LeftShift,
    RightShift,
    UnsignedRightShift,
}

impl fmt::Display for BitwiseOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BitwiseOp::And => "&",
            BitwiseOp::Or => "|",
            BitwiseOp::Xor => "^",
            BitwiseOp::Not => "~",
            BitwiseOp::LeftShift => "<<",
            BitwiseOp::RightShift => ">>",
            BitwiseOp::UnsignedRightShift => ">>>",
        };
        write!(f, "{}", op)
    }
}

/// `apoc.bitwise.op(a, "OP", b)`. More than two operands nest to the right:
/// `op(a, OP, op(b, OP, c))`.
#[derive(Debug, Clone, Default)]
pub struct Bitwise {
    op: BitwiseOp,
    args: Vec<Value>,
}

impl Bitwise {
    pub fn new(op: BitwiseOp, args: Vec<Value>) -> Self {
        Self { op, args }
    }

    /// Build from call arguments. Fewer than two operands is rejected here
    /// rather than at render time.
    pub fn from_args(op: BitwiseOp, args: Args) -> Result<Self> {
        if args.positional.len() < 2 {
            return Err(Self::too_few(op, args.positional.len()));
        }
        Ok(Self::new(op, args.positional))
    }

    fn too_few(op: BitwiseOp, got: usize) -> BuilderError {
        BuilderError::invalid(format!(
            "bitwise '{}' needs at least two operands, got {}",
            op, got
        ))
    }

    fn render_operands(&self, ctx: &RenderContext, operands: &[Value]) -> Result<String> {
        let (first, rest) = match operands {
            [first, rest @ ..] if !rest.is_empty() => (first, rest),
            _ => return Err(Self::too_few(self.op, operands.len())),
        };
        let left = ctx.placeholder(first)?;
        let right = match rest {
            [only] => ctx.placeholder(only)?,
            _ => self.render_operands(ctx, rest)?,
        };
        Ok(format!("apoc.bitwise.op({}, \"{}\", {})", left, self.op, right))
    }
}

impl Render for Bitwise {
    fn render(&self, ctx: &RenderContext) -> Result<String> {
        self.render_operands(ctx, &self.args)
    }
}
