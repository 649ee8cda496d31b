//! Template and expression syntax tree.
//!
//! `Display` renders expressions as s-expressions, which keeps parser tests
//! readable and independent from `Debug` formatting.

#![allow(missing_docs)]

use std::fmt;

use smol_str::SmolStr;

/// Literal value written directly in an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(SmolStr),
}

/// Prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Operator symbol as written in source.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::In => "in",
            Self::Concat => "~",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }
}

/// Call or filter arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arguments {
    /// Positional arguments in order.
    pub positional: Vec<Expr>,
    /// Keyword arguments in source order.
    pub keyword: Vec<(SmolStr, Expr)>,
}

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(SmolStr),
    List(Vec<Expr>),
    Call {
        function: SmolStr,
        args: Arguments,
    },
    Filter {
        value: Box<Expr>,
        name: SmolStr,
        args: Arguments,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

/// Node of a parsed template.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal text copied to the output.
    Text(String),
    /// `{{ expr }}`
    Output(Expr),
    /// `{% if %}` ... `{% elif %}` ... `{% else %}` ... `{% endif %}`
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Vec<Node>,
    },
}

/// Parsed template source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Template {
    pub nodes: Vec<Node>,
}

impl Template {
    /// Returns the expression when the template is a single `{{ expr }}`
    /// surrounded by nothing but whitespace.
    #[must_use]
    pub fn single_expression(&self) -> Option<&Expr> {
        let mut found = None;
        for node in &self.nodes {
            match node {
                Node::Text(text) if text.trim().is_empty() => {}
                Node::Output(expr) if found.is_none() => found = Some(expr),
                _ => return None,
            }
        }
        found
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value:?}"),
            Self::Str(value) => write!(f, "{:?}", value.as_str()),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &Arguments) -> fmt::Result {
    for arg in &args.positional {
        write!(f, " {arg}")?;
    }
    for (name, arg) in &args.keyword {
        write!(f, " {name}={arg}")?;
    }
    Ok(())
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Name(name) => f.write_str(name),
            Self::List(items) => {
                f.write_str("(list")?;
                for item in items {
                    write!(f, " {item}")?;
                }
                f.write_str(")")
            }
            Self::Call { function, args } => {
                write!(f, "(call {function}")?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Self::Filter { value, name, args } => {
                write!(f, "(filter {name} {value}")?;
                write_args(f, args)?;
                f.write_str(")")
            }
            Self::Unary { op, expr } => match op {
                UnaryOp::Not => write!(f, "(not {expr})"),
                UnaryOp::Neg => write!(f, "(neg {expr})"),
            },
            Self::Binary { op, left, right } => {
                write!(f, "({} {left} {right})", op.symbol())
            }
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => write!(f, "(if {condition} {then} {otherwise})"),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "(text {text:?})"),
            Self::Output(expr) => write!(f, "(output {expr})"),
            Self::If {
                branches,
                otherwise,
            } => {
                f.write_str("(if-block")?;
                for (condition, body) in branches {
                    write!(f, " (when {condition}")?;
                    for node in body {
                        write!(f, " {node}")?;
                    }
                    f.write_str(")")?;
                }
                if !otherwise.is_empty() {
                    f.write_str(" (else")?;
                    for node in otherwise {
                        write!(f, " {node}")?;
                    }
                    f.write_str(")")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, node) in self.nodes.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}
