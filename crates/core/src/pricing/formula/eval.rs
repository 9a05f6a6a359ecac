use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parser::{BinaryOp, Expr, UnaryOp};
use super::FormulaError;

/// Runtime value of a formula expression or variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(Decimal),
    Text(String),
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Variables visible to a formula. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_uppercase(), value);
    }

    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(&name.to_uppercase())
    }
}

pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<Value, FormulaError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Var(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| FormulaError::UnknownVariable(name.clone())),
        Expr::Unary(op, operand) => {
            let value = evaluate(operand, bindings)?;
            match (op, value) {
                (UnaryOp::Neg, Value::Number(n)) => Ok(Value::Number(-n)),
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                (UnaryOp::Neg, other) => Err(type_mismatch("-", "number", &other)),
                (UnaryOp::Not, other) => Err(type_mismatch("!", "boolean", &other)),
            }
        }
        Expr::Binary(BinaryOp::And, left, right) => {
            if !as_bool("&&", evaluate(left, bindings)?)? {
                return Ok(Value::Bool(false));
            }
            Ok(Value::Bool(as_bool("&&", evaluate(right, bindings)?)?))
        }
        Expr::Binary(BinaryOp::Or, left, right) => {
            if as_bool("||", evaluate(left, bindings)?)? {
                return Ok(Value::Bool(true));
            }
            Ok(Value::Bool(as_bool("||", evaluate(right, bindings)?)?))
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            binary(*op, left, right)
        }
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if as_bool("?:", evaluate(condition, bindings)?)? {
                evaluate(then, bindings)
            } else {
                evaluate(otherwise, bindings)
            }
        }
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, FormulaError> {
    match (op, left, right) {
        (BinaryOp::Eq, l, r) => Ok(Value::Bool(values_equal(&l, &r)?)),
        (BinaryOp::NotEq, l, r) => Ok(Value::Bool(!values_equal(&l, &r)?)),
        (BinaryOp::Add, Value::Text(a), Value::Text(b)) => Ok(Value::Text(a + &b)),
        (op, l, r) => arithmetic(op, l, r),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, FormulaError> {
    let symbol = symbol(op);
    let a = as_number(symbol, left)?;
    let b = as_number(symbol, right)?;
    let overflow = || FormulaError::Overflow(symbol.to_string());
    match op {
        BinaryOp::Add => a.checked_add(b).map(Value::Number).ok_or_else(overflow),
        BinaryOp::Sub => a.checked_sub(b).map(Value::Number).ok_or_else(overflow),
        BinaryOp::Mul => a.checked_mul(b).map(Value::Number).ok_or_else(overflow),
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(FormulaError::DivisionByZero);
            }
            a.checked_div(b).map(Value::Number).ok_or_else(overflow)
        }
        BinaryOp::Lt => Ok(Value::Bool(a < b)),
        BinaryOp::Le => Ok(Value::Bool(a <= b)),
        BinaryOp::Gt => Ok(Value::Bool(a > b)),
        BinaryOp::Ge => Ok(Value::Bool(a >= b)),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            Err(FormulaError::TypeMismatch {
                operator: symbol.to_string(),
                expected: "numbers".to_string(),
                found: "logical operands".to_string(),
            })
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> Result<bool, FormulaError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Text(a), Value::Text(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (a, b) => Err(FormulaError::TypeMismatch {
            operator: "==".to_string(),
            expected: a.type_name().to_string(),
            found: b.type_name().to_string(),
        }),
    }
}

fn symbol(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
    }
}

fn as_bool(operator: &str, value: Value) -> Result<bool, FormulaError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(type_mismatch(operator, "boolean", &other)),
    }
}

fn as_number(operator: &str, value: Value) -> Result<Decimal, FormulaError> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(type_mismatch(operator, "number", &other)),
    }
}

fn type_mismatch(operator: &str, expected: &str, found: &Value) -> FormulaError {
    FormulaError::TypeMismatch {
        operator: operator.to_string(),
        expected: expected.to_string(),
        found: found.type_name().to_string(),
    }
}
