//! Tariff formula interpreter.
//!
//! Premium rules are written as small expressions over the answers given in
//! an offer, for example:
//!
//! ```text
//! NUM_OF_ADULTS * (DESTINATION == "EUR" ? 26.00M : 34.00M)
//! ```
//!
//! Supported: decimal literals (optional `M` suffix), string literals,
//! `true`/`false`, variables, `+ - * /`, unary `-` and `!`, comparisons,
//! short-circuit `&&`/`||`, `cond ? a : b` and parentheses.

mod eval;
mod lexer;
mod parser;

use rust_decimal::Decimal;
use thiserror::Error;

pub use eval::{Bindings, Value};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("syntax error at position {pos}: {message}")]
    Syntax { pos: usize, message: String },

    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("operator '{operator}' expects {expected}, found {found}")]
    TypeMismatch {
        operator: String,
        expected: String,
        found: String,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow in '{0}'")]
    Overflow(String),

    #[error("formula '{formula}' must produce {expected}")]
    UnexpectedResult { formula: String, expected: String },
}

/// A parsed formula, ready to be evaluated against different bindings.
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    expr: parser::Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let tokens = lexer::tokenize(source)?;
        let expr = parser::parse(&tokens, source.len())?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn evaluate(&self, bindings: &Bindings) -> Result<Value, FormulaError> {
        eval::evaluate(&self.expr, bindings)
    }

    pub fn evaluate_bool(&self, bindings: &Bindings) -> Result<bool, FormulaError> {
        match self.evaluate(bindings)? {
            Value::Bool(b) => Ok(b),
            _ => Err(FormulaError::UnexpectedResult {
                formula: self.source.clone(),
                expected: "a boolean".to_string(),
            }),
        }
    }

    pub fn evaluate_number(&self, bindings: &Bindings) -> Result<Decimal, FormulaError> {
        match self.evaluate(bindings)? {
            Value::Number(n) => Ok(n),
            _ => Err(FormulaError::UnexpectedResult {
                formula: self.source.clone(),
                expected: "a number".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn travel_bindings() -> Bindings {
        Bindings::new()
            .with("NUM_OF_ADULTS", Value::Number(dec!(2)))
            .with("NUM_OF_CHILDREN", Value::Number(dec!(1)))
            .with("DESTINATION", Value::Text("EUR".to_string()))
            .with("DAYS", Value::Number(dec!(10)))
    }

    #[test]
    fn evaluates_travel_base_price() {
        let formula =
            Formula::parse("NUM_OF_ADULTS * (DESTINATION == \"EUR\" ? 26.00M : 34.00M)").unwrap();
        assert_eq!(formula.evaluate_number(&travel_bindings()).unwrap(), dec!(52.00));
    }

    #[test]
    fn variables_are_case_insensitive() {
        let formula = Formula::parse("num_of_adults + Num_Of_Children").unwrap();
        assert_eq!(formula.evaluate_number(&travel_bindings()).unwrap(), dec!(3));
    }

    #[test]
    fn logical_operators_short_circuit() {
        // UNKNOWN is never evaluated
        let formula = Formula::parse("DAYS > 100 && UNKNOWN == 1").unwrap();
        assert!(!formula.evaluate_bool(&travel_bindings()).unwrap());

        let formula = Formula::parse("DAYS >= 10 || UNKNOWN == 1").unwrap();
        assert!(formula.evaluate_bool(&travel_bindings()).unwrap());
    }

    #[test]
    fn unknown_variable_is_reported() {
        let formula = Formula::parse("AREA * 2").unwrap();
        assert_eq!(
            formula.evaluate(&travel_bindings()).unwrap_err(),
            FormulaError::UnknownVariable("AREA".to_string())
        );
    }

    #[test]
    fn comparing_text_with_number_is_a_type_error() {
        let formula = Formula::parse("DESTINATION == 1").unwrap();
        assert!(matches!(
            formula.evaluate(&travel_bindings()),
            Err(FormulaError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let formula = Formula::parse("DAYS / (NUM_OF_ADULTS - 2)").unwrap();
        assert_eq!(
            formula.evaluate(&travel_bindings()).unwrap_err(),
            FormulaError::DivisionByZero
        );
    }

    #[test]
    fn negation_and_not() {
        let formula = Formula::parse("-DAYS + 15").unwrap();
        assert_eq!(formula.evaluate_number(&travel_bindings()).unwrap(), dec!(5));

        let formula = Formula::parse("!(DESTINATION == \"WORLD\")").unwrap();
        assert!(formula.evaluate_bool(&travel_bindings()).unwrap());
    }

    #[test]
    fn numeric_formula_used_as_condition_is_rejected() {
        let formula = Formula::parse("DAYS * 2").unwrap();
        assert!(matches!(
            formula.evaluate_bool(&travel_bindings()),
            Err(FormulaError::UnexpectedResult { .. })
        ));
    }
}
