//! Formula evaluation.
//!
//! Evaluates a validated [`Formula`] left to right with two stacks, one of
//! pending operands and one of pending operators and open parentheses,
//! giving `*`/`/` precedence over `+`/`-` and left associativity.
//!
//! Evaluation never fails with an `Err` of its own kind: an unknown variable
//! or a division by zero produces a [`FormulaError`] value that callers store
//! like any other result.

use thiserror::Error;
use tracing::trace;

use super::CellName;
use super::formula::{Formula, Operator, Token};

/// Why a formula could not produce a number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("cannot read {name}: {reason}")]
    Lookup { name: CellName, reason: String },

    #[error("division by zero")]
    DivisionByZero,
}

impl FormulaError {
    /// Human-readable reason for the failure.
    pub fn reason(&self) -> String {
        self.to_string()
    }
}

/// Result of evaluating a formula.
pub type Evaluation = Result<f64, FormulaError>;

#[derive(Clone, Copy, Debug)]
enum Pending {
    Open,
    Op(Operator),
}

impl Formula {
    /// Evaluate the formula, resolving variables through `lookup`.
    ///
    /// `lookup` returns the variable's number, or a reason it has none.
    ///
    /// Tokens only come from [`Formula::parse`], so operators always have two
    /// operands and parentheses always balance. The only failures are a failed
    /// lookup and division by zero.
    pub fn evaluate<F>(&self, mut lookup: F) -> Evaluation
    where
        F: FnMut(&CellName) -> Result<f64, String>,
    {
        let mut operands: Vec<f64> = Vec::new();
        let mut pending: Vec<Pending> = Vec::new();

        for token in self.tokens() {
            match token {
                Token::Number(n) => push_operand(*n, &mut operands, &mut pending)?,
                Token::Var(name) => {
                    let value = lookup(name).map_err(|reason| FormulaError::Lookup {
                        name: name.clone(),
                        reason,
                    })?;
                    push_operand(value, &mut operands, &mut pending)?;
                }
                Token::Open => pending.push(Pending::Open),
                Token::Op(op) if op.is_additive() => {
                    apply_top(&mut operands, &mut pending, Operator::is_additive)?;
                    pending.push(Pending::Op(*op));
                }
                Token::Op(op) => pending.push(Pending::Op(*op)),
                Token::Close => {
                    apply_top(&mut operands, &mut pending, Operator::is_additive)?;
                    let open = pending.pop();
                    debug_assert!(matches!(open, Some(Pending::Open)), "unbalanced ')'");
                    apply_top(&mut operands, &mut pending, Operator::is_multiplicative)?;
                }
            }
        }

        while let Some(top) = pending.pop() {
            debug_assert!(matches!(top, Pending::Op(_)), "unbalanced '('");
            if let Pending::Op(op) = top {
                apply_binary(op, &mut operands)?;
            }
        }

        debug_assert_eq!(operands.len(), 1, "formula left {:?} on the stack", operands);
        let result = operands.pop().unwrap_or(f64::NAN);
        trace!(formula = %self, result, "evaluated formula");
        Ok(result)
    }
}

/// Push an operand, first folding it into a pending `*` or `/`.
fn push_operand(
    value: f64,
    operands: &mut Vec<f64>,
    pending: &mut Vec<Pending>,
) -> Result<(), FormulaError> {
    operands.push(value);
    apply_top(operands, pending, Operator::is_multiplicative)
}

/// If the top pending entry is an operator selected by `wanted`, pop it and
/// apply it to the top two operands.
fn apply_top(
    operands: &mut Vec<f64>,
    pending: &mut Vec<Pending>,
    wanted: fn(Operator) -> bool,
) -> Result<(), FormulaError> {
    if let Some(&Pending::Op(op)) = pending.last() {
        if wanted(op) {
            pending.pop();
            apply_binary(op, operands)?;
        }
    }
    Ok(())
}

fn apply_binary(op: Operator, operands: &mut Vec<f64>) -> Result<(), FormulaError> {
    let (rhs, lhs) = (operands.pop(), operands.pop());
    debug_assert!(lhs.is_some() && rhs.is_some(), "'{}' is missing an operand", op.symbol());
    let (lhs, rhs) = (lhs.unwrap_or(f64::NAN), rhs.unwrap_or(f64::NAN));
    let result = match op {
        Operator::Add => lhs + rhs,
        Operator::Sub => lhs - rhs,
        Operator::Mul => lhs * rhs,
        Operator::Div => {
            if rhs == 0.0 {
                return Err(FormulaError::DivisionByZero);
            }
            lhs / rhs
        }
    };
    operands.push(result);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn eval(text: &str) -> Evaluation {
        Formula::parse(text)
            .unwrap()
            .evaluate(|name| Err(format!("{} is undefined", name)))
    }

    fn eval_with(text: &str, vars: &[(&str, f64)]) -> Evaluation {
        let vars: HashMap<String, f64> = vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        Formula::parse(text).unwrap().evaluate(|name| {
            vars.get(name.as_str())
                .copied()
                .ok_or_else(|| format!("{} is undefined", name))
        })
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("2*3+4"), Ok(10.0));
        assert_eq!(eval("2+12/4-1"), Ok(4.0));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("10-4-3"), Ok(3.0));
        assert_eq!(eval("64/4/2"), Ok(8.0));
        assert_eq!(eval("8/2*4"), Ok(16.0));
        assert_eq!(eval("1-2+3"), Ok(2.0));
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(eval("(5)"), Ok(5.0));
        assert_eq!(eval("2*(3)"), Ok(6.0));
        assert_eq!(eval("(2)*3"), Ok(6.0));
        assert_eq!(eval("10-(4-3)"), Ok(9.0));
        assert_eq!(eval("2*(3+(4-1)*2)/3"), Ok(6.0));
        assert_eq!(eval("((((1))))+1"), Ok(2.0));
    }

    #[test]
    fn test_decimals_and_exponents() {
        assert_eq!(eval("1.5*2"), Ok(3.0));
        assert_eq!(eval("1e2+.5"), Ok(100.5));
    }

    #[test]
    fn test_variables() {
        let vars = [("A1", 5.0), ("B1", 2.0)];
        assert_eq!(eval_with("a1*b1+1", &vars), Ok(11.0));
        assert_eq!(eval_with("(A1-B1)/B1", &vars), Ok(1.5));
    }

    #[test]
    fn test_division_by_zero_is_an_error_value() {
        assert_eq!(eval_with("A1/0", &[("A1", 5.0)]), Err(FormulaError::DivisionByZero));
        assert_eq!(eval("1/(2-2)"), Err(FormulaError::DivisionByZero));
        assert_eq!(eval("0/5"), Ok(0.0));
    }

    #[test]
    fn test_undefined_variable_is_an_error_value() {
        let err = eval("B1").unwrap_err();
        assert_eq!(
            err,
            FormulaError::Lookup {
                name: CellName::parse("B1").unwrap(),
                reason: "B1 is undefined".to_string(),
            }
        );
        assert!(err.reason().contains("B1"));
        assert!(eval_with("A1*C1", &[("A1", 1.0)]).is_err());
    }

    #[test]
    fn test_lookup_is_called_per_occurrence() {
        let f = Formula::parse("A1+A1*A1").unwrap();
        let mut calls = 0;
        let result = f.evaluate(|_| {
            calls += 1;
            Ok(2.0)
        });
        assert_eq!(result, Ok(6.0));
        assert_eq!(calls, 3);
    }

    fn expression() -> impl Strategy<Value = String> {
        let leaf = prop_oneof![
            (0u32..100).prop_map(|n| n.to_string()),
            Just("A1".to_string()),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            prop_oneof![
                (inner.clone(), prop::sample::select(vec!['+', '-', '*', '/']), inner.clone())
                    .prop_map(|(lhs, op, rhs)| format!("{}{}{}", lhs, op, rhs)),
                inner.prop_map(|e| format!("({})", e)),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_parsed_formulas_always_reduce_to_one_number(text in expression()) {
            let formula = Formula::parse(&text).unwrap();
            match formula.evaluate(|_| Ok(2.0)) {
                Ok(n) => prop_assert!(!n.is_nan(), "{} gave NaN", text),
                Err(e) => prop_assert_eq!(e, FormulaError::DivisionByZero),
            }
        }
    }
}
