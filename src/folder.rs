//! Streaming constant-expression folder (spec.md §4.2).
//!
//! Feed it numbers (with signedness) and operators; at any point, request
//! the result. Implemented as a conventional two-stack (values/operators)
//! shunting-yard evaluator, computing in 64-bit with explicit overflow and
//! div/mod-by-zero detection, matching the C precedence table named in the
//! spec (`+ - * / % & | ^ ~ ( ) << >> **`, `**` right-associative).

use crate::error::FoldError;
use crate::token::Sign;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Pow,
    LParen,
    RParen,
    /* unary */
    Neg,
    Not,
}

impl Op {
    /// Higher binds tighter. Conventional C precedence, with `**` above
    /// multiplicative (it has no C equivalent; placed highest below unary).
    fn precedence(self) -> u8 {
        match self {
            Op::Pow => 8,
            Op::Mul | Op::Div | Op::Mod => 7,
            Op::Add | Op::Sub => 6,
            Op::Shl | Op::Shr => 5,
            Op::And => 4,
            Op::Xor => 3,
            Op::Or => 2,
            Op::LParen | Op::RParen | Op::Neg | Op::Not => 9,
        }
    }

    fn right_assoc(self) -> bool {
        matches!(self, Op::Pow)
    }

    fn is_binary(self) -> bool {
        !matches!(self, Op::LParen | Op::RParen | Op::Neg | Op::Not)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Value {
    v: i64,
    sign: Sign,
}

enum Item {
    Value(Value),
    Op(Op),
}

/// A streaming evaluator: call [`ConstantFolder::feed_number`] and
/// [`ConstantFolder::feed_op`] in source order, then
/// [`ConstantFolder::get_result`]. Resets itself after a successful
/// `get_result` so it is ready for the next expression (spec.md §4.2
/// "Reset").
#[derive(Default)]
pub struct ConstantFolder {
    items: Vec<Item>,
    /// True right after an operand or `)`: distinguishes unary `-`/`~` from
    /// binary `-`.
    expect_operator: bool,
}

impl ConstantFolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_number(&mut self, value: i64, sign: Sign) {
        self.items.push(Item::Value(Value { v: value, sign }));
        self.expect_operator = true;
    }

    pub fn feed_op(&mut self, op: Op) {
        let op = match op {
            Op::Sub if !self.expect_operator => Op::Neg,
            Op::Add if !self.expect_operator => {
                // unary plus: no-op, doesn't change expect_operator
                return;
            }
            other => other,
        };
        match op {
            Op::LParen => self.expect_operator = false,
            Op::RParen => self.expect_operator = true,
            Op::Neg | Op::Not => self.expect_operator = false,
            _ => self.expect_operator = false,
        }
        self.items.push(Item::Op(op));
    }

    /// Evaluate the accumulated expression and reset for the next one.
    pub fn get_result(&mut self) -> Result<(i64, Sign), FoldError> {
        let items = std::mem::take(&mut self.items);
        self.expect_operator = false;
        eval(&items)
    }
}

fn eval(items: &[Item]) -> Result<(i64, Sign), FoldError> {
    let mut output: Vec<Value> = Vec::new();
    let mut ops: Vec<Op> = Vec::new();

    fn apply(output: &mut Vec<Value>, op: Op) -> Result<(), FoldError> {
        if matches!(op, Op::Neg | Op::Not) {
            let a = output
                .pop()
                .ok_or_else(|| FoldError::IllFormed("missing operand for unary operator".into()))?;
            let v = match op {
                Op::Neg => a.v.checked_neg().ok_or_else(|| FoldError::Overflow("-".into()))?,
                Op::Not => !a.v,
                _ => unreachable!(),
            };
            output.push(Value { v, sign: a.sign });
            return Ok(());
        }
        let b = output
            .pop()
            .ok_or_else(|| FoldError::IllFormed("missing right operand".into()))?;
        let a = output
            .pop()
            .ok_or_else(|| FoldError::IllFormed("missing left operand".into()))?;
        let sign = combine_sign(a.sign, b.sign, op);
        let v = apply_binary(op, a.v, b.v)?;
        output.push(Value { v, sign });
        Ok(())
    }

    for item in items {
        match item {
            Item::Value(v) => output.push(*v),
            Item::Op(Op::LParen) => ops.push(Op::LParen),
            Item::Op(Op::RParen) => {
                loop {
                    match ops.pop() {
                        Some(Op::LParen) => break,
                        Some(op) => apply(&mut output, op)?,
                        None => return Err(FoldError::IllFormed("mismatched parentheses".into())),
                    }
                }
            }
            Item::Op(op) => {
                while let Some(top) = ops.last().copied() {
                    if top == Op::LParen {
                        break;
                    }
                    let pops = if op.is_binary() {
                        top.precedence() > op.precedence()
                            || (top.precedence() == op.precedence() && !op.right_assoc())
                    } else {
                        false
                    };
                    if pops {
                        ops.pop();
                        apply(&mut output, top)?;
                    } else {
                        break;
                    }
                }
                ops.push(*op);
            }
        }
    }

    while let Some(op) = ops.pop() {
        if op == Op::LParen {
            return Err(FoldError::IllFormed("mismatched parentheses".into()));
        }
        apply(&mut output, op)?;
    }

    if output.len() != 1 {
        return Err(FoldError::IllFormed("expression did not reduce to one value".into()));
    }
    let result = output.pop().unwrap();
    Ok((result.v, result.sign))
}

fn combine_sign(a: Sign, b: Sign, _op: Op) -> Sign {
    // "The result's signedness is the disjunction of operand signednesses
    // minus narrowing on unsigned conversions" (§4.2): any signed operand
    // makes the result signed.
    if a == Sign::Signed || b == Sign::Signed {
        Sign::Signed
    } else {
        Sign::Unsigned
    }
}

fn apply_binary(op: Op, a: i64, b: i64) -> Result<i64, FoldError> {
    match op {
        Op::Add => a.checked_add(b).ok_or_else(|| FoldError::Overflow("+".into())),
        Op::Sub => a.checked_sub(b).ok_or_else(|| FoldError::Overflow("-".into())),
        Op::Mul => a.checked_mul(b).ok_or_else(|| FoldError::Overflow("*".into())),
        Op::Div => {
            if b == 0 {
                return Err(FoldError::DivisionByZero);
            }
            if a == i64::MIN && b == -1 {
                return Err(FoldError::Overflow("INT64_MIN / -1".into()));
            }
            Ok(a / b)
        }
        Op::Mod => {
            if b == 0 {
                return Err(FoldError::ModuloByZero);
            }
            if a == i64::MIN && b == -1 {
                return Err(FoldError::Overflow("INT64_MIN % -1".into()));
            }
            Ok(a % b)
        }
        Op::And => Ok(a & b),
        Op::Or => Ok(a | b),
        Op::Xor => Ok(a ^ b),
        Op::Shl => Ok(a.checked_shl(b as u32).unwrap_or(0)),
        Op::Shr => Ok(a.checked_shr(b as u32).unwrap_or(0)),
        Op::Pow => pow(a, b),
        Op::LParen | Op::RParen | Op::Neg | Op::Not => unreachable!(),
    }
}

/// `(-1) ** N` yields ±1 without overflow, regardless of `N`'s magnitude
/// (spec.md §4.2). Right-associative in the grammar, evaluated iteratively
/// here since the shunting-yard already resolved associativity.
fn pow(base: i64, exp: i64) -> Result<i64, FoldError> {
    if exp < 0 {
        return Err(FoldError::IllFormed("negative exponent".into()));
    }
    if base == -1 {
        return Ok(if exp % 2 == 0 { 1 } else { -1 });
    }
    if base == 1 {
        return Ok(1);
    }
    if base == 0 {
        return Ok(if exp == 0 { 1 } else { 0 });
    }
    let mut result: i64 = 1;
    for _ in 0..exp {
        result = result.checked_mul(base).ok_or_else(|| FoldError::Overflow("**".into()))?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_simple(a: i64, op: Op, b: i64) -> i64 {
        let mut f = ConstantFolder::new();
        f.feed_number(a, Sign::Unsigned);
        f.feed_op(op);
        f.feed_number(b, Sign::Unsigned);
        f.get_result().unwrap().0
    }

    #[test]
    fn precedence_mul_before_add() {
        let mut f = ConstantFolder::new();
        f.feed_number(2, Sign::Unsigned);
        f.feed_op(Op::Add);
        f.feed_number(3, Sign::Unsigned);
        f.feed_op(Op::Mul);
        f.feed_number(4, Sign::Unsigned);
        assert_eq!(f.get_result().unwrap().0, 14);
    }

    #[test]
    fn shift_left() {
        assert_eq!(eval_simple(1, Op::Shl, 3), 8);
    }

    #[test]
    fn enum_default_via_folder() {
        // `V0 = 1 << 3, V1 (implicit V0+1), V2 = V0 + V1` from spec.md §8.
        let v0 = eval_simple(1, Op::Shl, 3);
        assert_eq!(v0, 8);
        let v1 = v0 + 1;
        assert_eq!(v1, 9);
        let v2 = eval_simple(v0, Op::Add, v1);
        assert_eq!(v2, 17);
    }

    #[test]
    fn neg_one_pow_n_no_overflow() {
        assert_eq!(eval_simple(-1, Op::Pow, 1_000_001), -1);
        assert_eq!(eval_simple(-1, Op::Pow, 1_000_000), 1);
    }

    #[test]
    fn int64_min_div_neg_one_rejected() {
        let mut f = ConstantFolder::new();
        f.feed_number(i64::MIN, Sign::Signed);
        f.feed_op(Op::Div);
        f.feed_number(-1, Sign::Signed);
        assert!(matches!(f.get_result(), Err(FoldError::Overflow(_))));
    }

    #[test]
    fn division_and_modulo_by_zero() {
        let mut f = ConstantFolder::new();
        f.feed_number(4, Sign::Unsigned);
        f.feed_op(Op::Div);
        f.feed_number(0, Sign::Unsigned);
        assert!(matches!(f.get_result(), Err(FoldError::DivisionByZero)));

        let mut f = ConstantFolder::new();
        f.feed_number(4, Sign::Unsigned);
        f.feed_op(Op::Mod);
        f.feed_number(0, Sign::Unsigned);
        assert!(matches!(f.get_result(), Err(FoldError::ModuloByZero)));
    }

    #[test]
    fn mismatched_parens_is_ill_formed() {
        let mut f = ConstantFolder::new();
        f.feed_op(Op::LParen);
        f.feed_number(1, Sign::Unsigned);
        assert!(matches!(f.get_result(), Err(FoldError::IllFormed(_))));
    }

    #[test]
    fn resets_after_get_result() {
        let mut f = ConstantFolder::new();
        f.feed_number(1, Sign::Unsigned);
        f.feed_op(Op::Add);
        f.feed_number(1, Sign::Unsigned);
        assert_eq!(f.get_result().unwrap().0, 2);
        f.feed_number(5, Sign::Unsigned);
        assert_eq!(f.get_result().unwrap().0, 5);
    }

    #[test]
    fn parenthesized_grouping() {
        let mut f = ConstantFolder::new();
        f.feed_op(Op::LParen);
        f.feed_number(2, Sign::Unsigned);
        f.feed_op(Op::Add);
        f.feed_number(3, Sign::Unsigned);
        f.feed_op(Op::RParen);
        f.feed_op(Op::Mul);
        f.feed_number(4, Sign::Unsigned);
        assert_eq!(f.get_result().unwrap().0, 20);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Feeding a single number and nothing else yields that number back
        /// unchanged, with its signedness preserved (spec.md §8 "a folder
        /// fed a single literal returns it unchanged").
        #[test]
        fn single_value_round_trips(v in any::<i64>(), unsigned in any::<bool>()) {
            let sign = if unsigned { Sign::Unsigned } else { Sign::Signed };
            let mut f = ConstantFolder::new();
            f.feed_number(v, sign);
            let (result, result_sign) = f.get_result().unwrap();
            prop_assert_eq!(result, v);
            prop_assert_eq!(result_sign, sign);
        }

        /// Addition is commutative for any pair of values whose sum doesn't
        /// overflow `i64`.
        #[test]
        fn addition_is_commutative(a in -1_000_000_000i64..1_000_000_000, b in -1_000_000_000i64..1_000_000_000) {
            let mut f1 = ConstantFolder::new();
            f1.feed_number(a, Sign::Signed);
            f1.feed_op(Op::Add);
            f1.feed_number(b, Sign::Signed);

            let mut f2 = ConstantFolder::new();
            f2.feed_number(b, Sign::Signed);
            f2.feed_op(Op::Add);
            f2.feed_number(a, Sign::Signed);

            prop_assert_eq!(f1.get_result().unwrap().0, f2.get_result().unwrap().0);
        }
    }
}
