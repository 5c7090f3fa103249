//! A small bottom-up evaluator used by tests and the command line tool.
//!
//! Scalar operators are rewrite rules over already evaluated arguments.
//! Relational operators work on tables of the form
//! `Table(Name(List(v, ...)), ...)` and evaluate their predicates row by row,
//! with column names standing for the current row's values.

use super::error::EngineResult;
use super::Engine;
use crate::expression::{
    try_recurse, CloneReason, ComplexExpression, Expression, ExpressionArguments,
    ExpressionBuilder, ExpressionError, ExpressionResult, ExpressionSpanArguments, HeadPattern,
    RewriteRules, Symbol,
};
use log::trace;
use std::cmp::Ordering;

/// Identifier the reference engine is usually registered under.
pub const REFERENCE_ENGINE: &str = "reference";

pub struct ReferenceEngine {
    rules: RewriteRules<'static>,
}

impl ReferenceEngine {
    pub fn new() -> Self {
        let rules = RewriteRules::new()
            .rule("Plus", |head, dynamics, spans| {
                let args = arguments(&head, dynamics, spans);
                fold_numbers(&head, args, 0, i64::checked_add, |a, b| a + b)
            })
            .rule("Times", |head, dynamics, spans| {
                let args = arguments(&head, dynamics, spans);
                fold_numbers(&head, args, 1, i64::checked_mul, |a, b| a * b)
            })
            .rule("Minus", |head, dynamics, spans| {
                let negate = |value: Expression| {
                    fold_numbers(&head, vec![value], 0, i64::checked_sub, |a, b| a - b)
                };
                let mut args = arguments(&head, dynamics, spans);
                match args.len() {
                    1 => negate(args.remove(0)),
                    2 => {
                        let negated = negate(args.remove(1))?;
                        args.push(negated);
                        fold_numbers(&head, args, 0, i64::checked_add, |a, b| a + b)
                    }
                    n => Err(arity(&head, "one or two", n)),
                }
            })
            .rule("Greater", |head, dynamics, spans| {
                let [a, b] = pair(&head, dynamics, spans)?;
                compare_scalars(&head, &a, &b)
                    .map(|order| Expression::Bool(order == Ordering::Greater))
            })
            .rule("Equal", |head, dynamics, spans| {
                let [a, b] = pair(&head, dynamics, spans)?;
                Ok(Expression::Bool(scalars_equal(&a, &b)))
            })
            .rule("And", |head, dynamics, spans| {
                let values = booleans(&head, arguments(&head, dynamics, spans))?;
                Ok(Expression::Bool(values.into_iter().all(|b| b)))
            })
            .rule("Or", |head, dynamics, spans| {
                let values = booleans(&head, arguments(&head, dynamics, spans))?;
                Ok(Expression::Bool(values.into_iter().any(|b| b)))
            })
            .rule("Not", |head, dynamics, spans| {
                let values = booleans(&head, arguments(&head, dynamics, spans))?;
                match values[..] {
                    [b] => Ok(Expression::Bool(!b)),
                    _ => Err(arity(&head, "one", values.len())),
                }
            })
            .rule("StringJoin", |head, dynamics, spans| {
                let mut joined = String::new();
                for argument in arguments(&head, dynamics, spans) {
                    joined.push_str(&argument.get::<String>()?);
                }
                Ok(Expression::String(joined))
            })
            .rule("StringContainsQ", |head, dynamics, spans| {
                let [haystack, needle] = pair(&head, dynamics, spans)?;
                let haystack = haystack.get::<String>()?;
                let needle = needle.get::<String>()?;
                Ok(Expression::Bool(haystack.contains(&needle)))
            })
            .rule("Symbol", |head, dynamics, spans| {
                let args = arguments(&head, dynamics, spans);
                let [name] = <[Expression; 1]>::try_from(args)
                    .map_err(|args| arity(&head, "one", args.len()))?;
                Ok(Expression::Symbol(Symbol::from(name.get::<String>()?)))
            });
        Self { rules }
    }

    /// Evaluate bottom-up: arguments first, then the node itself.
    pub fn reduce(&self, expr: Expression) -> ExpressionResult<Expression> {
        let transformer = expr
            .on("Select")
            .try_apply(|(), dynamics, _| self.select(dynamics))?
            .on("Project")
            .try_apply(|(), dynamics, _| self.project(dynamics))?
            .on("Sort")
            .try_apply(|(), dynamics, _| self.sort(dynamics, None))?
            .on("Top")
            .try_apply(|(), mut dynamics, _| {
                let limit = match dynamics.len() {
                    3 => dynamics
                        .pop()
                        .map(|n| self.reduce(n)?.get::<i64>())
                        .transpose()?,
                    n => return Err(arity(&Symbol::new("Top"), "three", n)),
                };
                self.sort(dynamics, limit)
            })?;
        if transformer.is_matched() {
            return Ok(transformer.into_expression());
        }
        let expr = transformer
            .on(HeadPattern::Any)
            .try_apply_with_head(try_recurse(|child| self.reduce(child)))?
            .into_expression();
        self.rules.apply(expr)
    }

    fn select(&self, dynamics: ExpressionArguments) -> ExpressionResult<Expression> {
        let head = Symbol::new("Select");
        let [table, predicate] = <[Expression; 2]>::try_from(dynamics)
            .map_err(|args| arity(&head, "two", args.len()))?;
        let columns = Table::parse(self.reduce(table)?)?;

        let mask = if predicate.has_head("Function") {
            let keep = self
                .reduce(single_argument(predicate, "Function")?)?
                .get::<bool>()?;
            vec![keep; columns.rows()]
        } else if predicate.has_head("Where") {
            let predicate = single_argument(predicate, "Where")?;
            (0..columns.rows())
                .map(|row| self.reduce(columns.substitute(&predicate, row))?.get::<bool>())
                .collect::<ExpressionResult<Vec<_>>>()?
        } else {
            return Err(ExpressionError::invalid_arguments(
                "Select",
                format!("expected Where or Function, got {}", predicate),
            ));
        };
        trace!("selected {} of {} rows", mask.iter().filter(|&&k| k).count(), mask.len());
        Ok(columns.filter(&mask).into_expression())
    }

    fn project(&self, dynamics: ExpressionArguments) -> ExpressionResult<Expression> {
        let head = Symbol::new("Project");
        let [table, projection] = <[Expression; 2]>::try_from(dynamics)
            .map_err(|args| arity(&head, "two", args.len()))?;
        let columns = Table::parse(self.reduce(table)?)?;
        if !projection.has_head("As") {
            return Err(ExpressionError::invalid_arguments(
                "Project",
                format!("expected As, got {}", projection),
            ));
        }
        let pairs = projection.get::<ComplexExpression>()?.into_arguments();
        if pairs.len() % 2 != 0 {
            return Err(ExpressionError::invalid_arguments(
                "As",
                "expected name and expression pairs",
            ));
        }

        let mut projected = Vec::with_capacity(pairs.len() / 2);
        let mut pairs = pairs.into_iter();
        while let (Some(name), Some(expr)) = (pairs.next(), pairs.next()) {
            let name = name.get::<Symbol>()?;
            let values = (0..columns.rows())
                .map(|row| self.reduce(columns.substitute(&expr, row)))
                .collect::<ExpressionResult<Vec<_>>>()?;
            projected.push(Column { name, values });
        }
        Ok(Table { columns: projected }.into_expression())
    }

    fn sort(
        &self,
        mut dynamics: ExpressionArguments,
        limit: Option<i64>,
    ) -> ExpressionResult<Expression> {
        if dynamics.len() != 2 {
            return Err(arity(&Symbol::new("Sort"), "two", dynamics.len()));
        }
        let by = dynamics.pop().ok_or_else(|| arity(&Symbol::new("Sort"), "two", 0))?;
        let table = dynamics.pop().ok_or_else(|| arity(&Symbol::new("Sort"), "two", 0))?;
        let columns = Table::parse(self.reduce(table)?)?;
        if !by.has_head("By") {
            return Err(ExpressionError::invalid_arguments(
                "Sort",
                format!("expected By, got {}", by),
            ));
        }

        // Sort keys are column names, each optionally followed by `desc`.
        let mut keys: Vec<(usize, bool)> = Vec::new();
        for key in by.get::<ComplexExpression>()?.into_arguments() {
            let key = key.get::<Symbol>()?;
            if key == "desc" {
                match keys.last_mut() {
                    Some(last) => last.1 = true,
                    None => {
                        return Err(ExpressionError::invalid_arguments(
                            "By",
                            "desc without a column",
                        ))
                    }
                }
                continue;
            }
            let index = columns.position(&key).ok_or_else(|| {
                ExpressionError::invalid_arguments("By", format!("unknown column {}", key))
            })?;
            keys.push((index, false));
        }

        let mut order: Vec<usize> = (0..columns.rows()).collect();
        order.sort_by(|&a, &b| {
            keys.iter()
                .map(|&(column, descending)| {
                    let values = &columns.columns[column].values;
                    let order = total_order(&values[a], &values[b]);
                    if descending {
                        order.reverse()
                    } else {
                        order
                    }
                })
                .find(|order| order.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        if let Some(limit) = limit {
            order.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        }
        Ok(columns.reorder(&order).into_expression())
    }
}

impl Default for ReferenceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ReferenceEngine {
    fn evaluate(&self, expr: Expression) -> EngineResult<Expression> {
        Ok(self.reduce(expr)?)
    }
}

struct Column {
    name: Symbol,
    values: Vec<Expression>,
}

/// Column-major table.
struct Table {
    columns: Vec<Column>,
}

impl Table {
    fn parse(table: Expression) -> ExpressionResult<Self> {
        if !table.has_head("Table") {
            return Err(ExpressionError::invalid_arguments(
                "Table",
                format!("expected a table, got {}", table),
            ));
        }
        let mut columns = Vec::new();
        for column in table.get::<ComplexExpression>()?.into_arguments() {
            let column = column.get::<ComplexExpression>()?;
            let name = column.head().clone();
            let list = single_argument(Expression::Complex(column), name.name())?;
            if !list.has_head("List") {
                return Err(ExpressionError::invalid_arguments(
                    name.name(),
                    format!("expected a List of values, got {}", list),
                ));
            }
            let values = list.get::<ComplexExpression>()?.into_arguments();
            columns.push(Column { name, values });
        }
        if let Some(first) = columns.first() {
            let rows = first.values.len();
            if let Some(ragged) = columns.iter().find(|c| c.values.len() != rows) {
                return Err(ExpressionError::invalid_arguments(
                    "Table",
                    format!(
                        "column {} has {} rows, expected {}",
                        ragged.name,
                        ragged.values.len(),
                        rows
                    ),
                ));
            }
        }
        Ok(Table { columns })
    }

    fn rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    fn position(&self, name: &Symbol) -> Option<usize> {
        self.columns.iter().position(|c| c.name == *name)
    }

    /// Copy of `expr` with every column-name symbol replaced by that
    /// column's value in `row`.
    fn substitute(&self, expr: &Expression, row: usize) -> Expression {
        match expr {
            Expression::Symbol(symbol) => match self.position(symbol) {
                Some(index) => self.columns[index].values[row].clone(CloneReason::Substitution),
                None => Expression::Symbol(symbol.clone()),
            },
            Expression::Complex(complex) => {
                let dynamics = complex
                    .dynamic_arguments()
                    .iter()
                    .map(|argument| self.substitute(argument, row))
                    .collect();
                let spans = complex.span_arguments().iter().map(|s| s.clone_owned()).collect();
                Expression::Complex(ComplexExpression::from_parts(
                    complex.head().clone(),
                    (),
                    dynamics,
                    spans,
                ))
            }
            other => other.clone(CloneReason::Substitution),
        }
    }

    fn filter(self, mask: &[bool]) -> Table {
        let columns = self
            .columns
            .into_iter()
            .map(|column| Column {
                name: column.name,
                values: column
                    .values
                    .into_iter()
                    .zip(mask)
                    .filter_map(|(value, &keep)| keep.then_some(value))
                    .collect(),
            })
            .collect();
        Table { columns }
    }

    fn reorder(self, order: &[usize]) -> Table {
        let columns = self
            .columns
            .into_iter()
            .map(|column| {
                let mut slots: Vec<Option<Expression>> =
                    column.values.into_iter().map(Some).collect();
                Column {
                    name: column.name,
                    values: order.iter().filter_map(|&i| slots[i].take()).collect(),
                }
            })
            .collect();
        Table { columns }
    }

    fn into_expression(self) -> Expression {
        let list = ExpressionBuilder::new("List");
        ExpressionBuilder::new("Table")
            .args(self.columns.into_iter().map(|column| {
                ExpressionBuilder::new(column.name)
                    .args([Expression::from(list.args(column.values))])
            }))
            .into()
    }
}

fn arguments(
    head: &Symbol,
    dynamics: ExpressionArguments,
    spans: ExpressionSpanArguments,
) -> Vec<Expression> {
    ComplexExpression::from_parts(head.clone(), (), dynamics, spans).into_arguments()
}

fn pair(
    head: &Symbol,
    dynamics: ExpressionArguments,
    spans: ExpressionSpanArguments,
) -> ExpressionResult<[Expression; 2]> {
    <[Expression; 2]>::try_from(arguments(head, dynamics, spans))
        .map_err(|args| arity(head, "two", args.len()))
}

fn single_argument(expr: Expression, head: &str) -> ExpressionResult<Expression> {
    let args = expr.get::<ComplexExpression>()?.into_arguments();
    let [argument] = <[Expression; 1]>::try_from(args)
        .map_err(|args| arity(&Symbol::new(head), "one", args.len()))?;
    Ok(argument)
}

fn arity(head: &Symbol, expected: &str, actual: usize) -> ExpressionError {
    ExpressionError::invalid_arguments(
        head.name(),
        format!("expected {} arguments, got {}", expected, actual),
    )
}

fn booleans(head: &Symbol, args: Vec<Expression>) -> ExpressionResult<Vec<bool>> {
    args.into_iter()
        .map(|arg| match arg {
            Expression::Bool(b) => Ok(b),
            other => Err(ExpressionError::invalid_arguments(
                head.name(),
                format!("expected bool, got {}", other),
            )),
        })
        .collect()
}

/// Fold numeric arguments, staying in `long` until a `double` shows up.
fn fold_numbers(
    head: &Symbol,
    args: Vec<Expression>,
    init: i64,
    int_op: fn(i64, i64) -> Option<i64>,
    double_op: fn(f64, f64) -> f64,
) -> ExpressionResult<Expression> {
    let mut acc = Expression::Int64(init);
    for arg in args {
        acc = match (acc, arg) {
            (Expression::Int64(a), Expression::Int64(b)) => {
                Expression::Int64(int_op(a, b).ok_or_else(|| {
                    ExpressionError::invalid_arguments(head.name(), "integer overflow")
                })?)
            }
            (Expression::Int64(a), Expression::Double(b)) => {
                Expression::Double(double_op(a as f64, b))
            }
            (Expression::Double(a), Expression::Int64(b)) => {
                Expression::Double(double_op(a, b as f64))
            }
            (Expression::Double(a), Expression::Double(b)) => Expression::Double(double_op(a, b)),
            (_, other) => {
                return Err(ExpressionError::invalid_arguments(
                    head.name(),
                    format!("expected a number, got {}", other),
                ))
            }
        };
    }
    Ok(acc)
}

fn as_f64(expr: &Expression) -> Option<f64> {
    match expr {
        Expression::Int64(i) => Some(*i as f64),
        Expression::Double(d) => Some(*d),
        _ => None,
    }
}

fn compare_scalars(head: &Symbol, a: &Expression, b: &Expression) -> ExpressionResult<Ordering> {
    let order = match (a, b) {
        (Expression::Int64(x), Expression::Int64(y)) => Some(x.cmp(y)),
        (Expression::String(x), Expression::String(y)) => Some(x.cmp(y)),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    };
    order.ok_or_else(|| {
        ExpressionError::invalid_arguments(head.name(), format!("cannot compare {} and {}", a, b))
    })
}

fn scalars_equal(a: &Expression, b: &Expression) -> bool {
    match (a, b) {
        (Expression::Int64(_), Expression::Int64(_)) => a == b,
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
    }
}

/// Ordering used for sorting: numbers by value, then by kind.
fn total_order(a: &Expression, b: &Expression) -> Ordering {
    match (a, b) {
        (Expression::Bool(x), Expression::Bool(y)) => x.cmp(y),
        (Expression::Int64(x), Expression::Int64(y)) => x.cmp(y),
        (Expression::String(x), Expression::String(y)) => x.cmp(y),
        (Expression::Symbol(x), Expression::Symbol(y)) => x.cmp(y),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => a
                .type_index()
                .cmp(&b.type_index())
                .then_with(|| a.to_string().cmp(&b.to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex;
    use crate::expression::Span;

    fn eval(expr: impl Into<Expression>) -> ExpressionResult<Expression> {
        ReferenceEngine::new().reduce(expr.into())
    }

    fn customers() -> Expression {
        complex!(
            "Table",
            complex!("ID", complex!("List", 1, 2, 3)),
            complex!("FirstName", complex!("List", "John", "Sam", "Barbara")),
            complex!("LastName", complex!("List", "McCarthy", "Madden", "Liskov")),
            complex!("BirthYear", complex!("List", 1927, 1976, 1939))
        )
        .into()
    }

    fn column(name: &str) -> Expression {
        Expression::from(Symbol::new(name))
    }

    #[test]
    fn test_arithmetic() -> ExpressionResult<()> {
        assert_eq!(eval(complex!("Plus", 5, 4))?, Expression::Int64(9));
        assert_eq!(eval(complex!("Plus", 5, 2, 2))?, Expression::Int64(9));
        assert_eq!(eval(complex!("Plus", complex!("Plus", 2, 3), 2, 2))?, Expression::Int64(9));
        assert_eq!(eval(complex!("Plus", 2.5, 2.5))?, Expression::Double(5.0));
        assert_eq!(eval(complex!("Times", 2, 3, 4))?, Expression::Int64(24));
        assert_eq!(eval(complex!("Minus", 10, 4))?, Expression::Int64(6));
        assert_eq!(eval(complex!("Minus", 1.5))?, Expression::Double(-1.5));
        assert!(eval(complex!("Plus", 1, "x")).is_err());
        assert!(eval(complex!("Plus", i64::MAX, 1)).is_err());
        Ok(())
    }

    #[test]
    fn test_span_sum() -> ExpressionResult<()> {
        let e = ExpressionBuilder::new("Plus").spans([Span::from_vec(vec![1i64, 2, 3])]);
        assert_eq!(eval(e)?, Expression::Int64(6));
        Ok(())
    }

    #[test]
    fn test_logic_and_strings() -> ExpressionResult<()> {
        assert_eq!(eval(complex!("Greater", 5, 2))?, Expression::Bool(true));
        assert_eq!(eval(complex!("Greater", 2, 5))?, Expression::Bool(false));
        assert_eq!(eval(complex!("Equal", 2, 2.0))?, Expression::Bool(true));
        assert_eq!(
            eval(complex!("And", true, complex!("Not", false)))?,
            Expression::Bool(true)
        );
        assert_eq!(eval(complex!("Or", false, false))?, Expression::Bool(false));
        assert_eq!(
            eval(complex!("StringJoin", "howdie", " ", "world"))?,
            Expression::from("howdie world")
        );
        assert_eq!(
            eval(complex!("StringContainsQ", "Madden", "dd"))?,
            Expression::Bool(true)
        );
        assert_eq!(
            eval(complex!("Symbol", "x"))?,
            Expression::from(Symbol::new("x"))
        );
        Ok(())
    }

    #[test]
    fn test_unknown_heads_keep_evaluated_arguments() -> ExpressionResult<()> {
        assert_eq!(
            eval(complex!("UndefinedFunction", complex!("Plus", 4, 5)))?,
            complex!("UndefinedFunction", 9)
        );
        assert_eq!(eval(Expression::from(9))?, Expression::Int64(9));
        Ok(())
    }

    #[test]
    fn test_select() -> ExpressionResult<()> {
        let values: Expression = complex!(
            "Table",
            complex!("Value", complex!("List", 2, 3, 1, 4, 1))
        )
        .into();
        let result = eval(complex!(
            "Select",
            values,
            complex!("Where", complex!("Greater", column("Value"), 3))
        ))?;
        assert_eq!(result, complex!("Table", complex!("Value", complex!("List", 4))));

        let madden = eval(complex!(
            "Select",
            customers(),
            complex!("Where", complex!("StringContainsQ", column("LastName"), "Madden"))
        ))?;
        assert_eq!(
            madden,
            complex!(
                "Table",
                complex!("ID", complex!("List", 2)),
                complex!("FirstName", complex!("List", "Sam")),
                complex!("LastName", complex!("List", "Madden")),
                complex!("BirthYear", complex!("List", 1976))
            )
        );

        assert_eq!(eval(complex!("Select", customers(), complex!("Function", true)))?, customers());
        Ok(())
    }

    #[test]
    fn test_select_nothing_keeps_columns() -> ExpressionResult<()> {
        let none = eval(complex!(
            "Select",
            customers(),
            complex!("Where", complex!("Equal", column("BirthYear"), 0))
        ))?;
        assert_eq!(
            none,
            complex!(
                "Table",
                complex!("ID", complex!("List")),
                complex!("FirstName", complex!("List")),
                complex!("LastName", complex!("List")),
                complex!("BirthYear", complex!("List"))
            )
        );
        Ok(())
    }

    #[test]
    fn test_project() -> ExpressionResult<()> {
        let values: Expression = complex!(
            "Table",
            complex!("Value", complex!("List", 10, 20, 30, 40, 50))
        )
        .into();
        let result = eval(complex!(
            "Project",
            values,
            complex!(
                "As",
                Symbol::new("Result"),
                complex!(
                    "And",
                    complex!("Greater", column("Value"), 25),
                    complex!("Greater", 45, column("Value"))
                )
            )
        ))?;
        assert_eq!(
            result,
            complex!("Table", complex!("Result", complex!("List", false, false, true, true, false)))
        );

        let names = eval(complex!(
            "Project",
            customers(),
            complex!("As", Symbol::new("FirstName"), column("FirstName"))
        ))?;
        assert_eq!(
            names,
            complex!("Table", complex!("FirstName", complex!("List", "John", "Sam", "Barbara")))
        );
        Ok(())
    }

    #[test]
    fn test_sort_and_top() -> ExpressionResult<()> {
        let by_last_name = eval(complex!(
            "Sort",
            complex!("Select", customers(), complex!("Function", true)),
            complex!("By", column("LastName"))
        ))?;
        assert_eq!(
            by_last_name,
            complex!(
                "Table",
                complex!("ID", complex!("List", 3, 2, 1)),
                complex!("FirstName", complex!("List", "Barbara", "Sam", "John")),
                complex!("LastName", complex!("List", "Liskov", "Madden", "McCarthy")),
                complex!("BirthYear", complex!("List", 1939, 1976, 1927))
            )
        );

        let youngest = eval(complex!(
            "Top",
            customers(),
            complex!("By", column("BirthYear"), column("desc")),
            1
        ))?;
        assert_eq!(
            youngest,
            complex!(
                "Table",
                complex!("ID", complex!("List", 2)),
                complex!("FirstName", complex!("List", "Sam")),
                complex!("LastName", complex!("List", "Madden")),
                complex!("BirthYear", complex!("List", 1976))
            )
        );
        Ok(())
    }

    #[test]
    fn test_top_limit_is_evaluated() -> ExpressionResult<()> {
        let oldest_two = eval(complex!(
            "Top",
            customers(),
            complex!("By", column("BirthYear")),
            complex!("Plus", 1, 1)
        ))?;
        assert_eq!(
            oldest_two,
            complex!(
                "Table",
                complex!("ID", complex!("List", 1, 3)),
                complex!("FirstName", complex!("List", "John", "Barbara")),
                complex!("LastName", complex!("List", "McCarthy", "Liskov")),
                complex!("BirthYear", complex!("List", 1927, 1939))
            )
        );
        assert!(eval(complex!("Top", customers(), complex!("By", column("ID")), "two")).is_err());
        Ok(())
    }

    #[test]
    fn test_malformed_tables() {
        assert!(eval(complex!("Select", 5, complex!("Function", true))).is_err());
        let ragged = complex!(
            "Table",
            complex!("A", complex!("List", 1, 2)),
            complex!("B", complex!("List", 1))
        );
        assert!(eval(complex!("Select", ragged, complex!("Function", true))).is_err());
        assert!(eval(complex!("Sort", customers(), complex!("By", column("Nope")))).is_err());
    }
}
