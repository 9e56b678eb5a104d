use super::LogicValue::{self, *};
use indexmap::IndexSet;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Boolean function over the pins of a gate, evaluated in the four-valued [LogicValue] model.
///
/// Functions are built from [var] and [constant] and combined with the `!`, `&`, `|` and `^` operators.
///
/// # Example
/// ```
/// # use netsim::{var, LogicValue};
/// # use std::collections::HashMap;
/// let f = var("A") & !var("B");
///
/// let mut inputs = HashMap::new();
/// inputs.insert("A".to_string(), LogicValue::One);
/// inputs.insert("B".to_string(), LogicValue::Zero);
/// assert_eq!(f.evaluate(&inputs), LogicValue::One);
///
/// // B is unknown, so is the result.
/// inputs.insert("B".to_string(), LogicValue::X);
/// assert_eq!(f.evaluate(&inputs), LogicValue::X);
///
/// // A controlling 0 wins over unknowns.
/// inputs.insert("A".to_string(), LogicValue::Zero);
/// assert_eq!(f.evaluate(&inputs), LogicValue::Zero);
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum BooleanFunction {
    Constant(LogicValue),
    Variable(String),
    Not(Box<BooleanFunction>),
    And(Box<BooleanFunction>, Box<BooleanFunction>),
    Or(Box<BooleanFunction>, Box<BooleanFunction>),
    Xor(Box<BooleanFunction>, Box<BooleanFunction>),
}
use BooleanFunction::{And, Constant, Or, Variable, Xor};

/// Returns a [BooleanFunction] that reads the pin `name`.
pub fn var<S: Into<String>>(name: S) -> BooleanFunction {
    Variable(name.into())
}

/// Returns a [BooleanFunction] that always evaluates to `value`.
pub fn constant(value: LogicValue) -> BooleanFunction {
    Constant(value)
}

impl BooleanFunction {
    /// Evaluates the function, pins missing from `inputs` are treated as [X].
    pub fn evaluate(&self, inputs: &HashMap<String, LogicValue>) -> LogicValue {
        match self {
            Constant(v) => *v,
            Variable(name) => inputs.get(name).copied().unwrap_or(X),
            BooleanFunction::Not(f) => match f.evaluate(inputs) {
                Zero => One,
                One => Zero,
                X | Z => X,
            },
            And(a, b) => match (a.evaluate(inputs), b.evaluate(inputs)) {
                (Zero, _) | (_, Zero) => Zero,
                (One, One) => One,
                _ => X,
            },
            Or(a, b) => match (a.evaluate(inputs), b.evaluate(inputs)) {
                (One, _) | (_, One) => One,
                (Zero, Zero) => Zero,
                _ => X,
            },
            Xor(a, b) => match (a.evaluate(inputs), b.evaluate(inputs)) {
                (Zero, Zero) | (One, One) => Zero,
                (Zero, One) | (One, Zero) => One,
                _ => X,
            },
        }
    }

    /// Returns the names of all pins referenced by the function in order of appearance.
    pub fn variables(&self) -> IndexSet<String> {
        let mut vars = IndexSet::new();
        self.collect_variables(&mut vars);
        vars
    }

    fn collect_variables(&self, vars: &mut IndexSet<String>) {
        match self {
            Constant(_) => {}
            Variable(name) => {
                vars.insert(name.clone());
            }
            BooleanFunction::Not(f) => f.collect_variables(vars),
            And(a, b) | Or(a, b) | Xor(a, b) => {
                a.collect_variables(vars);
                b.collect_variables(vars);
            }
        }
    }

    /// Returns a copy of the function in which every occurrence of `name` is replaced by `with`.
    pub fn substitute(&self, name: &str, with: &BooleanFunction) -> BooleanFunction {
        match self {
            Variable(v) if v == name => with.clone(),
            Constant(_) | Variable(_) => self.clone(),
            BooleanFunction::Not(f) => !f.substitute(name, with),
            And(a, b) => a.substitute(name, with) & b.substitute(name, with),
            Or(a, b) => a.substitute(name, with) | b.substitute(name, with),
            Xor(a, b) => a.substitute(name, with) ^ b.substitute(name, with),
        }
    }

    /// Returns true if the function references pin `name`.
    pub fn depends_on(&self, name: &str) -> bool {
        match self {
            Constant(_) => false,
            Variable(v) => v == name,
            BooleanFunction::Not(f) => f.depends_on(name),
            And(a, b) | Or(a, b) | Xor(a, b) => a.depends_on(name) || b.depends_on(name),
        }
    }
}

impl Not for BooleanFunction {
    type Output = BooleanFunction;
    fn not(self) -> BooleanFunction {
        BooleanFunction::Not(Box::new(self))
    }
}

impl BitAnd for BooleanFunction {
    type Output = BooleanFunction;
    fn bitand(self, rhs: BooleanFunction) -> BooleanFunction {
        And(Box::new(self), Box::new(rhs))
    }
}

impl BitOr for BooleanFunction {
    type Output = BooleanFunction;
    fn bitor(self, rhs: BooleanFunction) -> BooleanFunction {
        Or(Box::new(self), Box::new(rhs))
    }
}

impl BitXor for BooleanFunction {
    type Output = BooleanFunction;
    fn bitxor(self, rhs: BooleanFunction) -> BooleanFunction {
        Xor(Box::new(self), Box::new(rhs))
    }
}

impl From<LogicValue> for BooleanFunction {
    fn from(v: LogicValue) -> Self {
        Constant(v)
    }
}

impl Display for BooleanFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Constant(v) => write!(f, "{}", v),
            Variable(name) => write!(f, "{}", name),
            BooleanFunction::Not(inner) => write!(f, "!{}", inner),
            And(a, b) => write!(f, "({} & {})", a, b),
            Or(a, b) => write!(f, "({} | {})", a, b),
            Xor(a, b) => write!(f, "({} ^ {})", a, b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn inputs(values: &[(&str, LogicValue)]) -> HashMap<String, LogicValue> {
        values.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_known_truth_tables() {
        let and = var("A") & var("B");
        let or = var("A") | var("B");
        let xor = var("A") ^ var("B");
        for a in [false, true] {
            for b in [false, true] {
                let i = inputs(&[("A", a.into()), ("B", b.into())]);
                assert_eq!(and.evaluate(&i), LogicValue::from_bool(a && b));
                assert_eq!(or.evaluate(&i), LogicValue::from_bool(a || b));
                assert_eq!(xor.evaluate(&i), LogicValue::from_bool(a ^ b));
            }
        }
    }

    #[test]
    fn test_unknown_propagation() {
        for unknown in [X, Z] {
            let i = inputs(&[("A", unknown), ("B", One)]);
            assert_eq!((var("A") & var("B")).evaluate(&i), X);
            assert_eq!((var("A") | var("B")).evaluate(&i), One);
            assert_eq!((var("A") ^ var("B")).evaluate(&i), X);
            assert_eq!((!var("A")).evaluate(&i), X);
        }
        let i = inputs(&[("A", Z), ("B", Zero)]);
        assert_eq!((var("A") & var("B")).evaluate(&i), Zero);
        assert_eq!((var("A") | var("B")).evaluate(&i), X);
    }

    #[test]
    fn test_missing_variable_is_unknown() {
        assert_eq!(var("Q").evaluate(&HashMap::new()), X);
        for v in LogicValue::iter() {
            assert_eq!(constant(v).evaluate(&HashMap::new()), v);
        }
    }

    #[test]
    fn test_variables() {
        let f = (var("B") & var("A")) | !var("B");
        let vars: Vec<_> = f.variables().into_iter().collect();
        assert_eq!(vars, vec!["B".to_string(), "A".to_string()]);
        assert!(f.depends_on("A"));
        assert!(!f.depends_on("C"));
    }

    #[test]
    fn test_substitute() {
        let f = var("O1") ^ var("C");
        let g = f.substitute("O1", &(var("A") & var("B")));
        assert_eq!(g.to_string(), "((A & B) ^ C)");
        assert!(!g.depends_on("O1"));
    }
}
