//! Solver-independent integer linear model.
//!
//! Mirrors the shape of a CP-SAT model builder: bounded integer variables, linear constraints with
//! integer coefficients, and one objective to maximize. Backends in [`crate::solver`] translate it.
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Handle to a model variable; indexes [`Model::vars`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarInfo {
    pub name: String,
    pub lower: i64,
    pub upper: i64,
}

impl VarInfo {
    pub fn is_binary(&self) -> bool {
        self.lower == 0 && self.upper == 1
    }
}

/// `sum(coef * var) + constant`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearExpr {
    pub terms: Vec<(i64, VarId)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constant(value: i64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    pub fn add_term(&mut self, coef: i64, var: VarId) {
        if coef != 0 {
            self.terms.push((coef, var));
        }
    }

    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn eval(&self, values: &[i64]) -> i64 {
        self.terms
            .iter()
            .map(|(c, v)| c * values[v.0])
            .sum::<i64>()
            + self.constant
    }

    /// Merges repeated variables and drops zero coefficients.
    pub fn simplified(&self) -> Self {
        let mut terms: Vec<(i64, VarId)> = Vec::with_capacity(self.terms.len());
        let mut sorted = self.terms.clone();
        sorted.sort_by_key(|(_, v)| *v);
        for (c, v) in sorted {
            match terms.last_mut() {
                Some((acc, last)) if *last == v => *acc += c,
                _ => terms.push((c, v)),
            }
        }
        terms.retain(|(c, _)| *c != 0);
        Self {
            terms,
            constant: self.constant,
        }
    }
}

impl From<VarId> for LinearExpr {
    fn from(var: VarId) -> Self {
        Self {
            terms: vec![(1, var)],
            constant: 0,
        }
    }
}

impl From<i64> for LinearExpr {
    fn from(value: i64) -> Self {
        Self::constant(value)
    }
}

impl From<i32> for LinearExpr {
    fn from(value: i32) -> Self {
        Self::constant(i64::from(value))
    }
}

impl FromIterator<VarId> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = VarId>>(iter: I) -> Self {
        iter.into_iter().map(|v| (1, v)).collect()
    }
}

impl FromIterator<(i64, VarId)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (i64, VarId)>>(iter: I) -> Self {
        let mut expr = LinearExpr::new();
        for (c, v) in iter {
            expr.add_term(c, v);
        }
        expr
    }
}

impl<T: Into<LinearExpr>> Add<T> for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: T) -> LinearExpr {
        self += rhs;
        self
    }
}

impl<T: Into<LinearExpr>> AddAssign<T> for LinearExpr {
    fn add_assign(&mut self, rhs: T) {
        let rhs = rhs.into();
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
    }
}

impl<T: Into<LinearExpr>> Sub<T> for LinearExpr {
    type Output = LinearExpr;

    fn sub(self, rhs: T) -> LinearExpr {
        self + (-rhs.into())
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> LinearExpr {
        self * -1
    }
}

impl Mul<i64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(self, k: i64) -> LinearExpr {
        LinearExpr {
            terms: self
                .terms
                .into_iter()
                .map(|(c, v)| (c * k, v))
                .filter(|(c, _)| *c != 0)
                .collect(),
            constant: self.constant * k,
        }
    }
}

/// Which constraint family a constraint belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConstraintKind {
    ShiftImpliesBlock,
    BlockNeedsShift,
    OrphanBlock,
    OneShiftPerDay,
    WeeklyShiftCap,
    LongShiftCap,
    WeekendShiftCap,
    Coverage,
    RecitationCap,
    RecitationDemand,
    Overlap,
    Commitment,
    GlobalMinimum,
    BuddyLink,
    Override,
}

/// `lower <= expr <= upper`; a missing side is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub expr: LinearExpr,
    pub lower: Option<i64>,
    pub upper: Option<i64>,
}

impl LinearConstraint {
    pub fn is_satisfied(&self, values: &[i64]) -> bool {
        let v = self.expr.eval(values);
        self.lower.is_none_or(|lo| v >= lo) && self.upper.is_none_or(|hi| v <= hi)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    vars: Vec<VarInfo>,
    constraints: Vec<LinearConstraint>,
    objective: LinearExpr,
    trivially_infeasible: Option<ConstraintKind>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        self.new_int_var(name, 0, 1)
    }

    pub fn new_int_var(&mut self, name: impl Into<String>, lower: i64, upper: i64) -> VarId {
        self.vars.push(VarInfo {
            name: name.into(),
            lower,
            upper,
        });
        VarId(self.vars.len() - 1)
    }

    /// Adds `lower <= expr <= upper`.
    ///
    /// The expression's constant is folded into the bounds. A constraint with no variables is
    /// decided on the spot: dropped when it holds, recorded as infeasibility when it doesn't.
    pub fn add_range(
        &mut self,
        kind: ConstraintKind,
        expr: impl Into<LinearExpr>,
        lower: Option<i64>,
        upper: Option<i64>,
    ) {
        let expr = expr.into().simplified();
        let k = expr.constant;
        let lower = lower.map(|lo| lo - k);
        let upper = upper.map(|hi| hi - k);
        if expr.is_constant() {
            let holds = lower.is_none_or(|lo| lo <= 0) && upper.is_none_or(|hi| hi >= 0);
            if !holds && self.trivially_infeasible.is_none() {
                self.trivially_infeasible = Some(kind);
            }
            return;
        }
        self.constraints.push(LinearConstraint {
            kind,
            expr: LinearExpr {
                terms: expr.terms,
                constant: 0,
            },
            lower,
            upper,
        });
    }

    pub fn add_le(
        &mut self,
        kind: ConstraintKind,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) {
        self.add_range(kind, lhs.into() - rhs.into(), None, Some(0));
    }

    pub fn add_ge(
        &mut self,
        kind: ConstraintKind,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) {
        self.add_range(kind, lhs.into() - rhs.into(), Some(0), None);
    }

    pub fn add_eq(
        &mut self,
        kind: ConstraintKind,
        lhs: impl Into<LinearExpr>,
        rhs: impl Into<LinearExpr>,
    ) {
        self.add_range(kind, lhs.into() - rhs.into(), Some(0), Some(0));
    }

    pub fn maximize(&mut self, objective: impl Into<LinearExpr>) {
        self.objective = objective.into().simplified();
    }

    pub fn vars(&self) -> &[VarInfo] {
        &self.vars
    }

    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// The first constraint family found unsatisfiable while building, if any.
    pub fn trivially_infeasible(&self) -> Option<ConstraintKind> {
        self.trivially_infeasible
    }

    pub fn count(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    pub fn evaluate(&self, values: &[i64]) -> i64 {
        self.objective.eval(values)
    }

    /// Constraints (and variable bounds) the assignment breaks.
    pub fn violations(&self, values: &[i64]) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(kind) = self.trivially_infeasible {
            out.push(format!("{kind:?} constraint has no satisfying assignment"));
        }
        for (info, v) in self.vars.iter().zip(values) {
            if *v < info.lower || *v > info.upper {
                out.push(format!("{} = {v} outside [{}, {}]", info.name, info.lower, info.upper));
            }
        }
        for c in self.constraints.iter().filter(|c| !c.is_satisfied(values)) {
            out.push(format!("{:?}: {}", c.kind, self.describe(c)));
        }
        out
    }

    pub fn describe(&self, c: &LinearConstraint) -> String {
        let body = c
            .expr
            .terms
            .iter()
            .map(|(coef, v)| format!("{coef}*{}", self.vars[v.0].name))
            .collect::<Vec<_>>()
            .join(" + ");
        let lo = c.lower.map(|l| l.to_string()).unwrap_or_else(|| "-inf".into());
        let hi = c.upper.map(|h| h.to_string()).unwrap_or_else(|| "inf".into());
        format!("{lo} <= {body} <= {hi}")
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables, {} constraints, {} objective terms",
            self.vars.len(),
            self.constraints.len(),
            self.objective.terms.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_fold_into_bounds() {
        let mut model = Model::new();
        let x = model.new_bool_var("x");
        let y = model.new_bool_var("y");
        // x + y - 1 <= b  ==>  x + y - b <= 1
        let b = model.new_bool_var("b");
        model.add_le(
            ConstraintKind::BuddyLink,
            LinearExpr::from(x) + y - 1,
            b,
        );
        let c = &model.constraints()[0];
        assert_eq!(c.upper, Some(1));
        assert_eq!(c.lower, None);
        assert!(c.is_satisfied(&[1, 1, 1]));
        assert!(!c.is_satisfied(&[1, 1, 0]));
    }

    #[test]
    fn repeated_vars_merge() {
        let mut model = Model::new();
        let x = model.new_bool_var("x");
        model.add_le(ConstraintKind::BuddyLink, LinearExpr::from(x) + x, 1);
        assert_eq!(model.constraints()[0].expr.terms, vec![(2, x)]);
    }

    #[test]
    fn empty_constraints_decided_immediately() {
        let mut model = Model::new();
        model.add_range(ConstraintKind::Coverage, LinearExpr::new(), Some(0), Some(1));
        assert!(model.constraints().is_empty());
        assert_eq!(model.trivially_infeasible(), None);

        model.add_range(ConstraintKind::Coverage, LinearExpr::new(), Some(1), Some(2));
        assert_eq!(model.trivially_infeasible(), Some(ConstraintKind::Coverage));
        assert_eq!(model.violations(&[]).len(), 1);
    }

    #[test]
    fn evaluate_objective_and_violations() {
        let mut model = Model::new();
        let x = model.new_bool_var("x");
        let y = model.new_bool_var("y");
        model.add_le(ConstraintKind::Overlap, LinearExpr::from(x) + y, 1);
        model.maximize(LinearExpr::from_iter([(3_i64, x), (2_i64, y)]));
        assert_eq!(model.evaluate(&[1, 0]), 3);
        assert!(model.violations(&[1, 0]).is_empty());
        assert_eq!(model.violations(&[1, 1]).len(), 1);
        assert_eq!(model.violations(&[2, 0]).len(), 2);
        assert_eq!(model.count(ConstraintKind::Overlap), 1);
    }
}
