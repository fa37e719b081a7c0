//! Incremental satisfiability session.
//!
//! A [`Session`] owns the constraints of one built [`Model`] plus a strict
//! stack of temporary constraints. `push`/`check`/`pop` form the incremental
//! discipline the refutation scorer relies on: `check` copies the domain
//! table per query, so repeated probes never invalidate shared state. A
//! session has a single owner and is never shared across threads; callers
//! wanting parallel queries over independent grids open one session each.
//!
//! Domains are bitmasks over the values 1..=n (bit v set means v is still
//! possible). Checking runs fixpoint propagation and then backtracking
//! search, branching on a minimum-domain variable with values ascending.
//!
//! When a query is unsatisfiable the session reports a certificate size:
//! the number of candidate eliminations forced while refuting the query,
//! plus one for every exhausted branch point. Small certificates mean the
//! contradiction was near the surface.

use log::trace;

use super::model::{Constraint, Model, VarId};

/// Result of a satisfiability check.
#[derive(Debug, Clone)]
pub(crate) enum Outcome {
    /// Satisfiable, with one witness value per variable.
    Sat(Vec<u8>),
    /// Unsatisfiable, with the refutation certificate size.
    Unsat { steps: u32 },
}

impl Outcome {
    pub(crate) fn is_sat(&self) -> bool {
        matches!(self, Outcome::Sat(_))
    }
}

/// An incremental constraint-solving session over one model.
pub(crate) struct Session {
    n: usize,
    var_count: usize,
    base: Vec<Constraint>,
    /// Temporary constraints, pushed and popped in strict stack order.
    pushed: Vec<Constraint>,
}

impl Session {
    pub(crate) fn new(model: Model) -> Session {
        Session {
            n: model.n,
            var_count: model.var_count,
            base: model.constraints,
            pushed: Vec::new(),
        }
    }

    /// Push a temporary constraint on top of the base model.
    pub(crate) fn push(&mut self, constraint: Constraint) {
        self.pushed.push(constraint);
    }

    /// Remove the most recently pushed temporary constraint.
    pub(crate) fn pop(&mut self) {
        let removed = self.pushed.pop();
        debug_assert!(removed.is_some(), "pop without a matching push");
    }

    /// Check satisfiability of the base model plus all pushed constraints.
    pub(crate) fn check(&self) -> Outcome {
        trace!(
            "check: {} vars, {} base + {} pushed constraints",
            self.var_count,
            self.base.len(),
            self.pushed.len()
        );
        let full = domain_mask(self.n);
        let mut domains = vec![full; self.var_count];
        let mut steps = 0u32;
        match self.search(&mut domains, &mut steps) {
            Some(witness) => Outcome::Sat(witness),
            None => Outcome::Unsat {
                steps: steps.max(1),
            },
        }
    }

    fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.base.iter().chain(self.pushed.iter())
    }

    /// Backtracking search. Returns a witness assignment, or `None` with
    /// `steps` accumulating the refutation certificate.
    fn search(&self, domains: &mut [u32], steps: &mut u32) -> Option<Vec<u8>> {
        if !self.propagate(domains, steps) {
            return None;
        }

        // Minimum-remaining-values branching; first index breaks ties.
        let branch = (0..self.var_count)
            .filter(|&v| domains[v].count_ones() > 1)
            .min_by_key(|&v| domains[v].count_ones());
        let var = match branch {
            Some(var) => var,
            None => {
                // Every domain is a singleton; propagation at fixpoint
                // guarantees the assignment satisfies all constraints.
                return Some(domains.iter().map(|d| d.trailing_zeros() as u8).collect());
            }
        };

        for v in 1..=self.n as u8 {
            if domains[var] & bit(v) == 0 {
                continue;
            }
            let mut child: Vec<u32> = domains.to_vec();
            child[var] = bit(v);
            if let Some(witness) = self.search(&mut child, steps) {
                return Some(witness);
            }
        }
        // Exhausted branch point counts as one refutation step.
        *steps += 1;
        None
    }

    /// Prune domains to a fixpoint. Returns false on a wiped-out domain.
    /// Every value removed from a domain adds one refutation step.
    fn propagate(&self, domains: &mut [u32], steps: &mut u32) -> bool {
        loop {
            let mut changed = false;
            for constraint in self.constraints() {
                match constraint {
                    Constraint::Fixed(VarId(v), value) => {
                        if !prune(domains, *v, bit(*value), &mut changed, steps) {
                            return false;
                        }
                    }
                    Constraint::Less(VarId(a), VarId(b)) => {
                        // a < b: a may not reach b's maximum, b must exceed
                        // a's minimum.
                        let hi = 31 - domains[*b].leading_zeros();
                        if !prune(domains, *a, below(hi), &mut changed, steps) {
                            return false;
                        }
                        let lo = domains[*a].trailing_zeros();
                        if !prune(domains, *b, above(lo, self.n), &mut changed, steps) {
                            return false;
                        }
                    }
                    Constraint::AllDifferent(vars) => {
                        for (i, &VarId(v)) in vars.iter().enumerate() {
                            if domains[v].count_ones() != 1 {
                                continue;
                            }
                            let taken = domains[v];
                            for (j, &VarId(w)) in vars.iter().enumerate() {
                                if i != j && !prune(domains, w, !taken, &mut changed, steps) {
                                    return false;
                                }
                            }
                        }
                    }
                }
            }
            if !changed {
                return true;
            }
        }
    }
}

/// Bit for value v.
fn bit(v: u8) -> u32 {
    1 << v
}

/// Mask of all values 1..=n.
fn domain_mask(n: usize) -> u32 {
    ((1u32 << (n + 1)) - 1) & !1
}

/// Mask of values strictly below v.
fn below(v: u32) -> u32 {
    (1u32 << v).wrapping_sub(2)
}

/// Mask of values strictly above v, capped at n.
fn above(v: u32, n: usize) -> u32 {
    domain_mask(n) & !((1u32 << (v + 1)) - 1)
}

/// Intersect a domain with `mask`, counting removed values. Returns false
/// if the domain wipes out.
fn prune(domains: &mut [u32], var: usize, mask: u32, changed: &mut bool, steps: &mut u32) -> bool {
    let old = domains[var];
    let new = old & mask;
    if new != old {
        *steps += old.count_ones() - new.count_ones();
        *changed = true;
        domains[var] = new;
    }
    new != 0
}
