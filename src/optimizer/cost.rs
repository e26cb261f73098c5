//! The analytic cost model the optimizer's rule log and `JoinReorder`
//! score against. Every formula is the literal one named in the
//! documented optimizer design: no learned model, no sampling, no
//! table statistics beyond a single assumed default cardinality (the
//! schema format carries no per-table row-count field).

use crate::parser::ast::BinOp;
use crate::plan::{LogicalPlan, PlanPatternElement, PlanRef};

/// Assumed row count for any table the schema does not otherwise give
/// us statistics for. A placeholder analytic constant, not a measured
/// value - every `Scan`/`GraphMatch` leaf estimates from this same
/// number, so relative comparisons (which side of a `Join` is smaller)
/// still work out whenever the two sides draw from a different number
/// of distinct pattern variables or hop counts.
pub const DEFAULT_TABLE_CARDINALITY: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    pub rows: f64,
    pub time_ms: f64,
    pub selectivity: f64,
    pub confidence: f64,
}

impl CostEstimate {
    fn scan() -> Self {
        Self {
            rows: DEFAULT_TABLE_CARDINALITY,
            time_ms: DEFAULT_TABLE_CARDINALITY / 1e4,
            selectivity: 1.0,
            confidence: 1.0,
        }
    }
}

/// The default per-operator selectivity the `Filter` formula uses when
/// no better estimate is available, keyed by the comparison actually
/// used (`=` is the most selective; `CONTAINS`/`STARTS WITH`/`ENDS
/// WITH` the least; everything else an unknown-mid-point guess).
fn filter_selectivity(predicate: &crate::parser::ast::Expr<'_>) -> f64 {
    use crate::parser::ast::Expr;
    match predicate {
        Expr::Binary { op, .. } => match op {
            BinOp::Eq => 0.1,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 0.3,
            BinOp::Contains | BinOp::StartsWith | BinOp::EndsWith => 0.5,
            BinOp::And => {
                // A conjunction is at least as selective as its most
                // selective conjunct; approximate with the minimum of
                // `0.5` defaults rather than recursing per spec's
                // "unknown 0.5" fallback.
                0.5
            }
            _ => 0.5,
        },
        _ => 0.5,
    }
}

fn hops(elements: &[PlanPatternElement<'_>]) -> u32 {
    elements
        .iter()
        .filter(|e| matches!(e, PlanPatternElement::Rel(_)))
        .count() as u32
}

/// Estimate `{rows, time_ms, selectivity, confidence}` for `plan`,
/// recursing bottom-up through its children. Pure function of the
/// plan shape: no schema lookups, since the formulas spec.md names
/// only ever reference row counts and hop counts already implied by
/// the tree.
pub fn estimate(plan: &PlanRef<'_>) -> CostEstimate {
    match plan.as_ref() {
        LogicalPlan::Scan { .. } => CostEstimate::scan(),

        LogicalPlan::GraphMatch { elements, .. } => {
            let base = DEFAULT_TABLE_CARDINALITY;
            let h = hops(elements);
            let factor = 2f64.powi(h as i32);
            CostEstimate {
                rows: base * factor,
                time_ms: base * 1e-3 * factor,
                selectivity: 1.0,
                confidence: 1.0,
            }
        }

        LogicalPlan::ShortestPaths { max_len, .. } => {
            let base = DEFAULT_TABLE_CARDINALITY;
            let h = max_len.unwrap_or(1).max(1);
            let factor = 2f64.powi(h as i32);
            CostEstimate {
                rows: base * factor,
                time_ms: base * 1e-3 * factor,
                selectivity: 1.0,
                confidence: 0.8,
            }
        }

        LogicalPlan::AllPaths { max_len, .. } => {
            let base = DEFAULT_TABLE_CARDINALITY;
            let factor = 2f64.powi((*max_len).max(1) as i32);
            CostEstimate {
                rows: base * factor,
                time_ms: base * 1e-3 * factor,
                selectivity: 1.0,
                confidence: 0.7,
            }
        }

        LogicalPlan::Filter { child, predicate } => {
            let c = estimate(child);
            let selectivity = filter_selectivity(predicate);
            CostEstimate {
                rows: c.rows * selectivity,
                time_ms: c.rows * 1e-5,
                selectivity,
                confidence: c.confidence * 0.9,
            }
        }

        LogicalPlan::Join { left, right, .. } => {
            let l = estimate(left);
            let r = estimate(right);
            let max_card = l.rows.max(r.rows).max(1.0);
            CostEstimate {
                rows: (l.rows * r.rows) / max_card,
                time_ms: (l.rows + r.rows) * 5e-4,
                selectivity: 1.0,
                confidence: l.confidence * r.confidence * 0.8,
            }
        }

        LogicalPlan::Unwind { child, .. } => {
            let c = estimate(child);
            // A list-valued expression's expansion factor is unknown
            // at plan time; 5 is an assumed average fan-out, same
            // order of magnitude as the default selectivities above.
            CostEstimate {
                rows: c.rows * 5.0,
                time_ms: c.rows * 2e-5,
                selectivity: c.selectivity,
                confidence: c.confidence * 0.7,
            }
        }

        LogicalPlan::Project { child, .. } => {
            let c = estimate(child);
            CostEstimate {
                rows: c.rows,
                time_ms: c.rows * 1e-5,
                selectivity: c.selectivity,
                confidence: c.confidence,
            }
        }

        LogicalPlan::Aggregate { child, group_keys, .. } => {
            let c = estimate(child);
            // Grouping cardinality is bounded by input rows and grows
            // with the number of group keys; without distinct-value
            // statistics, approximate with a square-root heuristic
            // when there is at least one group key, else a single row.
            let rows = if group_keys.is_empty() {
                1.0
            } else {
                c.rows.sqrt().max(1.0)
            };
            CostEstimate {
                rows,
                time_ms: c.rows * 2e-5,
                selectivity: c.selectivity,
                confidence: c.confidence * 0.85,
            }
        }

        LogicalPlan::Sort { child, .. } => {
            let c = estimate(child);
            CostEstimate {
                rows: c.rows,
                time_ms: c.rows * (c.rows.max(2.0).log2()) * 1e-5,
                selectivity: c.selectivity,
                confidence: c.confidence,
            }
        }

        LogicalPlan::Limit { child, n, .. } => {
            let c = estimate(child);
            CostEstimate {
                rows: c.rows.min(*n as f64),
                time_ms: c.rows * 1e-6,
                selectivity: c.selectivity,
                confidence: c.confidence,
            }
        }
    }
}
