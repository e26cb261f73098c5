//! Collects, once per translation, which Cypher label or relationship
//! type each pattern variable is bound to - so expression rendering can
//! resolve `v.prop` to the right schema-declared column no matter how
//! far above the owning `GraphMatch`/`ShortestPaths`/`AllPaths` node the
//! reference sits (a `Project`/`Filter`/`Sort` above a `Join` of several
//! patterns, say).

use crate::plan::{LogicalPlan, PlanPatternElement, PlanRef};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct VarBinding {
    pub label_or_type: Option<String>,
    pub is_relationship: bool,
}

pub fn collect<'a>(plan: &PlanRef<'a>) -> HashMap<&'a str, VarBinding> {
    let mut out = HashMap::new();
    walk(plan, &mut out);
    out
}

fn walk<'a>(plan: &PlanRef<'a>, out: &mut HashMap<&'a str, VarBinding>) {
    match plan.as_ref() {
        LogicalPlan::GraphMatch { elements, .. } => {
            for element in elements {
                match element {
                    PlanPatternElement::Node(n) => {
                        out.insert(
                            n.var,
                            VarBinding {
                                label_or_type: n.label.clone(),
                                is_relationship: false,
                            },
                        );
                    }
                    PlanPatternElement::Rel(r) => {
                        if let Some(v) = r.var {
                            out.insert(
                                v,
                                VarBinding {
                                    label_or_type: r.rel_type.clone(),
                                    is_relationship: true,
                                },
                            );
                        }
                    }
                }
            }
        }
        LogicalPlan::ShortestPaths {
            src, dst, rel_type, ..
        }
        | LogicalPlan::AllPaths {
            src, dst, rel_type, ..
        } => {
            out.insert(
                src.var,
                VarBinding {
                    label_or_type: src.label.clone(),
                    is_relationship: false,
                },
            );
            out.insert(
                dst.var,
                VarBinding {
                    label_or_type: dst.label.clone(),
                    is_relationship: false,
                },
            );
            let _ = rel_type;
        }
        _ => {}
    }
    for child in plan.children() {
        walk(child, out);
    }
}
