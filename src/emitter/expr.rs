//! Renders a Cypher [`Expr`] into KQL expression text.
//!
//! One `render` function rather than a `ToKql` trait per node: unlike
//! the plan algebra (one enum variant per node kind, so a visitor-style
//! match makes sense structurally), `Expr` is a small recursive tree
//! whose rendering is a single textual transliteration, so a plain
//! recursive function is the natural shape - the same way the teacher's
//! `render_expr.rs` has one dominant `render`-style function per
//! expression kind rather than per-struct trait impls.

use crate::config::Config;
use crate::emitter::functions;
use crate::emitter::quoting::{quote_identifier, quote_string_literal};
use crate::emitter::vars::VarBinding;
use crate::parser::ast::{BinOp, Expr, Literal, UnOp};
use crate::schema::{PropertyResolution, SchemaMap};
use std::collections::HashMap;

pub struct ExprCtx<'a, 'b> {
    pub schema: &'b SchemaMap,
    pub vars: &'b HashMap<&'a str, VarBinding>,
    pub config: &'b Config,
}

pub fn render<'a>(expr: &Expr<'a>, ctx: &ExprCtx<'a, '_>) -> String {
    match expr {
        Expr::Literal(lit) => render_literal(lit),
        Expr::Variable(v) => v.to_string(),
        Expr::Parameter(name) => name.to_string(),
        Expr::Property { base, key } => render_property(base, key, ctx),
        Expr::Binary { op, lhs, rhs } => render_binary(*op, lhs, rhs, ctx),
        Expr::Unary { op, expr } => render_unary(*op, expr, ctx),
        Expr::FunctionCall { name, args, distinct } => render_call(name, args, *distinct, ctx),
        Expr::List(items) => {
            let rendered: Vec<String> = items.iter().map(|i| render(i, ctx)).collect();
            format!("dynamic([{}])", rendered.join(", "))
        }
        Expr::Map(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .map(|(k, v)| format!("\"{}\": {}", k, render(v, ctx)))
                .collect();
            format!("dynamic({{{}}})", rendered.join(", "))
        }
    }
}

fn render_literal(lit: &Literal<'_>) -> String {
    match lit {
        Literal::Integer(n) => n.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Boolean(b) => b.to_string(),
        Literal::String(s) => quote_string_literal(s),
        Literal::Null => "dynamic(null)".to_string(),
    }
}

fn render_property<'a>(base: &Expr<'a>, key: &'a str, ctx: &ExprCtx<'a, '_>) -> String {
    if let Expr::Variable(var) = base {
        let column = resolve_column(var, key, ctx);
        return format!("{}.{}", var, quote_identifier(&column, ctx.config.emitter.quote_policy));
    }
    format!("{}.{}", render(base, ctx), key)
}

/// Resolve `var.key` to its schema-declared column name, falling back
/// to the bare property name when the variable has no pattern binding
/// or the property is genuinely unmapped - property resolution failures
/// on `WHERE`-pushed filters are already caught at plan-build time
/// (spec.md §4.D); anything that reaches the emitter unresolved is a
/// `RETURN`/`WITH` projection the builder does not validate against the
/// schema, so this degrades gracefully rather than failing a pure
/// rendering function.
fn resolve_column(var: &str, key: &str, ctx: &ExprCtx<'_, '_>) -> String {
    match ctx.vars.get(var) {
        Some(VarBinding {
            label_or_type: Some(label),
            is_relationship,
        }) => {
            let resolution = if *is_relationship {
                ctx.schema.resolve_rel_property(label, key)
            } else {
                ctx.schema.resolve_node_property(label, key)
            };
            match resolution {
                PropertyResolution::Mapped(col) | PropertyResolution::Passthrough(col) => col.to_string(),
                PropertyResolution::Unmapped => key.to_string(),
            }
        }
        _ => key.to_string(),
    }
}

fn render_unary<'a>(op: UnOp, expr: &Expr<'a>, ctx: &ExprCtx<'a, '_>) -> String {
    match op {
        UnOp::Not => format!("not ({})", render(expr, ctx)),
        UnOp::Neg => format!("-({})", render(expr, ctx)),
    }
}

fn render_binary<'a>(op: BinOp, lhs: &Expr<'a>, rhs: &Expr<'a>, ctx: &ExprCtx<'a, '_>) -> String {
    let l = render(lhs, ctx);
    let r = render(rhs, ctx);
    let case_insensitive = ctx.config.case_insensitive_text_ops;
    let kql_op = match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "%",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "and",
        BinOp::Or => "or",
        BinOp::In => "in",
        BinOp::Contains => {
            return format!("{} {} {}", l, if case_insensitive { "has" } else { "has_cs" }, r);
        }
        BinOp::StartsWith => {
            return format!(
                "{} {} {}",
                l,
                if case_insensitive { "startswith" } else { "startswith_cs" },
                r
            );
        }
        BinOp::EndsWith => {
            return format!(
                "{} {} {}",
                l,
                if case_insensitive { "endswith" } else { "endswith_cs" },
                r
            );
        }
    };
    format!("{} {} {}", l, kql_op, r)
}

fn render_call<'a>(name: &'a str, args: &[Expr<'a>], distinct: bool, ctx: &ExprCtx<'a, '_>) -> String {
    let lower = name.to_ascii_lowercase();
    if lower == "count" && args.is_empty() {
        return "count()".to_string();
    }
    let rendered_args: Vec<String> = args.iter().map(|a| render(a, ctx)).collect();
    if lower == "count" && distinct {
        return format!("dcount({})", rendered_args.join(", "));
    }
    format!("{}({})", functions::resolve(name), rendered_args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::schema::SchemaMap;

    fn ctx<'a, 'b>(
        schema: &'b SchemaMap,
        vars: &'b HashMap<&'a str, VarBinding>,
        config: &'b Config,
    ) -> ExprCtx<'a, 'b> {
        ExprCtx { schema, vars, config }
    }

    fn sample_schema() -> SchemaMap {
        SchemaMap::from_yaml_str(
            r#"
node_mappings:
  User:
    table: Users
    key: userId
    properties:
      department: Department
relationship_mappings: {}
"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_property_to_mapped_column() {
        let schema = sample_schema();
        let config = Config::default();
        let mut vars = HashMap::new();
        vars.insert(
            "u",
            VarBinding {
                label_or_type: Some("User".to_string()),
                is_relationship: false,
            },
        );
        let c = ctx(&schema, &vars, &config);
        let expr = Expr::Binary {
            op: BinOp::Eq,
            lhs: Box::new(Expr::Property {
                base: Box::new(Expr::Variable("u")),
                key: "department",
            }),
            rhs: Box::new(Expr::Literal(Literal::String("Finance"))),
        };
        assert_eq!(render(&expr, &c), "u.Department == 'Finance'");
    }

    #[test]
    fn contains_maps_to_has_case_insensitive_by_default() {
        let schema = sample_schema();
        let config = Config::default();
        let vars = HashMap::new();
        let c = ctx(&schema, &vars, &config);
        let expr = Expr::Binary {
            op: BinOp::Contains,
            lhs: Box::new(Expr::Variable("x")),
            rhs: Box::new(Expr::Literal(Literal::String("foo"))),
        };
        assert_eq!(render(&expr, &c), "x has 'foo'");
    }

    #[test]
    fn case_sensitive_contains_uses_cs_suffix() {
        let schema = sample_schema();
        let mut config = Config::default();
        config.case_insensitive_text_ops = false;
        let vars = HashMap::new();
        let c = ctx(&schema, &vars, &config);
        let expr = Expr::Binary {
            op: BinOp::Contains,
            lhs: Box::new(Expr::Variable("x")),
            rhs: Box::new(Expr::Literal(Literal::String("foo"))),
        };
        assert_eq!(render(&expr, &c), "x has_cs 'foo'");
    }

    #[test]
    fn count_star_renders_without_args() {
        let schema = sample_schema();
        let config = Config::default();
        let vars = HashMap::new();
        let c = ctx(&schema, &vars, &config);
        let expr = Expr::FunctionCall {
            name: "count",
            args: vec![],
            distinct: false,
        };
        assert_eq!(render(&expr, &c), "count()");
    }
}
