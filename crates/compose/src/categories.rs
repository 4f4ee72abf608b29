//! Category evaluation — turns categorization rules into an ordered
//! [`CategorySet`].

use crate::expr::{Expr, parse_expression};
use strata_config::CategorySpec;
use strata_core::{Category, CategorySet, ComposeContext, ComposeError, Result};

/// Evaluates the declared categorization rules against a compose context.
///
/// Expressions are compiled once at construction; evaluation happens on
/// every call, in declaration order, with no memoization — category values
/// may depend on the caller's context.
pub struct CategoryEvaluator {
    compiled: Vec<(String, Expr)>,
}

impl CategoryEvaluator {
    /// Compile the categorization expressions up front.
    pub fn new(specs: &[CategorySpec]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(specs.len());
        for spec in specs {
            let expr = parse_expression(&spec.expression).map_err(|detail| {
                ComposeError::ExpressionParse {
                    category: spec.name.clone(),
                    detail,
                }
            })?;
            compiled.push((spec.name.clone(), expr));
        }
        Ok(Self { compiled })
    }

    /// Evaluate every category. Each expression must produce a string;
    /// anything else fails with `CategoryTypeMismatch` naming the category.
    /// Values are lower-cased on the way in.
    pub fn evaluate(&self, ctx: &ComposeContext) -> Result<CategorySet> {
        let mut set = CategorySet::new();
        for (name, expr) in &self.compiled {
            let value = expr.evaluate(ctx);
            match value {
                serde_json::Value::String(s) => set.push(Category::new(name.clone(), s)),
                other => {
                    return Err(ComposeError::CategoryTypeMismatch {
                        category: name.clone(),
                        actual: json_type_name(&other).to_string(),
                    });
                }
            }
        }
        Ok(set)
    }

    /// The declared category names, in global precedence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.compiled.iter().map(|(name, _)| name.as_str())
    }
}

pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
