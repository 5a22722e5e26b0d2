//! 文档查询模型
//!
//! 声明式的过滤表达式树（字段谓词 + 与/或/非）、排序方向、查询参数与
//! 索引定义。映射层只负责构造并透传这些结构，不解释其语义；
//! 具体求值由存储后端完成。
//!
use bon::Builder;
use serde_json::Value;

/// 布尔过滤表达式树。
///
/// 跨聚合查询的条件（criteria）与聚合内过滤共用同一形态，
/// 由调用方构造后原样下推到存储后端。
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Gte(String, Value),
    Lt(String, Value),
    Lte(String, Value),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn greater_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(field.into(), value.into())
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    pub fn less_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(field.into(), value.into())
    }

    /// 与另一条件合取，已是合取时就地展开
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// 与另一条件析取，已是析取时就地展开
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut filters) => {
                filters.push(other);
                Filter::Or(filters)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Filter::Not(Box::new(self))
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// 一次游标查询的参数：过滤、排序与条数上限
#[derive(Debug, Clone, Default, Builder)]
pub struct FindQuery {
    filter: Option<Filter>,
    #[builder(default)]
    sort: Vec<(String, SortOrder)>,
    limit: Option<usize>,
}

impl FindQuery {
    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn sort(&self) -> &[(String, SortOrder)] {
        &self.sort
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// 索引定义。名称参与幂等重建：同名同定义的再次声明是空操作。
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct IndexSpec {
    name: String,
    keys: Vec<(String, SortOrder)>,
    #[builder(default)]
    unique: bool,
}

impl IndexSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keys(&self) -> &[(String, SortOrder)] {
        &self.keys
    }

    pub fn unique(&self) -> bool {
        self.unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn and_flattens_into_single_conjunction() {
        let filter = Filter::equals("a", 1)
            .and(Filter::greater_or_equal("b", 2))
            .and(Filter::equals("c", "x"));

        match filter {
            Filter::And(parts) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[0], Filter::Eq("a".into(), json!(1)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn query_defaults_are_unrestricted() {
        let query = FindQuery::builder().build();
        assert!(query.filter().is_none());
        assert!(query.sort().is_empty());
        assert_eq!(query.limit(), None);
    }
}
