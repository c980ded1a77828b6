//! Query parts, clauses and common table expressions.

use serde::{Deserialize, Serialize};

use super::expr::Expression;
use super::operator::{FetchClauseType, NullPrecedence, SetOperator, SortDirection};
use super::predicate::Predicate;

// =============================================================================
// Clause Items
// =============================================================================

/// A SELECT list item: expression with optional alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct SelectItem {
    pub expression: Expression,
    #[serde(default)]
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

impl From<Expression> for SelectItem {
    fn from(expression: Expression) -> Self {
        SelectItem::new(expression)
    }
}

/// Table in the FROM clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct TableReference {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl TableReference {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// ORDER BY item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct SortSpecification {
    pub expression: Expression,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub nulls: Option<NullPrecedence>,
}

impl SortSpecification {
    pub fn asc(expression: Expression) -> Self {
        Self {
            expression,
            direction: SortDirection::Ascending,
            nulls: None,
        }
    }

    pub fn desc(expression: Expression) -> Self {
        Self {
            expression,
            direction: SortDirection::Descending,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullPrecedence::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullPrecedence::Last);
        self
    }
}

/// `FETCH FIRST <expression> ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchClause {
    pub expression: Expression,
    #[serde(default)]
    pub kind: FetchClauseType,
}

/// Row limiting clauses of a query part.
#[derive(Debug, Clone, Copy, Default)]
pub struct Limit<'q> {
    pub offset: Option<&'q Expression>,
    pub fetch: Option<&'q FetchClause>,
}

impl Limit<'_> {
    pub fn is_empty(&self) -> bool {
        self.offset.is_none() && self.fetch.is_none()
    }
}

// =============================================================================
// CTEs
// =============================================================================

/// Search path column computed by a recursive CTE.
///
/// The seed arm starts the path from `seed`; every recursive arm appends
/// `step` to the path of the row it joins against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CteSearchPath {
    /// Name of the path column.
    pub alias: String,
    pub seed: Expression,
    pub step: Expression,
    /// Expected maximum path length in characters, `-1` when unknown.
    #[serde(default = "CteSearchPath::unknown_size")]
    pub size_estimate: i32,
}

impl CteSearchPath {
    pub const UNKNOWN_SIZE: i32 = -1;

    fn unknown_size() -> i32 {
        Self::UNKNOWN_SIZE
    }

    pub fn new(alias: &str, seed: Expression, step: Expression) -> Self {
        Self {
            alias: alias.into(),
            seed,
            step,
            size_estimate: Self::UNKNOWN_SIZE,
        }
    }

    #[must_use]
    pub fn with_size_estimate(mut self, size_estimate: i32) -> Self {
        self.size_estimate = size_estimate;
        self
    }
}

/// Common Table Expression (WITH clause).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct Cte {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<String>,
    pub query: QueryPart,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default)]
    pub search_path: Option<CteSearchPath>,
}

impl Cte {
    pub fn new(name: &str, query: impl Into<QueryPart>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            query: query.into(),
            recursive: false,
            search_path: None,
        }
    }

    pub fn recursive(name: &str, query: impl Into<QueryPart>) -> Self {
        Self {
            recursive: true,
            ..Self::new(name, query)
        }
    }

    pub fn with_columns(mut self, columns: Vec<&str>) -> Self {
        self.columns = columns.into_iter().map(String::from).collect();
        self
    }

    pub fn with_search_path(mut self, path: CteSearchPath) -> Self {
        self.search_path = Some(path);
        self
    }
}

// =============================================================================
// Query Parts
// =============================================================================

/// A single SELECT.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
#[must_use = "builders have no effect until used"]
pub struct QuerySpec {
    pub ctes: Vec<Cte>,
    pub distinct: bool,
    pub select: Vec<SelectItem>,
    pub from: Vec<TableReference>,
    #[serde(rename = "where")]
    pub filter: Option<Predicate>,
    pub group_by: Vec<Expression>,
    pub having: Option<Predicate>,
    pub order_by: Vec<SortSpecification>,
    pub offset: Option<Expression>,
    pub fetch: Option<FetchClause>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cte(mut self, cte: Cte) -> Self {
        self.ctes.push(cte);
        self
    }

    pub fn select(mut self, items: Vec<impl Into<SelectItem>>) -> Self {
        self.select = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(mut self, table: TableReference) -> Self {
        self.from.push(table);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn group_by(mut self, items: Vec<Expression>) -> Self {
        self.group_by = items;
        self
    }

    pub fn having(mut self, predicate: Predicate) -> Self {
        self.having = Some(predicate);
        self
    }

    pub fn order_by(mut self, items: Vec<SortSpecification>) -> Self {
        self.order_by = items;
        self
    }

    pub fn offset(mut self, offset: impl Into<Expression>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn fetch(mut self, fetch: impl Into<Expression>, kind: FetchClauseType) -> Self {
        self.fetch = Some(FetchClause {
            expression: fetch.into(),
            kind,
        });
        self
    }

    /// Visit every subquery directly nested in the clauses of this spec.
    pub fn for_each_subquery<'a>(&'a self, f: &mut dyn FnMut(&'a QueryPart)) {
        for item in &self.select {
            item.expression.for_each_subquery(f);
        }
        if let Some(filter) = &self.filter {
            filter.for_each_subquery(f);
        }
        for item in &self.group_by {
            item.for_each_subquery(f);
        }
        if let Some(having) = &self.having {
            having.for_each_subquery(f);
        }
        for sort in &self.order_by {
            sort.expression.for_each_subquery(f);
        }
    }
}

/// Set operation over query parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct QueryGroup {
    #[serde(default)]
    pub ctes: Vec<Cte>,
    pub operator: SetOperator,
    pub parts: Vec<QueryPart>,
    #[serde(default)]
    pub order_by: Vec<SortSpecification>,
    #[serde(default)]
    pub offset: Option<Expression>,
    #[serde(default)]
    pub fetch: Option<FetchClause>,
}

impl QueryGroup {
    pub fn new(operator: SetOperator, parts: Vec<QueryPart>) -> Self {
        Self {
            ctes: vec![],
            operator,
            parts,
            order_by: vec![],
            offset: None,
            fetch: None,
        }
    }

    pub fn union_all(parts: Vec<QueryPart>) -> Self {
        Self::new(SetOperator::UnionAll, parts)
    }

    pub fn order_by(mut self, items: Vec<SortSpecification>) -> Self {
        self.order_by = items;
        self
    }

    pub fn offset(mut self, offset: impl Into<Expression>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    pub fn fetch(mut self, fetch: impl Into<Expression>, kind: FetchClauseType) -> Self {
        self.fetch = Some(FetchClause {
            expression: fetch.into(),
            kind,
        });
        self
    }
}

/// A query: a single SELECT or a set operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPart {
    Spec(QuerySpec),
    Group(QueryGroup),
}

impl QueryPart {
    pub fn ctes(&self) -> &[Cte] {
        match self {
            QueryPart::Spec(spec) => &spec.ctes,
            QueryPart::Group(group) => &group.ctes,
        }
    }

    pub fn order_by(&self) -> &[SortSpecification] {
        match self {
            QueryPart::Spec(spec) => &spec.order_by,
            QueryPart::Group(group) => &group.order_by,
        }
    }

    pub fn limit(&self) -> Limit<'_> {
        match self {
            QueryPart::Spec(spec) => Limit {
                offset: spec.offset.as_ref(),
                fetch: spec.fetch.as_ref(),
            },
            QueryPart::Group(group) => Limit {
                offset: group.offset.as_ref(),
                fetch: group.fetch.as_ref(),
            },
        }
    }

    /// The leftmost query spec; it determines the select list shape.
    pub fn first_spec(&self) -> Option<&QuerySpec> {
        match self {
            QueryPart::Spec(spec) => Some(spec),
            QueryPart::Group(group) => group.parts.first().and_then(QueryPart::first_spec),
        }
    }

    /// Visit every query part nested below this one: set operation arms,
    /// CTE bodies and subqueries in any clause, depth first.
    pub fn for_each_nested<'a>(&'a self, f: &mut dyn FnMut(&'a QueryPart)) {
        let mut direct: Vec<&'a QueryPart> = vec![];
        for cte in self.ctes() {
            direct.push(&cte.query);
        }
        match self {
            QueryPart::Spec(spec) => spec.for_each_subquery(&mut |q| direct.push(q)),
            QueryPart::Group(group) => {
                direct.extend(group.parts.iter());
                for sort in &group.order_by {
                    sort.expression.for_each_subquery(&mut |q| direct.push(q));
                }
            }
        }
        for part in direct {
            f(part);
            part.for_each_nested(f);
        }
    }
}

impl From<QuerySpec> for QueryPart {
    fn from(spec: QuerySpec) -> Self {
        QueryPart::Spec(spec)
    }
}

impl From<QueryGroup> for QueryPart {
    fn from(group: QueryGroup) -> Self {
        QueryPart::Group(group)
    }
}

/// A translatable statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Statement {
    Select(QueryPart),
}

impl From<QuerySpec> for Statement {
    fn from(spec: QuerySpec) -> Self {
        Statement::Select(spec.into())
    }
}

impl From<QueryGroup> for Statement {
    fn from(group: QueryGroup) -> Self {
        Statement::Select(group.into())
    }
}
