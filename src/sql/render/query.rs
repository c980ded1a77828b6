//! Query parts: SELECT clauses, set operations, CTEs and row limiting.

use tracing::debug;

use super::SqlAstTranslator;
use crate::sql::ast::{
    Cte, CteSearchPath, Expression, FetchClauseType, Limit, QueryGroup, QueryPart, QuerySpec,
    SetOperator, Statement,
};
use crate::sql::dialect::SqlDialect;
use crate::sql::error::TranslationError;
use crate::sql::token::Token;

/// Arm of a recursive CTE that carries a search path column.
#[derive(Debug, Clone, Copy)]
enum PathArm<'q> {
    Seed(&'q CteSearchPath),
    Step { cte: &'q str, path: &'q CteSearchPath },
}

impl SqlAstTranslator<'_> {
    pub(super) fn render_statement(&mut self, statement: &Statement) -> Result<(), TranslationError> {
        match statement {
            Statement::Select(query) => self.render_top_level_query(query),
        }
    }

    fn render_top_level_query(&mut self, query: &QueryPart) -> Result<(), TranslationError> {
        let d = self.dialect;
        let mut ctes: Vec<&Cte> = vec![];
        if !d.supports_with_clause_in_subquery() {
            query.for_each_nested(&mut |part| ctes.extend(part.ctes()));
            if !ctes.is_empty() {
                debug!(dialect = %d, count = ctes.len(), "hoisting nested CTEs to the statement");
            }
        }
        ctes.extend(query.ctes());
        self.render_with_clause(&ctes)?;
        self.render_query_part(query, true, None)
    }

    /// Render a query part below the statement level.
    pub(super) fn render_subquery(&mut self, query: &QueryPart) -> Result<(), TranslationError> {
        self.nested(|tr| tr.render_query_part(query, false, None))
    }

    fn render_query_part(
        &mut self,
        query: &QueryPart,
        standalone: bool,
        path: Option<(&str, &CteSearchPath)>,
    ) -> Result<(), TranslationError> {
        // statement-level and hoisted CTEs are rendered up front
        if self.query_depth > 0 && self.dialect.supports_with_clause_in_subquery() {
            let ctes: Vec<&Cte> = query.ctes().iter().collect();
            self.render_with_clause(&ctes)?;
        }
        match (query, path) {
            (QueryPart::Group(group), path) => self.render_query_group(group, path),
            (QueryPart::Spec(spec), None) => self.render_query_spec(spec, None, standalone),
            (QueryPart::Spec(_), Some((cte, _))) => Err(TranslationError::InvalidExpression(
                format!("search path of CTE '{}' requires a set operation", cte),
            )),
        }
    }

    pub(super) fn render_with_clause(&mut self, ctes: &[&Cte]) -> Result<(), TranslationError> {
        if ctes.is_empty() {
            return Ok(());
        }
        self.out.push(Token::With).space();
        if self.dialect.emit_recursive_keyword() && ctes.iter().any(|cte| cte.recursive) {
            self.out.push(Token::Recursive).space();
        }
        for (i, cte) in ctes.iter().enumerate() {
            if i > 0 {
                self.out.comma().space();
            }
            self.render_cte(cte)?;
        }
        self.out.space();
        Ok(())
    }

    fn render_cte(&mut self, cte: &Cte) -> Result<(), TranslationError> {
        let path = cte.search_path.as_ref();
        self.out.push(Token::Ident(cte.name.clone()));
        if !cte.columns.is_empty() {
            self.out.space().lparen();
            for (i, column) in cte.columns.iter().enumerate() {
                if i > 0 {
                    self.out.comma().space();
                }
                self.out.push(Token::Ident(column.clone()));
            }
            if let Some(path) = path {
                self.out.comma().space().push(Token::Ident(path.alias.clone()));
            }
            self.out.rparen();
        }
        self.out.space().push(Token::As).space().lparen();
        self.nested(|tr| {
            tr.render_query_part(&cte.query, false, path.map(|p| (cte.name.as_str(), p)))
        })?;
        self.out.rparen();
        Ok(())
    }

    fn render_query_group(
        &mut self,
        group: &QueryGroup,
        path: Option<(&str, &CteSearchPath)>,
    ) -> Result<(), TranslationError> {
        if group.parts.is_empty() {
            return Err(TranslationError::InvalidExpression(
                "set operation without query parts".into(),
            ));
        }
        if let Some((cte, _)) = path.filter(|_| group.parts.len() < 2) {
            return Err(TranslationError::InvalidExpression(format!(
                "search path of CTE '{}' requires a seed and a recursive arm",
                cte
            )));
        }

        for (i, part) in group.parts.iter().enumerate() {
            if i > 0 {
                self.out.space();
                self.render_set_operator(group.operator);
                self.out.space();
            }
            let arm = path.map(|(cte, path)| {
                if i == 0 {
                    PathArm::Seed(path)
                } else {
                    PathArm::Step { cte, path }
                }
            });
            match part {
                QueryPart::Spec(spec) if spec.ctes.is_empty() || arm.is_some() => {
                    let wrap = !spec.order_by.is_empty() || !part.limit().is_empty();
                    if wrap {
                        self.out.lparen();
                    }
                    self.render_query_spec(spec, arm, false)?;
                    if wrap {
                        self.out.rparen();
                    }
                }
                _ if arm.is_some() => {
                    return Err(TranslationError::InvalidExpression(
                        "search path arms must be simple selects".into(),
                    ))
                }
                _ => {
                    self.out.lparen();
                    self.render_subquery(part)?;
                    self.out.rparen();
                }
            }
        }

        self.render_order_by(&group.order_by)?;
        self.render_limit(Limit {
            offset: group.offset.as_ref(),
            fetch: group.fetch.as_ref(),
        })
    }

    fn render_set_operator(&mut self, operator: SetOperator) {
        let (keyword, all) = match operator {
            SetOperator::Union => (Token::Union, false),
            SetOperator::UnionAll => (Token::Union, true),
            SetOperator::Intersect => (Token::Intersect, false),
            SetOperator::IntersectAll => (Token::Intersect, true),
            SetOperator::Except => (Token::Except, false),
            SetOperator::ExceptAll => (Token::Except, true),
        };
        self.out.push(keyword);
        if all {
            self.out.space().push(Token::All);
        }
    }

    fn render_query_spec(
        &mut self,
        spec: &QuerySpec,
        arm: Option<PathArm<'_>>,
        standalone: bool,
    ) -> Result<(), TranslationError> {
        let d = self.dialect;
        if spec.select.is_empty() {
            return Err(TranslationError::InvalidExpression(
                "SELECT without items".into(),
            ));
        }

        self.out.push(Token::Select).space();
        if spec.distinct {
            self.out.push(Token::Distinct).space();
        }
        for (i, item) in spec.select.iter().enumerate() {
            if i > 0 {
                self.out.comma().space();
            }
            d.render_select_expression(self, &item.expression)?;
            if let Some(alias) = &item.alias {
                self.out
                    .space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
            }
        }
        if let Some(arm) = arm {
            self.render_search_path_arm(arm)?;
        }

        self.render_from_clause(spec, standalone)?;
        if let Some(filter) = &spec.filter {
            self.out.space().push(Token::Where).space();
            self.render_predicate(filter)?;
        }
        self.render_group_by(&spec.group_by)?;
        if let Some(having) = &spec.having {
            self.out.space().push(Token::Having).space();
            self.render_predicate(having)?;
        }
        self.render_order_by(&spec.order_by)?;
        self.render_limit(Limit {
            offset: spec.offset.as_ref(),
            fetch: spec.fetch.as_ref(),
        })
    }

    /// FROM clause, or the dialect's dual table when the query has no tables.
    pub(super) fn render_from_clause(
        &mut self,
        spec: &QuerySpec,
        standalone: bool,
    ) -> Result<(), TranslationError> {
        let d = self.dialect;
        if spec.from.is_empty() {
            let select_only = standalone
                && spec.filter.is_none()
                && spec.group_by.is_empty()
                && spec.having.is_none();
            self.append_sql(if select_only {
                d.from_dual_for_select_only()
            } else {
                d.from_dual()
            });
            return Ok(());
        }

        self.out.space().push(Token::From).space();
        for (i, table) in spec.from.iter().enumerate() {
            if i > 0 {
                self.out.comma().space();
            }
            self.out.push(Token::Ident(table.name.clone()));
            if let Some(alias) = &table.alias {
                self.out
                    .space()
                    .push(Token::As)
                    .space()
                    .push(Token::Ident(alias.clone()));
            }
        }
        Ok(())
    }

    pub(super) fn render_group_by(&mut self, items: &[Expression]) -> Result<(), TranslationError> {
        if items.is_empty() {
            return Ok(());
        }
        let d = self.dialect;
        self.out.space().push(Token::GroupBy).space();
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.comma().space();
            }
            d.render_partition_item(self, item)?;
        }
        Ok(())
    }

    fn render_order_by(
        &mut self,
        items: &[crate::sql::ast::SortSpecification],
    ) -> Result<(), TranslationError> {
        if items.is_empty() {
            return Ok(());
        }
        self.out.space().push(Token::OrderBy).space();
        self.render_sort_list(items)
    }

    /// Extra path column of a recursive CTE arm.
    ///
    /// With array support the path is `array[seed]` extended by
    /// `path || array[step]`; otherwise it is a comma separated string.
    fn render_search_path_arm(&mut self, arm: PathArm<'_>) -> Result<(), TranslationError> {
        let d = self.dialect;
        let array_mode =
            d.supports_recursive_clause_array_and_row_emulation() && d.supports_array_constructor();
        self.out.comma().space();

        let path = match arm {
            PathArm::Seed(path) => {
                if array_mode {
                    self.append_sql("array[");
                    self.render_expression(&path.seed)?;
                    self.append_sql("]");
                } else {
                    d.visit_recursive_path(self, &path.seed, path.size_estimate)?;
                }
                path
            }
            PathArm::Step { cte, path } => {
                let previous = Token::QualifiedIdent {
                    qualifier: Some(cte.to_string()),
                    name: path.alias.clone(),
                };
                if array_mode {
                    self.out.push(previous).space().push(Token::Concat).space();
                    self.append_sql("array[");
                    self.render_expression(&path.step)?;
                    self.append_sql("]");
                } else if d.supports_concat_operator() {
                    self.out
                        .push(previous)
                        .space()
                        .push(Token::Concat)
                        .space()
                        .push(Token::LitString(",".into()))
                        .space()
                        .push(Token::Concat)
                        .space();
                    self.render_expression(&path.step)?;
                } else {
                    self.append_sql("concat(");
                    self.out
                        .push(previous)
                        .comma()
                        .space()
                        .push(Token::LitString(",".into()))
                        .comma()
                        .space();
                    self.render_expression(&path.step)?;
                    self.out.rparen();
                }
                path
            }
        };
        self.out
            .space()
            .push(Token::As)
            .space()
            .push(Token::Ident(path.alias.clone()));
        Ok(())
    }

    // =========================================================================
    // Row Limiting
    // =========================================================================

    fn render_limit(&mut self, limit: Limit<'_>) -> Result<(), TranslationError> {
        if limit.is_empty() {
            return Ok(());
        }
        let d = self.dialect;
        d.visit_offset_fetch_clause(self, limit)
    }

    /// ` OFFSET n [ROWS] FETCH FIRST m [PERCENT] ROWS (ONLY|WITH TIES)`
    pub fn render_offset_fetch_clause(
        &mut self,
        limit: Limit<'_>,
        render_offset_rows_keyword: bool,
    ) -> Result<(), TranslationError> {
        if let Some(offset) = limit.offset {
            self.out.space().push(Token::Offset).space();
            self.render_expression(offset)?;
            if render_offset_rows_keyword {
                self.out.space().push(Token::Rows);
            }
        }
        if let Some(fetch) = limit.fetch {
            self.out
                .space()
                .push(Token::Fetch)
                .space()
                .push(Token::First)
                .space();
            self.render_expression(&fetch.expression)?;
            self.out.space();
            if matches!(
                fetch.kind,
                FetchClauseType::PercentOnly | FetchClauseType::PercentWithTies
            ) {
                self.out.push(Token::Percent).space();
            }
            self.out.push(Token::Rows).space();
            match fetch.kind {
                FetchClauseType::RowsOnly | FetchClauseType::PercentOnly => {
                    self.out.push(Token::Only)
                }
                FetchClauseType::RowsWithTies | FetchClauseType::PercentWithTies => {
                    self.out.push(Token::WithTies)
                }
            };
        }
        Ok(())
    }

    /// ` LIMIT m OFFSET n`; only plain row counts can be expressed.
    pub fn render_limit_offset_clause(&mut self, limit: Limit<'_>) -> Result<(), TranslationError> {
        self.assert_rows_only_fetch_clause_type(limit)?;
        if let Some(fetch) = limit.fetch {
            self.out.space().push(Token::Limit).space();
            self.render_expression(&fetch.expression)?;
        }
        if let Some(offset) = limit.offset {
            self.out.space().push(Token::Offset).space();
            self.render_expression(offset)?;
        }
        Ok(())
    }

    pub fn assert_rows_only_fetch_clause_type(&self, limit: Limit<'_>) -> Result<(), TranslationError> {
        match limit.fetch {
            Some(fetch) if fetch.kind != FetchClauseType::RowsOnly => {
                Err(TranslationError::InvalidFetchClause {
                    kind: fetch.kind,
                    dialect: self.dialect.name(),
                })
            }
            _ => Ok(()),
        }
    }
}
