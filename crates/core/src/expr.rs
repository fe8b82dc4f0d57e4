// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for the secondary query expression.
//!
//! Grammar: `comparison ((';' | ',') comparison)*` where a comparison is
//! `field operator value`, operators `=`, `!=`, `<`, `>`, `~`. `;` is AND,
//! `,` is OR.

use crate::error::QueryError;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Like,
}

impl Operator {
    pub fn sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Like => "LIKE",
        }
    }
}

/// How a comparison combines with the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

/// A single `field operator value` clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub field: String,
    pub operator: Operator,
    pub value: String,
}

/// A parsed expression: the first comparison plus connected continuations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    pub first: Comparison,
    pub rest: Vec<(Connector, Comparison)>,
}

impl Expr {
    /// Parse an expression string. Empty input yields `None`.
    pub fn parse(input: &str) -> Result<Option<Expr>, QueryError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        let mut parser = Parser { input, pos: 0 };
        let first = parser.parse_comparison()?;
        let mut rest = Vec::new();
        while let Some(connector) = parser.next_connector() {
            rest.push((connector, parser.parse_comparison()?));
        }
        Ok(Some(Expr { first, rest }))
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Consume `;` or `,` if present; anything else ends the expression.
    fn next_connector(&mut self) -> Option<Connector> {
        match self.remaining().chars().next() {
            Some(';') => {
                self.pos += 1;
                Some(Connector::And)
            }
            Some(',') => {
                self.pos += 1;
                Some(Connector::Or)
            }
            _ => None,
        }
    }

    /// Grammar: field ('=' | '!=' | '<' | '>' | '~') value
    fn parse_comparison(&mut self) -> Result<Comparison, QueryError> {
        let clause_start = self.pos;
        let clause_end = self
            .remaining()
            .find([';', ','])
            .map(|i| self.pos + i)
            .unwrap_or(self.input.len());
        let clause = &self.input[clause_start..clause_end];

        let op_at = clause
            .find(['=', '!', '<', '>', '~'])
            .ok_or_else(|| QueryError::InvalidOperator { clause: clause.to_string() })?;

        let field = clause[..op_at].trim();
        let (operator, value_at) = match &clause[op_at..] {
            rest if rest.starts_with("!=") => (Operator::Ne, op_at + 2),
            rest if rest.starts_with('=') => (Operator::Eq, op_at + 1),
            rest if rest.starts_with('<') => (Operator::Lt, op_at + 1),
            rest if rest.starts_with('>') => (Operator::Gt, op_at + 1),
            rest if rest.starts_with('~') => (Operator::Like, op_at + 1),
            // Bare '!' without '=' is not an operator
            _ => return Err(QueryError::InvalidOperator { clause: clause.to_string() }),
        };
        let value = clause[value_at..].trim();

        if field.is_empty() || value.is_empty() {
            return Err(QueryError::InvalidOperator { clause: clause.to_string() });
        }

        self.pos = clause_end;
        Ok(Comparison {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "expr_tests.rs"]
mod tests;
