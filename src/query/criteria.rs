//! Per-entity filter criteria.
//!
//! Each criteria struct names the fields an entity can be filtered by and
//! rejects everything else with a 400. A request such as
//! `/api/cards?boardId.equals=5&title.contains=bug&sort=level,desc` parses
//! into a [`CardCriteria`] plus a [`PageRequest`](super::PageRequest).

use crate::errors::AppError;

use super::{filter_params, Condition, RangeFilter, StringFilter};

/// Sortable fields for boards, as `(wire field, column)` pairs.
pub const BOARD_SORTABLE: &[(&str, &str)] = &[("id", "id"), ("title", "title")];

/// Sortable fields for lines. Columns are table-qualified because line
/// queries join the boards table, which has the same column names.
pub const LINE_SORTABLE: &[(&str, &str)] = &[("id", "lines.id"), ("title", "lines.title")];

/// Sortable fields for cards.
pub const CARD_SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("title", "title"),
    ("level", "level"),
    ("desc", "description"),
];

/// Filtering options for board list requests.
#[derive(Debug, Clone, Default)]
pub struct BoardCriteria {
    pub id: RangeFilter<i64>,
    pub title: StringFilter,
}

impl BoardCriteria {
    pub fn from_params(params: &[(String, String)]) -> Result<Self, AppError> {
        let mut criteria = Self::default();
        for (field, op, value) in filter_params(params)? {
            let applied = match field {
                "id" => criteria.id.set(op, value),
                "title" => criteria.title.set(op, value),
                _ => Err(format!("unknown field '{}'", field)),
            };
            applied.map_err(|e| bad_filter(field, op, e))?;
        }
        Ok(criteria)
    }

    pub(crate) fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        self.id.conditions("id", &mut out);
        self.title.conditions("title", &mut out);
        out
    }
}

/// Filtering options for line list requests. `boardId` filters on the
/// owning-board foreign key.
#[derive(Debug, Clone, Default)]
pub struct LineCriteria {
    pub id: RangeFilter<i64>,
    pub title: StringFilter,
    pub board_id: RangeFilter<i64>,
}

impl LineCriteria {
    pub fn from_params(params: &[(String, String)]) -> Result<Self, AppError> {
        let mut criteria = Self::default();
        for (field, op, value) in filter_params(params)? {
            let applied = match field {
                "id" => criteria.id.set(op, value),
                "title" => criteria.title.set(op, value),
                "boardId" => criteria.board_id.set(op, value),
                _ => Err(format!("unknown field '{}'", field)),
            };
            applied.map_err(|e| bad_filter(field, op, e))?;
        }
        Ok(criteria)
    }

    pub(crate) fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        self.id.conditions("lines.id", &mut out);
        self.title.conditions("lines.title", &mut out);
        self.board_id.conditions("lines.board_id", &mut out);
        out
    }
}

/// Filtering options for card list requests.
///
/// `lineId` filters on the direct foreign key; `boardId` is the cross filter
/// used by board-scoped card listings and compiles to a subquery over lines.
#[derive(Debug, Clone, Default)]
pub struct CardCriteria {
    pub id: RangeFilter<i64>,
    pub title: StringFilter,
    pub level: RangeFilter<i32>,
    pub desc: StringFilter,
    pub line_id: RangeFilter<i64>,
    pub board_id: RangeFilter<i64>,
}

impl CardCriteria {
    pub fn from_params(params: &[(String, String)]) -> Result<Self, AppError> {
        let mut criteria = Self::default();
        for (field, op, value) in filter_params(params)? {
            let applied = match field {
                "id" => criteria.id.set(op, value),
                "title" => criteria.title.set(op, value),
                "level" => criteria.level.set(op, value),
                "desc" => criteria.desc.set(op, value),
                "lineId" => criteria.line_id.set(op, value),
                "boardId" => criteria.board_id.set(op, value),
                _ => Err(format!("unknown field '{}'", field)),
            };
            applied.map_err(|e| bad_filter(field, op, e))?;
        }
        Ok(criteria)
    }

    pub(crate) fn conditions(&self) -> Vec<Condition> {
        let mut out = Vec::new();
        self.id.conditions("id", &mut out);
        self.title.conditions("title", &mut out);
        self.level.conditions("level", &mut out);
        self.desc.conditions("description", &mut out);
        self.line_id.conditions("line_id", &mut out);

        if !self.board_id.is_empty() {
            let mut inner = Vec::new();
            self.board_id.conditions("board_id", &mut inner);
            let sql: Vec<&str> = inner.iter().map(|c| c.sql.as_str()).collect();
            out.push(Condition {
                sql: format!(
                    "line_id IN (SELECT id FROM lines WHERE {})",
                    sql.join(" AND ")
                ),
                binds: inner.into_iter().flat_map(|c| c.binds).collect(),
            });
        }
        out
    }
}

fn bad_filter(field: &str, op: &str, message: String) -> AppError {
    AppError::BadRequest(format!("Invalid filter '{}.{}': {}", field, op, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_board_criteria_ignores_reserved_params() {
        let criteria = BoardCriteria::from_params(&params(&[
            ("page", "1"),
            ("size", "20"),
            ("sort", "id,desc"),
            ("title.contains", "sprint"),
        ]))
        .unwrap();
        assert_eq!(criteria.title.contains.as_deref(), Some("sprint"));
        assert!(criteria.id.is_empty());
    }

    #[test]
    fn test_board_criteria_rejects_unknown_field() {
        let err = BoardCriteria::from_params(&params(&[("color.equals", "red")])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_board_criteria_rejects_bare_parameter() {
        let err = BoardCriteria::from_params(&params(&[("title", "x")])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_card_criteria_board_id_compiles_to_subquery() {
        let criteria =
            CardCriteria::from_params(&params(&[("boardId.equals", "5")])).unwrap();
        let conditions = criteria.conditions();
        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions[0].sql,
            "line_id IN (SELECT id FROM lines WHERE board_id = ?)"
        );
        assert_eq!(conditions[0].binds.len(), 1);
    }

    #[test]
    fn test_card_criteria_level_range() {
        let criteria = CardCriteria::from_params(&params(&[
            ("level.greaterThanOrEqual", "2"),
            ("level.lessThan", "5"),
        ]))
        .unwrap();
        let sql: Vec<String> = criteria.conditions().into_iter().map(|c| c.sql).collect();
        assert_eq!(sql, vec!["level < ?", "level >= ?"]);
    }

    #[test]
    fn test_card_criteria_rejects_bad_value_type() {
        let err =
            CardCriteria::from_params(&params(&[("level.equals", "high")])).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
