//! Database repository for CRUD operations.
//!
//! Write operations validate existence and report `NotFound`; list operations
//! compile the entity criteria into a WHERE clause shared by the page query
//! and the total count.

use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Board, BoardPayload, Card, CardPayload, Line, LinePayload, LineRef,
};
use crate::query::{BoardCriteria, CardCriteria, Condition, LineCriteria, PageRequest, SqlValue};

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, SqliteArguments<'q>>;
type SqliteScalar<'q> = sqlx::query::QueryScalar<'q, sqlx::Sqlite, i64, SqliteArguments<'q>>;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== BOARD OPERATIONS ====================

    /// Get a board by ID.
    pub async fn find_board(&self, id: i64) -> Result<Option<Board>, AppError> {
        let row = sqlx::query("SELECT id, title FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(board_from_row))
    }

    /// Fetch one page of boards plus the total count for the criteria.
    pub async fn query_boards(
        &self,
        criteria: &BoardCriteria,
        page: &PageRequest,
    ) -> Result<(Vec<Board>, i64), AppError> {
        let conditions = criteria.conditions();
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT id, title FROM boards{}{} LIMIT ? OFFSET ?",
            where_sql,
            page.order_by()
        );
        let rows = bind_conditions(sqlx::query(&sql), &conditions)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM boards{}", where_sql);
        let total = bind_scalar_conditions(sqlx::query_scalar(&count_sql), &conditions)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.iter().map(board_from_row).collect(), total))
    }

    /// Create a new board.
    pub async fn create_board(&self, payload: &BoardPayload) -> Result<Board, AppError> {
        let result = sqlx::query("INSERT INTO boards (title) VALUES (?)")
            .bind(&payload.title)
            .execute(&self.pool)
            .await?;

        Ok(Board {
            id: result.last_insert_rowid(),
            title: payload.title.clone(),
        })
    }

    /// Replace a board. All fields are overwritten with the payload values.
    pub async fn update_board(&self, id: i64, payload: &BoardPayload) -> Result<Board, AppError> {
        let result = sqlx::query("UPDATE boards SET title = ? WHERE id = ?")
            .bind(&payload.title)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Board {} not found", id)));
        }

        Ok(Board {
            id,
            title: payload.title.clone(),
        })
    }

    /// Merge the provided fields into a board; absent fields are untouched.
    pub async fn partial_update_board(
        &self,
        id: i64,
        payload: &BoardPayload,
    ) -> Result<Board, AppError> {
        let existing = self
            .find_board(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Board {} not found", id)))?;

        let title = payload.title.clone().or(existing.title);

        sqlx::query("UPDATE boards SET title = ? WHERE id = ?")
            .bind(&title)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Board { id, title })
    }

    /// Delete a board. Returns whether a row was removed.
    pub async fn delete_board(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== LINE OPERATIONS ====================

    /// Get a line by ID, with its board reference resolved.
    pub async fn find_line(&self, id: i64) -> Result<Option<Line>, AppError> {
        let row = sqlx::query(
            "SELECT lines.id, lines.title, lines.board_id, boards.title AS board_title \
             FROM lines LEFT JOIN boards ON boards.id = lines.board_id WHERE lines.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(line_from_row))
    }

    /// Fetch one page of lines plus the total count for the criteria.
    pub async fn query_lines(
        &self,
        criteria: &LineCriteria,
        page: &PageRequest,
    ) -> Result<(Vec<Line>, i64), AppError> {
        let conditions = criteria.conditions();
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT lines.id, lines.title, lines.board_id, boards.title AS board_title \
             FROM lines LEFT JOIN boards ON boards.id = lines.board_id{}{} LIMIT ? OFFSET ?",
            where_sql,
            page.order_by()
        );
        let rows = bind_conditions(sqlx::query(&sql), &conditions)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM lines{}", where_sql);
        let total = bind_scalar_conditions(sqlx::query_scalar(&count_sql), &conditions)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.iter().map(line_from_row).collect(), total))
    }

    /// Create a new line.
    pub async fn create_line(&self, payload: &LinePayload) -> Result<Line, AppError> {
        let board_id = payload.board.as_ref().map(|b| b.id);
        let result = sqlx::query("INSERT INTO lines (title, board_id) VALUES (?, ?)")
            .bind(&payload.title)
            .bind(board_id)
            .execute(&self.pool)
            .await?;

        self.find_line(result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Created line not found".to_string()))
    }

    /// Replace a line. All fields are overwritten with the payload values.
    pub async fn update_line(&self, id: i64, payload: &LinePayload) -> Result<Line, AppError> {
        let board_id = payload.board.as_ref().map(|b| b.id);
        let result = sqlx::query("UPDATE lines SET title = ?, board_id = ? WHERE id = ?")
            .bind(&payload.title)
            .bind(board_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Line {} not found", id)));
        }

        self.find_line(id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated line not found".to_string()))
    }

    /// Merge the provided fields into a line; absent fields are untouched.
    pub async fn partial_update_line(
        &self,
        id: i64,
        payload: &LinePayload,
    ) -> Result<Line, AppError> {
        let existing = self
            .find_line(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Line {} not found", id)))?;

        let title = payload.title.clone().or(existing.title);
        let board_id = payload
            .board
            .as_ref()
            .map(|b| b.id)
            .or(existing.board.map(|b| b.id));

        sqlx::query("UPDATE lines SET title = ?, board_id = ? WHERE id = ?")
            .bind(&title)
            .bind(board_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_line(id)
            .await?
            .ok_or_else(|| AppError::Internal("Updated line not found".to_string()))
    }

    /// Delete a line. Returns whether a row was removed.
    pub async fn delete_line(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM lines WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ==================== CARD OPERATIONS ====================

    /// Get a card by ID.
    pub async fn find_card(&self, id: i64) -> Result<Option<Card>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, level, description, line_id FROM cards WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(card_from_row))
    }

    /// Fetch one page of cards plus the total count for the criteria.
    pub async fn query_cards(
        &self,
        criteria: &CardCriteria,
        page: &PageRequest,
    ) -> Result<(Vec<Card>, i64), AppError> {
        let conditions = criteria.conditions();
        let where_sql = where_clause(&conditions);

        let sql = format!(
            "SELECT id, title, level, description, line_id FROM cards{}{} LIMIT ? OFFSET ?",
            where_sql,
            page.order_by()
        );
        let rows = bind_conditions(sqlx::query(&sql), &conditions)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM cards{}", where_sql);
        let total = bind_scalar_conditions(sqlx::query_scalar(&count_sql), &conditions)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.iter().map(card_from_row).collect(), total))
    }

    /// Create a new card.
    pub async fn create_card(&self, payload: &CardPayload) -> Result<Card, AppError> {
        let line_id = payload.line.as_ref().map(|l| l.id);
        let result = sqlx::query(
            "INSERT INTO cards (title, level, description, line_id) VALUES (?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(payload.level)
        .bind(&payload.desc)
        .bind(line_id)
        .execute(&self.pool)
        .await?;

        Ok(Card {
            id: result.last_insert_rowid(),
            title: payload.title.clone(),
            level: payload.level,
            desc: payload.desc.clone(),
            line: payload.line.clone(),
        })
    }

    /// Replace a card. All fields are overwritten with the payload values.
    pub async fn update_card(&self, id: i64, payload: &CardPayload) -> Result<Card, AppError> {
        let line_id = payload.line.as_ref().map(|l| l.id);
        let result = sqlx::query(
            "UPDATE cards SET title = ?, level = ?, description = ?, line_id = ? WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(payload.level)
        .bind(&payload.desc)
        .bind(line_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Card {} not found", id)));
        }

        Ok(Card {
            id,
            title: payload.title.clone(),
            level: payload.level,
            desc: payload.desc.clone(),
            line: payload.line.clone(),
        })
    }

    /// Merge the provided fields into a card; absent fields are untouched.
    pub async fn partial_update_card(
        &self,
        id: i64,
        payload: &CardPayload,
    ) -> Result<Card, AppError> {
        let existing = self
            .find_card(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Card {} not found", id)))?;

        let title = payload.title.clone().or(existing.title);
        let level = payload.level.or(existing.level);
        let desc = payload.desc.clone().or(existing.desc);
        let line = payload.line.clone().or(existing.line);

        sqlx::query(
            "UPDATE cards SET title = ?, level = ?, description = ?, line_id = ? WHERE id = ?",
        )
        .bind(&title)
        .bind(level)
        .bind(&desc)
        .bind(line.as_ref().map(|l| l.id))
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(Card {
            id,
            title,
            level,
            desc,
            line,
        })
    }

    /// Delete a card. Returns whether a row was removed.
    pub async fn delete_card(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn board_from_row(row: &SqliteRow) -> Board {
    Board {
        id: row.get("id"),
        title: row.get("title"),
    }
}

fn line_from_row(row: &SqliteRow) -> Line {
    let board_id: Option<i64> = row.get("board_id");
    Line {
        id: row.get("id"),
        title: row.get("title"),
        board: board_id.map(|id| Board {
            id,
            title: row.get("board_title"),
        }),
    }
}

fn card_from_row(row: &SqliteRow) -> Card {
    let line_id: Option<i64> = row.get("line_id");
    Card {
        id: row.get("id"),
        title: row.get("title"),
        level: row.get("level"),
        desc: row.get("description"),
        line: line_id.map(|id| LineRef { id }),
    }
}

fn where_clause(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let sql: Vec<&str> = conditions.iter().map(|c| c.sql.as_str()).collect();
    format!(" WHERE {}", sql.join(" AND "))
}

fn bind_conditions<'q>(query: SqliteQuery<'q>, conditions: &'q [Condition]) -> SqliteQuery<'q> {
    conditions
        .iter()
        .flat_map(|c| c.binds.iter())
        .fold(query, |q, value| match value {
            SqlValue::Int(v) => q.bind(*v),
            SqlValue::Text(v) => q.bind(v.as_str()),
        })
}

fn bind_scalar_conditions<'q>(
    query: SqliteScalar<'q>,
    conditions: &'q [Condition],
) -> SqliteScalar<'q> {
    conditions
        .iter()
        .flat_map(|c| c.binds.iter())
        .fold(query, |q, value| match value {
            SqlValue::Int(v) => q.bind(*v),
            SqlValue::Text(v) => q.bind(v.as_str()),
        })
}
