//! Form adapters: editable drafts with a nullable identifier, convertible
//! back into either a draft (create) or a persisted entity (update).

use crate::models::{Board, Card, Line, LineRef, NewBoard, NewCard, NewLine};

/// Value read back from a board form. The variant decides the save call.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardFormValue {
    New(NewBoard),
    Existing(Board),
}

/// Editable board state backing a create/edit view.
#[derive(Debug, Clone, Default)]
pub struct BoardForm {
    pub id: Option<i64>,
    pub title: Option<String>,
}

impl BoardForm {
    /// Blank draft for the "new" form.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entity(board: &Board) -> Self {
        BoardForm {
            id: Some(board.id),
            title: board.title.clone(),
        }
    }

    pub fn reset(&mut self, board: &Board) {
        *self = Self::from_entity(board);
    }

    pub fn value(&self) -> BoardFormValue {
        match self.id {
            Some(id) => BoardFormValue::Existing(Board {
                id,
                title: self.title.clone(),
            }),
            None => BoardFormValue::New(NewBoard {
                title: self.title.clone(),
            }),
        }
    }
}

/// Value read back from a line form.
#[derive(Debug, Clone, PartialEq)]
pub enum LineFormValue {
    New(NewLine),
    Existing(Line),
}

/// Editable line state backing a create/edit view.
#[derive(Debug, Clone, Default)]
pub struct LineForm {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub board: Option<Board>,
}

impl LineForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entity(line: &Line) -> Self {
        LineForm {
            id: Some(line.id),
            title: line.title.clone(),
            board: line.board.clone(),
        }
    }

    pub fn reset(&mut self, line: &Line) {
        *self = Self::from_entity(line);
    }

    pub fn value(&self) -> LineFormValue {
        match self.id {
            Some(id) => LineFormValue::Existing(Line {
                id,
                title: self.title.clone(),
                board: self.board.clone(),
            }),
            None => LineFormValue::New(NewLine {
                title: self.title.clone(),
                board: self.board.clone(),
            }),
        }
    }
}

/// Value read back from a card form.
#[derive(Debug, Clone, PartialEq)]
pub enum CardFormValue {
    New(NewCard),
    Existing(Card),
}

/// Editable card state backing a create/edit view.
#[derive(Debug, Clone, Default)]
pub struct CardForm {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub level: Option<i32>,
    pub desc: Option<String>,
    pub line: Option<LineRef>,
}

impl CardForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entity(card: &Card) -> Self {
        CardForm {
            id: Some(card.id),
            title: card.title.clone(),
            level: card.level,
            desc: card.desc.clone(),
            line: card.line.clone(),
        }
    }

    pub fn reset(&mut self, card: &Card) {
        *self = Self::from_entity(card);
    }

    pub fn value(&self) -> CardFormValue {
        match self.id {
            Some(id) => CardFormValue::Existing(Card {
                id,
                title: self.title.clone(),
                level: self.level,
                desc: self.desc.clone(),
                line: self.line.clone(),
            }),
            None => CardFormValue::New(NewCard {
                title: self.title.clone(),
                level: self.level,
                desc: self.desc.clone(),
                line: self.line.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_yields_draft() {
        let form = BoardForm::new();
        assert_eq!(form.id, None);
        assert_eq!(form.value(), BoardFormValue::New(NewBoard { title: None }));
    }

    #[test]
    fn test_form_round_trips_persisted_entity() {
        let board = Board {
            id: 31483,
            title: Some("roadmap".to_string()),
        };

        let form = BoardForm::from_entity(&board);
        assert_eq!(form.value(), BoardFormValue::Existing(board));
    }

    #[test]
    fn test_reset_replaces_draft_state() {
        let mut form = CardForm::new();
        form.title = Some("unsaved edits".to_string());

        let card = Card {
            id: 9,
            title: Some("persisted".to_string()),
            level: Some(2),
            desc: None,
            line: Some(LineRef { id: 4 }),
        };
        form.reset(&card);

        assert_eq!(form.id, Some(9));
        assert_eq!(form.title.as_deref(), Some("persisted"));
        assert_eq!(form.line, Some(LineRef { id: 4 }));
    }
}
