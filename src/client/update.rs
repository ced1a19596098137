//! Update controllers: one per entity, driving the create/edit views.
//!
//! A controller initializes from a resolved route (existing record or blank
//! draft), loads the related-entity collections its pickers need, and saves
//! by branching on the form value: an existing record goes through update, a
//! draft through create. While a save is in flight `is_saving` is true so
//! the view can disable resubmission.

use crate::models::{Board, Card, Line};

use super::{
    BoardForm, BoardFormValue, CardForm, CardFormValue, ClientError, EntityService, LineForm,
    LineFormValue, ListQuery, Resolved,
};

/// Effect a successful save asks the host to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveOutcome {
    /// Navigate back to the previous view.
    NavigateBack,
}

async fn save_with_flag<E, F>(
    is_saving: &mut bool,
    call: F,
) -> Result<SaveOutcome, ClientError>
where
    F: std::future::Future<Output = Result<E, ClientError>>,
{
    *is_saving = true;
    let result = call.await;
    *is_saving = false;
    // On failure nothing is navigated; the error is the extension point for
    // hosts that want to surface it.
    result.map(|_| SaveOutcome::NavigateBack)
}

/// Controller backing the board create/edit view. Boards reference nothing,
/// so there are no pickers to populate.
pub struct BoardUpdateController {
    board_service: EntityService<Board>,
    pub is_saving: bool,
    pub board: Option<Board>,
    pub form: BoardForm,
}

impl BoardUpdateController {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            board_service: EntityService::new(http, base_url),
            is_saving: false,
            board: None,
            form: BoardForm::new(),
        }
    }

    pub fn init(&mut self, resolved: Resolved<Board>) {
        if let Resolved::Entity(board) = resolved {
            self.form.reset(&board);
            self.board = Some(board);
        }
    }

    pub async fn save(&mut self) -> Result<SaveOutcome, ClientError> {
        match self.form.value() {
            BoardFormValue::Existing(board) => {
                save_with_flag(&mut self.is_saving, self.board_service.update(&board)).await
            }
            BoardFormValue::New(draft) => {
                save_with_flag(&mut self.is_saving, self.board_service.create(&draft)).await
            }
        }
    }
}

/// Controller backing the line create/edit view; populates the board picker.
pub struct LineUpdateController {
    line_service: EntityService<Line>,
    board_service: EntityService<Board>,
    pub is_saving: bool,
    pub line: Option<Line>,
    pub boards_shared_collection: Vec<Board>,
    pub form: LineForm,
}

impl LineUpdateController {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            line_service: EntityService::new(http.clone(), base_url),
            board_service: EntityService::new(http, base_url),
            is_saving: false,
            line: None,
            boards_shared_collection: Vec::new(),
            form: LineForm::new(),
        }
    }

    pub async fn init(&mut self, resolved: Resolved<Line>) -> Result<(), ClientError> {
        if let Resolved::Entity(line) = resolved {
            self.update_form(line);
        }
        self.load_relationships_options().await
    }

    fn update_form(&mut self, line: Line) {
        self.form.reset(&line);
        let collection = std::mem::take(&mut self.boards_shared_collection);
        self.boards_shared_collection = self
            .board_service
            .merge_missing(collection, [line.board.clone()]);
        self.line = Some(line);
    }

    /// Query the shared board collection and make sure the line's current
    /// board is selectable even when it is not on the fetched page.
    async fn load_relationships_options(&mut self) -> Result<(), ClientError> {
        let boards = self.board_service.query(&ListQuery::default()).await?.items;
        let current = self.line.as_ref().and_then(|l| l.board.clone());
        self.boards_shared_collection = self.board_service.merge_missing(boards, [current]);
        Ok(())
    }

    pub async fn save(&mut self) -> Result<SaveOutcome, ClientError> {
        match self.form.value() {
            LineFormValue::Existing(line) => {
                save_with_flag(&mut self.is_saving, self.line_service.update(&line)).await
            }
            LineFormValue::New(draft) => {
                save_with_flag(&mut self.is_saving, self.line_service.create(&draft)).await
            }
        }
    }
}

/// Controller backing the card create/edit view; populates the line picker.
pub struct CardUpdateController {
    card_service: EntityService<Card>,
    line_service: EntityService<Line>,
    pub is_saving: bool,
    pub card: Option<Card>,
    pub lines_shared_collection: Vec<Line>,
    pub form: CardForm,
}

impl CardUpdateController {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            card_service: EntityService::new(http.clone(), base_url),
            line_service: EntityService::new(http, base_url),
            is_saving: false,
            card: None,
            lines_shared_collection: Vec::new(),
            form: CardForm::new(),
        }
    }

    pub async fn init(&mut self, resolved: Resolved<Card>) -> Result<(), ClientError> {
        if let Resolved::Entity(card) = resolved {
            self.update_form(card);
        }
        self.load_relationships_options().await
    }

    fn update_form(&mut self, card: Card) {
        self.form.reset(&card);
        let collection = std::mem::take(&mut self.lines_shared_collection);
        self.lines_shared_collection = self
            .line_service
            .merge_missing(collection, [card.line.clone().map(Line::from)]);
        self.card = Some(card);
    }

    async fn load_relationships_options(&mut self) -> Result<(), ClientError> {
        let lines = self.line_service.query(&ListQuery::default()).await?.items;
        let current = self
            .card
            .as_ref()
            .and_then(|c| c.line.clone())
            .map(Line::from);
        self.lines_shared_collection = self.line_service.merge_missing(lines, [current]);
        Ok(())
    }

    pub async fn save(&mut self) -> Result<SaveOutcome, ClientError> {
        match self.form.value() {
            CardFormValue::Existing(card) => {
                save_with_flag(&mut self.is_saving, self.card_service.update(&card)).await
            }
            CardFormValue::New(draft) => {
                save_with_flag(&mut self.is_saving, self.card_service.create(&draft)).await
            }
        }
    }
}
