use crate::modal::Key;

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveEdit {
    row: usize,
    col: usize,
    original: String,
    input: String,
}

/// A grid of text cells where every column but the first can be edited in
/// place. At most one cell is being edited at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditableTable {
    rows: Vec<Vec<String>>,
    active: Option<ActiveEdit>,
}

impl EditableTable {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows, active: None }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn editing(&self) -> Option<(usize, usize)> {
        self.active.as_ref().map(|edit| (edit.row, edit.col))
    }

    /// Current text of the overlay input, if an edit is in progress.
    pub fn input_value(&self) -> Option<&str> {
        self.active.as_ref().map(|edit| edit.input.as_str())
    }

    /// Double-click handler. Starting a new edit first commits the one in
    /// progress, the same way its input losing focus would.
    pub fn begin_edit(&mut self, row: usize, col: usize) -> bool {
        if col == 0 {
            return false;
        }
        let Some(current) = self.cell(row, col).map(str::to_string) else {
            return false;
        };
        if self.editing() == Some((row, col)) {
            return true;
        }

        self.commit();
        self.active = Some(ActiveEdit {
            row,
            col,
            original: current.clone(),
            input: current,
        });
        true
    }

    pub fn type_text(&mut self, text: &str) {
        if let Some(edit) = self.active.as_mut() {
            edit.input = text.to_string();
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Enter => self.commit(),
            Key::Escape => self.cancel(),
            Key::Tab { .. } | Key::Other => {}
        }
    }

    pub fn blur(&mut self) {
        self.commit();
    }

    /// Writes the trimmed input into the cell; a blank input keeps the
    /// original value.
    pub fn commit(&mut self) {
        let Some(edit) = self.active.take() else {
            return;
        };
        let value = edit.input.trim();
        let next = if value.is_empty() {
            edit.original
        } else {
            value.to_string()
        };
        self.rows[edit.row][edit.col] = next;
    }

    pub fn cancel(&mut self) {
        if let Some(edit) = self.active.take() {
            self.rows[edit.row][edit.col] = edit.original;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> EditableTable {
        EditableTable::new(vec![
            vec!["1".into(), "Pipette tips".into(), "10".into()],
            vec!["2".into(), "Gloves".into(), "3".into()],
        ])
    }

    #[test]
    fn first_column_is_not_editable() {
        let mut table = table();
        assert!(!table.begin_edit(0, 0));
        assert_eq!(table.editing(), None);
        assert!(!table.begin_edit(9, 1));
    }

    #[test]
    fn enter_commits_trimmed_value() {
        let mut table = table();
        assert!(table.begin_edit(0, 2));
        assert_eq!(table.input_value(), Some("10"));
        table.type_text(" 42 ");
        table.handle_key(Key::Enter);
        assert_eq!(table.cell(0, 2), Some("42"));
        assert_eq!(table.editing(), None);
    }

    #[test]
    fn blank_commit_keeps_original() {
        let mut table = table();
        table.begin_edit(1, 1);
        table.type_text("   ");
        table.blur();
        assert_eq!(table.cell(1, 1), Some("Gloves"));
    }

    #[test]
    fn escape_always_restores() {
        let mut table = table();
        table.begin_edit(1, 2);
        table.type_text("999");
        table.handle_key(Key::Escape);
        assert_eq!(table.cell(1, 2), Some("3"));
    }

    #[test]
    fn only_one_cell_edits_at_a_time() {
        let mut table = table();
        table.begin_edit(0, 1);
        table.type_text("Filter tips");
        table.begin_edit(1, 2);
        assert_eq!(table.editing(), Some((1, 2)));
        assert_eq!(table.cell(0, 1), Some("Filter tips"));
    }
}
