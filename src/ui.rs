use std::io::Write;
use std::sync::Mutex;
use tracing::info;

pub mod messages {
    pub const CONNECTING: &str = "Connecting to the server...";
    pub const LOGIN_FAILED: &str = "Error logging in";
    pub const REGISTERED: &str = "User registered successfully!";
    pub const REGISTER_FAILED: &str = "Error registering user.";
    pub const LOGIN_TIMEOUT: &str =
        "Request timed out. The server may be asleep, try again in a few seconds.";
    pub const TIMEOUT: &str = "Request timed out. The server may be asleep or slow, try again.";
    pub const TABLE_CREATED: &str = "Table created successfully!";
    pub const TABLE_CREATE_FAILED: &str = "Error creating table.";
    pub const TABLE_DELETED: &str = "Table deleted.";
    pub const TABLE_DELETE_FAILED: &str = "Error deleting table.";
    pub const TABLES_LOADING: &str = "Loading tables...";
    pub const TABLES_EMPTY: &str = "No tables found.";
    pub const TABLES_TIMEOUT: &str =
        "The server took too long to respond. It may be waking up, try again.";
    pub const TABLES_FAILED: &str = "Error loading tables.";
    pub const ITEMS_FAILED: &str = "Error loading table items.";
    pub const ITEM_ADDED: &str = "Item added successfully!";
    pub const ITEM_ADD_FAILED: &str = "Error adding item.";
    pub const ITEM_DELETED: &str = "Item deleted.";
    pub const ITEM_DELETE_FAILED: &str = "Error deleting item.";
    pub const PONTO_RECORDED: &str = "Time clock entry recorded!";
    pub const PONTO_FAILED: &str = "Error recording time clock entry";
    pub const EXPORT_FAILED: &str = "Error exporting";
    pub const PASSWORD_RESET: &str = "Password reset successfully!";
    pub const PASSWORD_RESET_FAILED: &str = "Error resetting password.";

    pub fn welcome(user: &str) -> String {
        format!("Login successful! Welcome, {user}")
    }
}

/// Where post-login navigation lands.
pub const POST_LOGIN_LOCATION: &str = "home.html";
pub const LOGIN_LOCATION: &str = "index.html";

/// Rendered state of the table listing area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableListing {
    Loading,
    Empty,
    Tables(Vec<String>),
    Failed(String),
}

/// What the handlers can do to the page the user is looking at.
pub trait Surface: Send + Sync {
    fn alert(&self, message: &str);
    fn navigate(&self, location: &str);
    fn show_loading(&self, text: &str);
    fn hide_loading(&self);
    fn render_tables(&self, listing: &TableListing);
    fn render_items(&self, table: &str, columns: &[&str], rows: &[Vec<String>]);
    fn display_text(&self, text: &str);
}

/// Shows a transient indicator for as long as it lives.
///
/// Dropping the guard removes the indicator on every exit path, including
/// when the owning future is cancelled mid-request.
pub struct LoadingIndicator<'a> {
    surface: &'a dyn Surface,
}

impl<'a> LoadingIndicator<'a> {
    pub fn show(surface: &'a dyn Surface, text: &str) -> Self {
        surface.show_loading(text);
        Self { surface }
    }
}

impl Drop for LoadingIndicator<'_> {
    fn drop(&mut self) {
        self.surface.hide_loading();
    }
}

/// Surface backed by the terminal.
#[derive(Debug, Default)]
pub struct TerminalSurface;

impl Surface for TerminalSurface {
    fn alert(&self, message: &str) {
        println!("{message}");
    }

    fn navigate(&self, location: &str) {
        info!("navigate to {location}");
    }

    fn show_loading(&self, text: &str) {
        eprintln!("{text}");
    }

    fn hide_loading(&self) {}

    fn render_tables(&self, listing: &TableListing) {
        match listing {
            TableListing::Loading => eprintln!("{}", messages::TABLES_LOADING),
            TableListing::Empty => println!("{}", messages::TABLES_EMPTY),
            TableListing::Tables(names) => {
                for name in names {
                    println!("- {name}");
                }
            }
            TableListing::Failed(message) => eprintln!("{message}"),
        }
    }

    fn render_items(&self, table: &str, columns: &[&str], rows: &[Vec<String>]) {
        println!("{table}");
        println!("{}", columns.join("\t"));
        for row in rows {
            println!("{}", row.join("\t"));
        }
    }

    fn display_text(&self, text: &str) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\r{text}");
        let _ = stdout.flush();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Alert(String),
    Navigate(String),
    LoadingShown(String),
    LoadingHidden,
    Tables(TableListing),
    Items { table: String, rows: Vec<Vec<String>> },
    Text(String),
}

/// Surface that records every call, for headless use and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.lock().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Alert(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Navigate(location) => Some(location.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_listing(&self) -> Option<TableListing> {
        self.lock().iter().rev().find_map(|event| match event {
            SurfaceEvent::Tables(listing) => Some(listing.clone()),
            _ => None,
        })
    }

    /// Rows of the most recently rendered table, with its name.
    pub fn last_items(&self) -> Option<(String, Vec<Vec<String>>)> {
        self.lock().iter().rev().find_map(|event| match event {
            SurfaceEvent::Items { table, rows } => Some((table.clone(), rows.clone())),
            _ => None,
        })
    }

    pub fn loading_visible(&self) -> bool {
        let mut visible = false;
        for event in self.lock().iter() {
            match event {
                SurfaceEvent::LoadingShown(_) => visible = true,
                SurfaceEvent::LoadingHidden => visible = false,
                _ => {}
            }
        }
        visible
    }

    fn push(&self, event: SurfaceEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SurfaceEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Surface for RecordingSurface {
    fn alert(&self, message: &str) {
        self.push(SurfaceEvent::Alert(message.to_string()));
    }

    fn navigate(&self, location: &str) {
        self.push(SurfaceEvent::Navigate(location.to_string()));
    }

    fn show_loading(&self, text: &str) {
        self.push(SurfaceEvent::LoadingShown(text.to_string()));
    }

    fn hide_loading(&self) {
        self.push(SurfaceEvent::LoadingHidden);
    }

    fn render_tables(&self, listing: &TableListing) {
        self.push(SurfaceEvent::Tables(listing.clone()));
    }

    fn render_items(&self, table: &str, _columns: &[&str], rows: &[Vec<String>]) {
        self.push(SurfaceEvent::Items {
            table: table.to_string(),
            rows: rows.to_vec(),
        });
    }

    fn display_text(&self, text: &str) {
        self.push(SurfaceEvent::Text(text.to_string()));
    }
}
