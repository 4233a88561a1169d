pub mod card;
pub mod config;
pub mod history;
pub mod train;

use nagora_core::{Card, Database, Library, ValidationError};

/// Open the on-disk library.
fn open_library() -> Result<(Database, Library), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let library = Library::load(&db);
    Ok((db, library))
}

fn find_card<'a>(library: &'a Library, id: &str) -> Result<&'a Card, ValidationError> {
    library
        .card(id)
        .ok_or_else(|| ValidationError::CardNotFound(id.to_string()))
}
