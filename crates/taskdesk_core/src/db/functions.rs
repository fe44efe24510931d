//! Application-defined SQL functions.
//!
//! Built-in `lower()` only folds ASCII; search needs full Unicode folding.

use rusqlite::functions::FunctionFlags;
use rusqlite::Connection;

/// Registers every application SQL function on `conn`: currently
/// `unicode_lower(text)`.
///
/// Re-registering replaces the previous definition, so calling this more
/// than once per connection is harmless.
pub fn register_sql_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        "unicode_lower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: Option<String> = ctx.get(0)?;
            Ok(value.map(|text| text.to_lowercase()))
        },
    )
}
