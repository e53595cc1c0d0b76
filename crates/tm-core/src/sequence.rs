//! Deterministic ordering of validated migrations.

use crate::migration::Migration;

/// Order migrations for forward application.
///
/// Ascending number, with `Up` before `Down` for the same number. The result
/// depends only on the records themselves, never on the order the source
/// enumerated them in.
pub fn sequence(mut migrations: Vec<Migration>) -> Vec<Migration> {
    migrations.sort_by_key(Migration::key);
    migrations
}
