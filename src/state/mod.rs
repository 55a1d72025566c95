/// State management module
///
/// This module handles all application state, including:
/// - Catalog database connections and queries (library.rs)
/// - Shared data structures (data.rs)
/// - The per-session filter, sort and lightbox state (session.rs)

pub mod data;
pub mod library;
pub mod session;
