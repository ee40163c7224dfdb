//! Message catalogs.

mod builtin_catalog;

pub use builtin_catalog::BuiltinMessageCatalog;
