/// Inventory catalog service
///
/// Registers physical inventory items, each optionally carrying one photo,
/// and keeps item records and their photo blobs consistent across create,
/// replace, and delete.
pub mod api;
pub mod asset_store;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod item_store;
pub mod server;
pub mod service;
