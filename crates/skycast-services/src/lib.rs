pub mod favorite;
pub mod favorite_client;
pub mod favorite_store;
pub mod memory_store;

pub use favorite::{FavoriteError, FavoriteLocation, FavoriteResult, FavoriteStore, NewFavorite};
pub use favorite_client::FavoriteClient;
pub use favorite_store::SqliteFavoriteStore;
pub use memory_store::MemoryFavoriteStore;
