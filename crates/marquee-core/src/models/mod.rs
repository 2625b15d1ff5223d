//! Data models for the movie catalog.
//!
//! - `Genre`, `Actor`, `Movie`, `Review`: records as served by the API,
//!   each with a write payload (`*Input`) used for create and update
//! - `MovieStats`: aggregate numbers for the dashboard

pub mod actor;
pub mod genre;
pub mod movie;
pub mod review;

use serde::{de::DeserializeOwned, Serialize};

pub use actor::{Actor, ActorInput, Nationality};
pub use genre::{Genre, GenreInput};
pub use movie::{GenreCount, Movie, MovieInput, MovieStats};
pub use review::{Review, ReviewInput};

/// A catalog collection exposed as `/{PATH}/` and `/{PATH}/{id}/`.
pub trait Resource: Serialize + DeserializeOwned + Send {
    /// Collection segment in the API path, e.g. `movies`
    const PATH: &'static str;

    /// Payload accepted by create and update
    type Input: Serialize + DeserializeOwned + Send + Sync;

    fn id(&self) -> i64;

    /// Write payload carrying this record's current values
    fn to_input(&self) -> Self::Input;

    fn collection_path() -> String {
        format!("/{}/", Self::PATH)
    }

    fn item_path(id: i64) -> String {
        format!("/{}/{}/", Self::PATH, id)
    }
}
