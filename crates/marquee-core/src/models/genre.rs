use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

impl Resource for Genre {
    const PATH: &'static str = "genres";
    type Input = GenreInput;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_input(&self) -> GenreInput {
        GenreInput {
            name: self.name.clone(),
        }
    }
}
