use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    /// Id of the reviewed movie
    pub movie: i64,
    pub stars: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Review {
    /// Star rating rendered as five filled/empty glyphs
    pub fn star_display(&self) -> String {
        let filled = usize::from(self.stars.min(5));
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInput {
    pub movie: i64,
    pub stars: u8,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Resource for Review {
    const PATH: &'static str = "reviews";
    type Input = ReviewInput;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_input(&self) -> ReviewInput {
        ReviewInput {
            movie: self.movie,
            stars: self.stars,
            comment: self.comment.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_display() {
        let review = Review {
            id: 1,
            movie: 1,
            stars: 3,
            comment: None,
        };
        assert_eq!(review.star_display(), "★★★☆☆");

        let out_of_range = Review { stars: 9, ..review };
        assert_eq!(out_of_range.star_display(), "★★★★★");
    }
}
