//! Shared domain models.

use serde::{Deserialize, Serialize};

/// One entry of the arcade catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Short identifier (e.g. `1`).
    pub id: String,
    /// Human-readable game title.
    pub title: String,
    /// Genre badge shown on the card.
    pub genre: String,
    /// Average rating out of five.
    pub rating: f32,
    /// Cover image URL.
    pub image: String,
    /// One or two sentence pitch.
    pub description: String,
    /// Price label (all catalog titles are free).
    pub price: String,
}

impl Game {
    /// Star-prefixed rating label, e.g. `★ 4.9`.
    pub fn rating_label(&self) -> String {
        format!("★ {:.1}", self.rating)
    }

    /// Case-insensitive match against title, genre and description.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.genre.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_label_uses_one_decimal() {
        let game = Game {
            id: "x".to_string(),
            title: "Test".to_string(),
            genre: "Puzzle".to_string(),
            rating: 4.0,
            image: String::new(),
            description: String::new(),
            price: "Free".to_string(),
        };
        assert_eq!(game.rating_label(), "★ 4.0");
    }
}
