//! Compiled-in arcade catalog.

use once_cell::sync::Lazy;

use crate::models::Game;

static GAMES: Lazy<Vec<Game>> = Lazy::new(|| {
    [
        (
            "1",
            "Excel Math Racer",
            "Edu-Racing",
            4.9,
            10,
            "Solve complex equations at lightspeed to power your cyber-sleigh through the neon track.",
        ),
        (
            "2",
            "Cherry Code Breaker",
            "Logic Puzzle",
            4.7,
            11,
            "Hack the naughty list mainframe using Python algorithms before time runs out.",
        ),
        (
            "3",
            "Forte Physics Flight",
            "Simulation",
            4.8,
            12,
            "Master aerodynamics and gravity vectors to guide the reindeer team safely.",
        ),
        (
            "4",
            "Holiday History Warp",
            "Adventure",
            4.5,
            13,
            "Travel back in time to discover the true origins of holiday traditions globally.",
        ),
        (
            "5",
            "Bio-Frost Lab",
            "Science",
            4.6,
            14,
            "Experiment with cryogenics and magical plant life in the North Pole greenhouse.",
        ),
        (
            "6",
            "Spelling Bee RPG",
            "Word Game",
            4.8,
            15,
            "Cast powerful spells by completing complex vocabulary challenges against frost giants.",
        ),
    ]
    .into_iter()
    .map(|(id, title, genre, rating, image_seed, description)| Game {
        id: id.to_string(),
        title: title.to_string(),
        genre: genre.to_string(),
        rating,
        image: format!("https://picsum.photos/400/300?random={image_seed}"),
        description: description.to_string(),
        price: "Free".to_string(),
    })
    .collect()
});

/// Read-only view over the fixed game list.
pub struct Catalog;

impl Catalog {
    /// All games in display order.
    pub fn games() -> &'static [Game] {
        &GAMES
    }

    /// Filter games using a case-insensitive substring search.
    pub fn games_matching(query: &str) -> Vec<&'static Game> {
        let needle = query.trim().to_lowercase();
        Self::games()
            .iter()
            .filter(|game| needle.is_empty() || game.matches(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_six_free_games() {
        let games = Catalog::games();
        assert_eq!(games.len(), 6);
        assert!(games.iter().all(|game| game.price == "Free"));
        assert_eq!(games[0].title, "Excel Math Racer");
        assert_eq!(games[5].image, "https://picsum.photos/400/300?random=15");
    }

    #[test]
    fn empty_query_returns_everything() {
        assert_eq!(Catalog::games_matching("   ").len(), 6);
    }

    #[test]
    fn query_matches_title_genre_and_description() {
        let by_title = Catalog::games_matching("BIO-frost");
        assert_eq!(by_title.len(), 1);
        assert_eq!(by_title[0].id, "5");

        let by_genre = Catalog::games_matching("word game");
        assert_eq!(by_genre.len(), 1);
        assert_eq!(by_genre[0].title, "Spelling Bee RPG");

        let by_description = Catalog::games_matching("reindeer");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].id, "3");

        assert!(Catalog::games_matching("battle royale").is_empty());
    }
}
