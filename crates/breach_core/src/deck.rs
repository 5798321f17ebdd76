//! Deck building.

use crate::cards::Card;
use crate::data::DeckRecipe;
use crate::ids::IdAllocator;
use crate::rng::SeededRandom;

/// Build and shuffle one starting deck.
///
/// Cards are created in recipe order (rolling random values as they are
/// created), then the whole deck is shuffled. The top of the deck is the
/// last element.
pub fn build_deck(recipe: &DeckRecipe, rng: &mut SeededRandom, ids: &mut IdAllocator) -> Vec<Card> {
    let mut cards = Vec::with_capacity(recipe.size());

    for entry in &recipe.entries {
        for _ in 0..entry.count {
            cards.push(entry.card.instantiate(ids.next_card(), rng));
        }
    }

    rng.shuffle(cards)
}
