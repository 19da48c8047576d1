//! Project name generation.
//!
//! Names are an adjective or colour followed by an animal, e.g.
//! `CrimsonWombat`. They are drawn from the operating system's CSPRNG so that
//! a project's URL is not guessable from its neighbours.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub const ADJECTIVES: &[&str] = &[
    "Abundant", "Agreeable", "Bewildered", "Boiling", "Brave", "Bumpy", "Calm", "Clever",
    "Climbing", "Crooked", "Cuddly", "Dapper", "Drab", "Eager", "Fancy", "Fluffy", "Gentle",
    "Gifted", "Grumpy", "Handsome", "Hasty", "Humble", "Jolly", "Lively", "Lucky",
    "Magnificent", "Melodic", "Mighty", "Nimble", "Obnoxious", "Patient", "Quiet", "Rapid",
    "Rustic", "Shallow", "Sleepy", "Sparse", "Sturdy", "Thundering", "Tidy", "Vivid",
    "Whispering", "Wandering", "Witty", "Zealous",
];

pub const COLORS: &[&str] = &[
    "Amber", "Auburn", "Azure", "Beige", "Brass", "Bronze", "Carmine", "Cerulean", "Champagne",
    "Cinnabar", "Cobalt", "Crimson", "Cyan", "Ebony", "Emerald", "Fuchsia", "Ginger", "Indigo",
    "Ivory", "Jade", "Lavender", "Lemon", "Mahogany", "Maroon", "Mauve", "Ochre", "Olive",
    "Saffron", "Scarlet", "Sepia", "Tan", "Tangerine", "Teal", "Vermillion", "Violet",
    "Viridian",
];

pub const ANIMALS: &[&str] = &[
    "Aardvark", "Albatross", "Alligator", "Alpaca", "Armadillo", "Badger", "Beaver", "Bison",
    "Buffalo", "Caribou", "Cheetah", "Chinchilla", "Cormorant", "Coyote", "Dugong", "Eagle",
    "Echidna", "Emu", "Ferret", "Flamingo", "Gazelle", "Gecko", "Giraffe", "Goose", "Grouse",
    "Hedgehog", "Heron", "Hippo", "Ibex", "Iguana", "Jackal", "Jaguar", "Kangaroo", "Koala",
    "Lemur", "Lion", "Llama", "Lynx", "Mallard", "Marmot", "Mongoose", "Narwhal", "Ocelot",
    "Otter", "Owl", "Panther", "Parrot", "Pelican", "Penguin", "Puffin", "Raven", "Rhino",
    "Seal", "Squirrel", "Swan", "Tapir", "Tiger", "Toucan", "Turkey", "Wallaby", "Walrus",
    "Weasel", "Wombat", "Yak", "Zebra",
];

/// Number of distinct names the word lists can produce.
pub fn namespace_size() -> usize {
    (ADJECTIVES.len() + COLORS.len()) * ANIMALS.len()
}

/// Draw one candidate name from `rng`. Adjectives and colours form a single
/// pool so each prefix word is equally likely.
pub fn candidate_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    let prefix_count = ADJECTIVES.len() + COLORS.len();
    let index = rng.gen_range(0..prefix_count);
    let prefix = if index < ADJECTIVES.len() {
        ADJECTIVES[index]
    } else {
        COLORS[index - ADJECTIVES.len()]
    };
    let animal = ANIMALS.choose(rng).copied().unwrap_or("Owl");
    format!("{prefix}{animal}")
}

/// Draw one candidate name from the OS random source.
pub fn candidate() -> String {
    candidate_with(&mut OsRng)
}

/// Keep drawing names until `is_taken` reports a free one.
///
/// Gives up after `max_attempts` draws and returns `Ok(None)`; errors from
/// `is_taken` are passed straight through.
pub fn generate_unique_name_with<R, E>(
    rng: &mut R,
    max_attempts: u32,
    is_taken: impl FnMut(&str) -> Result<bool, E>,
) -> Result<Option<String>, E>
where
    R: Rng + ?Sized,
{
    claim_unique_name_with(rng, max_attempts, is_taken, |name| Ok(Some(name)))
}

/// Draw a free name and hand it to `claim`, which returns `Ok(None)` when the
/// name turned out to be taken after all (e.g. a UNIQUE violation on insert).
///
/// Every draw counts against the same `max_attempts` budget, whether it was
/// rejected by `is_taken` or by `claim`.
pub fn claim_unique_name<T, E>(
    max_attempts: u32,
    is_taken: impl FnMut(&str) -> Result<bool, E>,
    claim: impl FnMut(String) -> Result<Option<T>, E>,
) -> Result<Option<T>, E> {
    claim_unique_name_with(&mut OsRng, max_attempts, is_taken, claim)
}

pub fn claim_unique_name_with<R, T, E>(
    rng: &mut R,
    max_attempts: u32,
    mut is_taken: impl FnMut(&str) -> Result<bool, E>,
    mut claim: impl FnMut(String) -> Result<Option<T>, E>,
) -> Result<Option<T>, E>
where
    R: Rng + ?Sized,
{
    for attempt in 1..=max_attempts {
        let name = candidate_with(rng);
        if is_taken(&name)? {
            tracing::debug!(attempt, name = %name, "Project name collision, retrying");
            continue;
        }
        if let Some(claimed) = claim(name)? {
            return Ok(Some(claimed));
        }
        tracing::debug!(attempt, "Project name claimed concurrently, retrying");
    }
    Ok(None)
}

/// Whether `name` could have come from [`candidate`].
pub fn is_well_formed(name: &str) -> bool {
    ADJECTIVES
        .iter()
        .chain(COLORS.iter())
        .filter_map(|prefix| name.strip_prefix(prefix))
        .any(|rest| ANIMALS.contains(&rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::convert::Infallible;

    #[test]
    fn candidates_combine_prefix_and_animal() {
        for _ in 0..200 {
            let name = candidate();
            assert!(is_well_formed(&name), "unexpected name {name}");
        }
    }

    #[test]
    fn word_lists_have_no_duplicates() {
        let prefixes: HashSet<_> = ADJECTIVES.iter().chain(COLORS.iter()).collect();
        assert_eq!(prefixes.len(), ADJECTIVES.len() + COLORS.len());
        let animals: HashSet<_> = ANIMALS.iter().collect();
        assert_eq!(animals.len(), ANIMALS.len());
        assert!(namespace_size() > 5000);
    }

    #[test]
    fn retries_past_taken_names() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = Vec::new();
        let name = generate_unique_name_with(&mut rng, 10, |n| {
            seen.push(n.to_string());
            Ok::<_, Infallible>(seen.len() < 3)
        })
        .unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(name.as_deref(), seen.last().map(String::as_str));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut calls = 0;
        let name = generate_unique_name_with(&mut rng, 4, |_| {
            calls += 1;
            Ok::<_, Infallible>(true)
        })
        .unwrap();
        assert!(name.is_none());
        assert_eq!(calls, 4);
    }

    #[test]
    fn lookup_errors_propagate() {
        let result = claim_unique_name(4, |_| Err::<bool, _>("db down"), |n| Ok(Some(n)));
        assert_eq!(result, Err("db down"));
    }

    #[test]
    fn failed_claims_share_the_attempt_budget() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut lookups = 0;
        let mut claims = 0;
        let claimed = claim_unique_name_with(
            &mut rng,
            6,
            |_| {
                lookups += 1;
                // Every other draw looks taken
                Ok::<_, Infallible>(lookups % 2 == 0)
            },
            |_| {
                claims += 1;
                Ok::<Option<String>, Infallible>(None)
            },
        )
        .unwrap();
        assert!(claimed.is_none());
        assert_eq!(lookups, 6);
        assert_eq!(claims, 3);
    }

    #[test]
    fn successful_claim_returns_its_value() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut claims = 0;
        let claimed = claim_unique_name_with(
            &mut rng,
            5,
            |_| Ok::<_, Infallible>(false),
            |name| {
                claims += 1;
                Ok::<_, Infallible>((claims == 2).then_some(name))
            },
        )
        .unwrap();
        assert_eq!(claims, 2);
        assert!(claimed.is_some_and(|n| is_well_formed(&n)));
    }

    #[test]
    fn rejects_names_outside_the_word_lists() {
        assert!(is_well_formed("CrimsonWombat"));
        assert!(!is_well_formed("CrimsonDragon"));
        assert!(!is_well_formed("Wombat"));
        assert!(!is_well_formed(""));
    }
}
