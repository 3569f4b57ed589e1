//! Randomised query parameters that keep CDN edges from serving stale announcement pages.

use rand::seq::SliceRandom;
use rand::Rng;

const MAX_RANDOM_NUMBER: u128 = 99_999_999_999_999_999_999;
const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Random number in `1..=99999999999999999999`.
pub fn random_number<R: Rng + ?Sized>(rng: &mut R) -> u128 {
    rng.gen_range(1..=MAX_RANDOM_NUMBER)
}

/// Random key of 10 to 20 ASCII letters.
pub fn random_key<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.gen_range(10..=20);
    (0..len)
        .map(|_| LETTERS[rng.gen_range(0..LETTERS.len())] as char)
        .collect()
}

/// `key=value` pair with a random key and a random numeric value.
pub fn random_pair<R: Rng + ?Sized>(rng: &mut R) -> String {
    let key = random_key(rng);
    format!("{}={}", key, random_number(rng))
}

/// Shuffles the pairs and joins them into a query string.
pub fn shuffled_query<R: Rng + ?Sized>(mut pairs: Vec<String>, rng: &mut R) -> String {
    pairs.shuffle(rng);
    pairs.join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_key_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let key = random_key(&mut rng);
            assert!((10..=20).contains(&key.len()), "bad length: {}", key);
            assert!(key.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn test_random_number_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let n = random_number(&mut rng);
            assert!(n >= 1 && n <= MAX_RANDOM_NUMBER);
        }
    }

    #[test]
    fn test_shuffled_query_keeps_every_pair() {
        let mut rng = StdRng::seed_from_u64(3);
        let pairs = vec![
            "page=1".to_string(),
            "lang=en_US".to_string(),
            "annType=new-listings".to_string(),
        ];
        let query = shuffled_query(pairs.clone(), &mut rng);

        let mut parts: Vec<&str> = query.split('&').collect();
        parts.sort();
        let mut expected: Vec<&str> = pairs.iter().map(String::as_str).collect();
        expected.sort();
        assert_eq!(parts, expected);
    }
}
