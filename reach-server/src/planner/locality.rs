//! Locality grouping of stations.
//!
//! A destination in the origin's own town ("Paris Bercy" from "Paris Gare de
//! Lyon") is not an interesting result. Deciding that two stations share a
//! locality is heuristic and dataset-specific, so it is a strategy passed to
//! the search rather than a fixed rule. Either kind of misgrouping is
//! tolerated.

/// Decides whether two station names belong to the same locality.
pub trait LocalityGrouping: Send + Sync {
    /// Normalized locality of a station name, if one can be derived.
    fn locality_key(&self, name: &str) -> Option<String>;

    /// True if both names have a locality and it is the same.
    fn same_locality(&self, a: &str, b: &str) -> bool {
        match (self.locality_key(a), self.locality_key(b)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Never groups stations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocalityGrouping;

impl LocalityGrouping for NoLocalityGrouping {
    fn locality_key(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Groups stations by the place name their display name starts with.
///
/// Names are accent-folded and lower-cased. A leading "Gare de" is dropped,
/// "St"/"Ste" read as "Saint"/"Sainte", and a saint's name or an article
/// ("Le Mans") stays attached to the word that follows it.
///
/// ```
/// use reach_server::planner::{LeadingPlaceName, LocalityGrouping};
///
/// let grouping = LeadingPlaceName;
/// assert!(grouping.same_locality("Paris Gare de Lyon", "Paris Austerlitz"));
/// assert!(grouping.same_locality("St-Étienne Châteaucreux", "Saint-Etienne Bellevue"));
/// assert!(!grouping.same_locality("Le Mans", "Le Havre"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingPlaceName;

const JOINING_WORDS: &[&str] = &["saint", "sainte", "le", "la", "les", "l"];

impl LocalityGrouping for LeadingPlaceName {
    fn locality_key(&self, name: &str) -> Option<String> {
        let folded = fold_accents(name).to_lowercase();
        let mut words: Vec<&str> = folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.first() == Some(&"gare") {
            let skip = match words.get(1) {
                Some(&("de" | "du" | "des" | "d")) => 2,
                _ => 1,
            };
            words.drain(..skip.min(words.len()));
        }

        let mut words = words.into_iter().map(|w| match w {
            "st" => "saint",
            "ste" => "sainte",
            other => other,
        });
        let first = words.next()?;
        if JOINING_WORDS.contains(&first) {
            if let Some(next) = words.next() {
                return Some(format!("{first} {next}"));
            }
        }
        Some(first.to_string())
    }
}

/// Replaces accented Latin letters with their base letters.
///
/// Covers the letters found in French station names; anything else passes
/// through unchanged.
pub fn fold_accents(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'à' | 'â' | 'ä' | 'á' | 'ã' | 'å' => out.push('a'),
            'À' | 'Â' | 'Ä' | 'Á' | 'Ã' | 'Å' => out.push('A'),
            'é' | 'è' | 'ê' | 'ë' => out.push('e'),
            'É' | 'È' | 'Ê' | 'Ë' => out.push('E'),
            'î' | 'ï' | 'í' | 'ì' => out.push('i'),
            'Î' | 'Ï' | 'Í' | 'Ì' => out.push('I'),
            'ô' | 'ö' | 'ó' | 'ò' | 'õ' => out.push('o'),
            'Ô' | 'Ö' | 'Ó' | 'Ò' | 'Õ' => out.push('O'),
            'ù' | 'û' | 'ü' | 'ú' => out.push('u'),
            'Ù' | 'Û' | 'Ü' | 'Ú' => out.push('U'),
            'ÿ' => out.push('y'),
            'Ÿ' => out.push('Y'),
            'ç' => out.push('c'),
            'Ç' => out.push('C'),
            'ñ' => out.push('n'),
            'Ñ' => out.push('N'),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            other => out.push(other),
        }
    }
    out
}
