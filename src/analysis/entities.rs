//! Heuristic extraction of people and places from headlines.
//!
//! Spanish headlines capitalize only the first word, so a capitalized token
//! in the middle of a title is almost always a proper noun. Candidate spans
//! are maximal runs of capitalized tokens, with lowercase connectors
//! (`de`, `del`, `la`, `las`, `el`, `los`) allowed strictly inside a run.
//! `y` deliberately ends a run so coordinated names ("Trump y Putin") tally
//! as separate entities.
//!
//! A span is classified by lookup: known places go to the place tally, known
//! organizations and front-page furniture (VIDEO, EN VIVO, ...) are
//! discarded, and everything else counts as a person. The headline-initial
//! token alone is never treated as a name unless it is a known place, since
//! sentence-start capitalization is not evidence.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Lowercase connectors that may join capitalized tokens inside a span.
const CONNECTORS: [&str; 6] = ["de", "del", "la", "las", "el", "los"];

/// Known places, lowercased. Countries, capitals, and the metonyms a
/// Latin-American news feed leans on.
static PLACES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "eeuu", "ee uu", "estados unidos", "américa", "américa latina", "latinoamérica",
        "méxico", "argentina", "brasil", "chile", "colombia", "venezuela", "perú",
        "bolivia", "ecuador", "uruguay", "paraguay", "cuba", "nicaragua", "honduras",
        "guatemala", "el salvador", "panamá", "costa rica", "república dominicana",
        "haití", "puerto rico", "españa", "europa", "china", "rusia", "ucrania",
        "israel", "gaza", "irán", "irak", "siria", "líbano", "turquía", "francia",
        "alemania", "reino unido", "italia", "japón", "india", "canadá", "áfrica",
        "asia", "washington", "nueva york", "miami", "texas", "california", "florida",
        "buenos aires", "caracas", "bogotá", "lima", "santiago", "la habana",
        "ciudad de méxico", "brasilia", "quito", "montevideo", "asunción", "madrid",
        "kiev", "moscú", "pekín", "beijing", "jerusalén", "casa blanca", "wall street",
        "pentágono", "kremlin", "vaticano",
    ]
    .into_iter()
    .collect()
});

/// Spans discarded outright, lowercased: organizations (the charts only track
/// people and places) plus front-page furniture.
static DISCARDED: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "onu", "otan", "oea", "fmi", "ue", "unión europea", "fifa", "conmebol",
        "nasa", "fbi", "cia", "dea", "interpol", "hamas", "hezbollah", "isis",
        "mercosur", "banco mundial", "corte suprema", "congreso", "senado",
        "tesla", "apple", "google", "meta", "amazon", "netflix", "infobae",
        "video", "videos", "foto", "fotos", "en vivo", "en directo", "urgente",
        "último momento", "última hora",
    ]
    .into_iter()
    .collect()
});

/// Entity classes the charts track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityClass {
    Person,
    Place,
}

/// One extracted mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub text: String,
    pub class: EntityClass,
}

/// People and place tallies across a set of titles.
#[derive(Debug, Default)]
pub struct EntityCounts {
    pub people: HashMap<String, usize>,
    pub places: HashMap<String, usize>,
}

impl EntityCounts {
    pub fn is_empty(&self) -> bool {
        self.people.is_empty() && self.places.is_empty()
    }
}

/// Extract entity mentions from a single headline.
pub fn extract_entities(title: &str) -> Vec<Entity> {
    let tokens: Vec<&str> = title
        .split_whitespace()
        .map(clean_token)
        .filter(|t| !t.is_empty())
        .collect();

    let mut entities = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !is_capitalized(tokens[i]) {
            i += 1;
            continue;
        }

        let start = i;
        let mut run = vec![tokens[i]];
        let mut j = i + 1;
        loop {
            if j < tokens.len() && is_capitalized(tokens[j]) {
                run.push(tokens[j]);
                j += 1;
            } else if j + 1 < tokens.len()
                && is_connector(tokens[j])
                && is_capitalized(tokens[j + 1])
            {
                run.push(tokens[j]);
                run.push(tokens[j + 1]);
                j += 2;
            } else {
                break;
            }
        }
        i = j;

        let span = run.join(" ");
        if start == 0 && run.len() == 1 {
            // Only a known place rescues a lone sentence-start capital.
            if PLACES.contains(span.to_lowercase().as_str()) {
                entities.push(Entity {
                    text: span,
                    class: EntityClass::Place,
                });
            }
            continue;
        }

        if let Some(entity) = classify_span(&span) {
            entities.push(entity);
        }
    }

    entities
}

/// Tally people and places over all titles.
pub fn count_entities<'a, I>(titles: I) -> EntityCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = EntityCounts::default();
    for title in titles {
        for entity in extract_entities(title) {
            let tally = match entity.class {
                EntityClass::Person => &mut counts.people,
                EntityClass::Place => &mut counts.places,
            };
            *tally.entry(entity.text).or_insert(0) += 1;
        }
    }
    counts
}

fn classify_span(span: &str) -> Option<Entity> {
    let lower = span.to_lowercase();
    if PLACES.contains(lower.as_str()) {
        return Some(Entity {
            text: span.to_string(),
            class: EntityClass::Place,
        });
    }
    if DISCARDED.contains(lower.as_str()) {
        return None;
    }

    // "La Casa Blanca" style spans: retry without the leading article. Full
    // matches ran first so "El Salvador" stays intact.
    if let Some(rest) = strip_leading_article(span) {
        let rest_lower = rest.to_lowercase();
        if PLACES.contains(rest_lower.as_str()) {
            return Some(Entity {
                text: rest.to_string(),
                class: EntityClass::Place,
            });
        }
        if DISCARDED.contains(rest_lower.as_str()) {
            return None;
        }
        return Some(Entity {
            text: rest.to_string(),
            class: EntityClass::Person,
        });
    }

    Some(Entity {
        text: span.to_string(),
        class: EntityClass::Person,
    })
}

/// Strip one leading article when more tokens follow.
fn strip_leading_article(span: &str) -> Option<&str> {
    let (first, rest) = span.split_once(' ')?;
    let first_lower = first.to_lowercase();
    if ["la", "el", "los", "las"].contains(&first_lower.as_str()) {
        Some(rest)
    } else {
        None
    }
}

/// Strip surrounding punctuation (quotes, commas, inverted marks).
fn clean_token(raw: &str) -> &str {
    raw.trim_matches(|c: char| !c.is_alphanumeric())
}

fn is_capitalized(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

fn is_connector(token: &str) -> bool {
    CONNECTORS.contains(&token)
}
