//! Lexicon-based polarity scoring for Spanish headlines.
//!
//! Each headline gets a polarity in [-1, 1]: the mean weight of its lexicon
//! matches, with a small negation window that flips the sign of a scored word
//! when a negator precedes it. Headlines with no matches score 0.0, so an
//! out-of-domain title lands in the neutral band instead of failing.

use crate::analysis::text::tokenize;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Scores strictly above this are classified positive.
pub const POSITIVE_THRESHOLD: f64 = 0.05;

/// Scores strictly below this are classified negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

/// A negator within this many tokens before a scored word flips its sign.
const NEGATION_WINDOW: usize = 2;

const NEGATORS: [&str; 5] = ["no", "sin", "nunca", "jamás", "tampoco"];

/// Weighted Spanish sentiment lexicon, news register. Weights are in
/// [-1, 1]; stronger words carry larger magnitudes.
static LEXICON: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    [
        // negative
        ("masacre", -1.0),
        ("asesinato", -1.0),
        ("asesinado", -0.95),
        ("asesinada", -0.95),
        ("atentado", -0.95),
        ("muerte", -0.9),
        ("muertos", -0.9),
        ("muertas", -0.9),
        ("murió", -0.9),
        ("murieron", -0.9),
        ("falleció", -0.9),
        ("guerra", -0.9),
        ("secuestro", -0.9),
        ("tiroteo", -0.9),
        ("mató", -0.9),
        ("bombardeo", -0.85),
        ("ataque", -0.8),
        ("ataques", -0.8),
        ("violencia", -0.8),
        ("víctimas", -0.8),
        ("corrupción", -0.8),
        ("fraude", -0.8),
        ("narcotráfico", -0.8),
        ("pánico", -0.8),
        ("colapso", -0.8),
        ("tragedia", -0.9),
        ("crisis", -0.7),
        ("amenaza", -0.7),
        ("amenazas", -0.7),
        ("heridos", -0.7),
        ("herido", -0.7),
        ("terremoto", -0.7),
        ("escándalo", -0.7),
        ("pobreza", -0.7),
        ("desempleo", -0.7),
        ("recesión", -0.7),
        ("fracaso", -0.7),
        ("peligro", -0.7),
        ("derrumbe", -0.7),
        ("femicidio", -1.0),
        ("incendio", -0.6),
        ("inundaciones", -0.6),
        ("condena", -0.6),
        ("cárcel", -0.6),
        ("conflicto", -0.6),
        ("inflación", -0.6),
        ("pérdidas", -0.6),
        ("enfermedad", -0.6),
        ("miedo", -0.6),
        ("derrota", -0.6),
        ("grave", -0.6),
        ("denuncia", -0.5),
        ("tensión", -0.5),
        ("caída", -0.5),
        ("déficit", -0.5),
        ("riesgo", -0.5),
        ("alarma", -0.5),
        ("polémica", -0.5),
        ("sanciones", -0.5),
        ("protesta", -0.4),
        ("protestas", -0.4),
        ("huelga", -0.4),
        ("renuncia", -0.4),
        // positive
        ("paz", 0.8),
        ("éxito", 0.8),
        ("triunfo", 0.7),
        ("victoria", 0.7),
        ("campeón", 0.7),
        ("logro", 0.7),
        ("alegría", 0.7),
        ("acuerdo", 0.6),
        ("récord", 0.6),
        ("crecimiento", 0.6),
        ("mejora", 0.6),
        ("recuperación", 0.6),
        ("celebración", 0.6),
        ("esperanza", 0.6),
        ("premio", 0.6),
        ("libertad", 0.6),
        ("bienestar", 0.6),
        ("gana", 0.6),
        ("ganó", 0.6),
        ("ganador", 0.6),
        ("avance", 0.5),
        ("avanza", 0.5),
        ("innovación", 0.5),
        ("descubrimiento", 0.5),
        ("solución", 0.5),
        ("rescatados", 0.5),
        ("sobrevivió", 0.5),
        ("fortalece", 0.5),
        ("estabilidad", 0.4),
        ("estable", 0.4),
        ("beneficio", 0.4),
        ("ayuda", 0.4),
        ("apoyo", 0.4),
        ("inversión", 0.4),
        ("empleo", 0.4),
        ("aprobación", 0.4),
        ("gratuito", 0.4),
        ("histórico", 0.4),
    ]
    .into_iter()
    .collect()
});

/// Polarity band a headline falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolarityClass {
    Positive,
    Neutral,
    Negative,
}

/// Classify a polarity score into its band.
pub fn classify(score: f64) -> PolarityClass {
    if score > POSITIVE_THRESHOLD {
        PolarityClass::Positive
    } else if score < NEGATIVE_THRESHOLD {
        PolarityClass::Negative
    } else {
        PolarityClass::Neutral
    }
}

/// Score a single headline.
///
/// The polarity is the mean weight of all lexicon matches, sign-flipped for
/// matches preceded by a negator within [`NEGATION_WINDOW`] tokens. A title
/// with no matches scores 0.0.
pub fn score_headline(title: &str) -> f64 {
    let tokens = tokenize(title);
    let mut matched = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if let Some(&weight) = LEXICON.get(token.as_str()) {
            let window_start = i.saturating_sub(NEGATION_WINDOW);
            let negated = tokens[window_start..i]
                .iter()
                .any(|t| NEGATORS.contains(&t.as_str()));
            matched.push(if negated { -weight } else { weight });
        }
    }

    if matched.is_empty() {
        0.0
    } else {
        matched.iter().sum::<f64>() / matched.len() as f64
    }
}

/// Score every title in order.
pub fn score_all<'a, I>(titles: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    titles.into_iter().map(score_headline).collect()
}

/// Mean polarity across a run; 0.0 for an empty table.
pub fn mean_polarity(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

/// Count (positive, negative, neutral) headlines.
pub fn class_counts(scores: &[f64]) -> (usize, usize, usize) {
    let mut positive = 0;
    let mut negative = 0;
    let mut neutral = 0;
    for &score in scores {
        match classify(score) {
            PolarityClass::Positive => positive += 1,
            PolarityClass::Negative => negative += 1,
            PolarityClass::Neutral => neutral += 1,
        }
    }
    (positive, negative, neutral)
}
