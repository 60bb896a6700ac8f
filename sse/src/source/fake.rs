//! Small fake-data generator for demo records.
//!
//! Output only needs to look plausible; every function is deterministic for
//! a given RNG state so seeded generators reproduce the same records.

use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Alan", "Barbara", "Claude", "Donald", "Edsger", "Frances", "Grace", "Hedy", "John",
    "Katherine", "Leslie", "Margaret", "Niklaus", "Radia", "Sophie", "Tim", "Whitfield",
];

const LAST_NAMES: &[&str] = &[
    "Allen", "Backus", "Cerf", "Dijkstra", "Engelbart", "Hamilton", "Hopper", "Johnson", "Knuth",
    "Lamport", "Liskov", "Lovelace", "Perlman", "Ritchie", "Shannon", "Thompson", "Turing", "Wirth",
];

const STREET_NAMES: &[&str] = &[
    "Maple", "Oak", "Cedar", "Elm", "Harbor", "Hillside", "Lakeview", "Meadow", "Mill", "Park",
    "Ridge", "River", "Sunset", "Willow",
];

const STREET_SUFFIXES: &[&str] = &["Street", "Avenue", "Road", "Lane", "Drive", "Court", "Way"];

const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Fairview", "Greenville", "Kingston", "Madison", "Oakdale",
    "Salem", "Franklin", "Clinton",
];

const STATES: &[&str] = &["CA", "CO", "IL", "MA", "MN", "NY", "OR", "TX", "VT", "WA"];

const ADJECTIVES: &[&str] = &[
    "Adaptive", "Balanced", "Centralized", "Cross-platform", "Distributed", "Ergonomic",
    "Fault-tolerant", "Horizontal", "Integrated", "Managed", "Proactive", "Robust", "Streamlined",
    "Synergized", "Versatile",
];

const DESCRIPTORS: &[&str] = &[
    "asynchronous", "bottom-line", "client-driven", "dedicated", "dynamic", "incremental",
    "modular", "real-time", "scalable", "stateless", "transitional", "zero-defect",
];

const NOUNS: &[&str] = &[
    "ability", "access", "architecture", "capacity", "framework", "hierarchy", "interface",
    "middleware", "paradigm", "pipeline", "protocol", "throughput", "toolset", "workforce",
];

const WORDS: &[&str] = &[
    "able", "across", "after", "against", "almost", "among", "answer", "around", "become",
    "before", "between", "build", "carry", "change", "close", "common", "consider", "course",
    "during", "early", "either", "enough", "even", "every", "follow", "found", "group", "house",
    "however", "idea", "important", "include", "large", "later", "leave", "little", "local",
    "message", "might", "moment", "never", "number", "often", "order", "other", "people", "place",
    "point", "public", "rather", "report", "result", "second", "several", "should", "simple",
    "small", "social", "stream", "system", "think", "through", "today", "update", "value", "whole",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

pub fn name<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES))
}

pub fn address<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{} {} {}\n{}, {} {:05}",
        rng.gen_range(1..10_000),
        pick(rng, STREET_NAMES),
        pick(rng, STREET_SUFFIXES),
        pick(rng, CITIES),
        pick(rng, STATES),
        rng.gen_range(1_000..100_000)
    )
}

pub fn catch_phrase<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{} {} {}",
        pick(rng, ADJECTIVES),
        pick(rng, DESCRIPTORS),
        pick(rng, NOUNS)
    )
}

/// A few sentences of filler text.
pub fn text<R: Rng + ?Sized>(rng: &mut R) -> String {
    let sentences = rng.gen_range(2..=4);
    (0..sentences)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

fn sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let words = rng.gen_range(5..=12);
    let mut sentence = (0..words)
        .map(|_| pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(first) = sentence.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    sentence.push('.');
    sentence
}
