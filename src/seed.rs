/// Verbs studied when no `--verbs` list is given
pub const RAW_VERB_LIST: &str = "schlafen fahren laden waschen halten fallen denken kennen nennen \
stehen gehen essen geben lesen sehen helfen nehmen sprechen sterben werden treffen empfehlen \
bleiben schreiben treiben steigen heissen vergleichen sein kommen bitten sitzen beiginnen \
schwimmen finden singen trinken wissen genuessen verlieren ziehen tun rufen";

/// Known misspellings in verb lists and their corrections
pub const TYPO_CORRECTIONS: [(&str, &str); 3] = [
    ("beiginnen", "beginnen"),
    ("genuessen", "genießen"),
    ("heissen", "heißen"),
];

/// Split a whitespace separated verb list and fix known typos word by word
pub fn parse_verb_list(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(correct_typo).collect()
}

/// The default verb list with corrections applied
pub fn seed_infinitives() -> Vec<String> {
    parse_verb_list(RAW_VERB_LIST)
}

fn correct_typo(word: &str) -> String {
    TYPO_CORRECTIONS
        .iter()
        .find(|(typo, _)| *typo == word)
        .map(|(_, fixed)| fixed.to_string())
        .unwrap_or_else(|| word.to_string())
}
