use serde::Serialize;

/// Localized text snippets used for spoken alerts and console status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Phrases {
    pub language_code: &'static str,
    pub begins_in: &'static str,
    pub minutes: &'static str,
    pub one_minute: &'static str,
    pub program_starting: &'static str,
    pub no_events: &'static str,
}

const GERMAN: Phrases = Phrases {
    language_code: "de",
    begins_in: "beginnt in",
    minutes: "Minuten",
    one_minute: "einer Minute",
    program_starting: "Das Programm startet",
    no_events: "Keine anstehenden Termine gefunden.",
};

const ENGLISH: Phrases = Phrases {
    language_code: "en",
    begins_in: "begins in",
    minutes: "minutes",
    one_minute: "one minute",
    program_starting: "The program is starting",
    no_events: "No upcoming events found.",
};

const FRENCH: Phrases = Phrases {
    language_code: "fr",
    begins_in: "commence dans",
    minutes: "minutes",
    one_minute: "une minute",
    program_starting: "Le programme démarre",
    no_events: "Aucun événement à venir.",
};

const SPANISH: Phrases = Phrases {
    language_code: "es",
    begins_in: "comienza en",
    minutes: "minutos",
    one_minute: "un minuto",
    program_starting: "El programa se está iniciando",
    no_events: "No hay eventos próximos.",
};

const ALL: &[Phrases] = &[GERMAN, ENGLISH, FRENCH, SPANISH];

impl Phrases {
    /// Look up the phrase table for a language code such as `de` or `en-US`.
    ///
    /// Only the primary subtag is considered; matching is case-insensitive.
    pub fn for_language(code: &str) -> Option<Phrases> {
        let primary = code.split(['-', '_']).next()?.trim();
        ALL.iter()
            .find(|p| p.language_code.eq_ignore_ascii_case(primary))
            .cloned()
    }

    pub fn supported_languages() -> impl Iterator<Item = &'static str> {
        ALL.iter().map(|p| p.language_code)
    }
}

impl Default for Phrases {
    fn default() -> Self {
        GERMAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_primary_subtag() {
        assert_eq!(Phrases::for_language("en").unwrap().begins_in, "begins in");
        assert_eq!(Phrases::for_language("en-GB").unwrap().language_code, "en");
        assert_eq!(Phrases::for_language("DE").unwrap().one_minute, "einer Minute");
    }

    #[test]
    fn test_unknown_language() {
        assert!(Phrases::for_language("xx").is_none());
        assert!(Phrases::for_language("").is_none());
    }

    #[test]
    fn test_default_is_german() {
        assert_eq!(Phrases::default().language_code, "de");
    }
}
