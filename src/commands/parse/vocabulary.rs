pub const SURVEY_SECTIONS: &[&str] = &[
    "Introduction",
    "Sociohistorical background",
    "Sociolinguistic situation",
    "Phonology",
    "Morphology",
    "Noun phrase",
    "Noun phrases",
    "Verb phrase",
    "Verb phrases",
    "Simple sentences",
    "Complex sentences",
    "Other features",
    "Lexicon",
    "Glossed text",
    "Acknowledgments",
    "Acknowledgements",
    "Abbreviations",
    "Sources of examples",
    "References",
];

pub const REFERENCE_CATEGORIES: &[&str] = &[
    "Primary sources",
    "Secondary sources",
    "Other sources",
    "Sources",
    "Published sources",
    "Unpublished sources",
    "Archival sources",
    "Further reading",
    "Other references",
];

pub const CONSORTIUM_BYLINE: &str = "and the APiCS Consortium";
