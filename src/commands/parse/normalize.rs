use anyhow::{Context, Result};
use regex::Regex;

use crate::cli::Family;

pub const BREAK_SENTINEL: &str = "----------";

const LINE_BREAK: &str = "<br />";

enum Rewrite {
    Literal { from: &'static str, to: &'static str },
    Pattern { regex: Regex, to: &'static str },
}

impl Rewrite {
    fn pattern(pattern: &str, to: &'static str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .with_context(|| format!("failed to compile normalization regex: {pattern}"))?;
        Ok(Self::Pattern { regex, to })
    }

    fn apply(&self, html: String) -> String {
        match self {
            Self::Literal { from, to } => html.replace(from, to),
            Self::Pattern { regex, to } => regex.replace_all(&html, *to).into_owned(),
        }
    }
}

pub struct Normalizer {
    family: Family,
    rewrites: Vec<Rewrite>,
}

impl Normalizer {
    pub fn new(family: Family) -> Result<Self> {
        let literal = |from, to| Rewrite::Literal { from, to };
        let rewrites = match family {
            Family::Chapter => vec![
                literal("<h3 ", "<p "),
                literal("</h3>", "</p>"),
                literal("<h1 ", "<p "),
                literal("</h1>", "</p>"),
                literal(
                    "(2005e)).</span></p>",
                    "(2005e)).</span></p>\n<p><br></p>\n<p>References</p>",
                ),
                literal("<br />", BREAK_SENTINEL),
                literal("<br>", BREAK_SENTINEL),
                Rewrite::pattern(r"line-height:\s*100%", "line-height:150%")?,
                Rewrite::pattern(r"margin-right:\s*1\.74in;?", "")?,
            ],
            Family::Survey => vec![
                literal("<o:p>", ""),
                literal("</o:p>", ""),
                literal("color:windowtext;", ""),
                Rewrite::pattern(r"line-height:\s*200%", "line-height:150%")?,
                Rewrite::pattern(r"font-size:\s*12\.0pt;?", "")?,
            ],
        };
        Ok(Self { family, rewrites })
    }

    pub fn normalize(&self, html: &str) -> String {
        self.rewrites
            .iter()
            .fold(html.to_string(), |acc, rewrite| rewrite.apply(acc))
    }

    pub fn postprocess(&self, html: &str) -> String {
        match self.family {
            Family::Chapter => html.replace(BREAK_SENTINEL, LINE_BREAK),
            Family::Survey => html.to_string(),
        }
    }
}
