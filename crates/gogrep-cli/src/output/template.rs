//! Output templates such as `{{.Filename}}:{{.Line}}: {{.MatchLine}}`.

use regex::Regex;

use crate::errors::CliError;

const PLACEHOLDER: &str = r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// A value a template can print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Field {
    /// The file the match is in.
    Filename,
    /// One-based line of the match start.
    Line,
    /// The matched text.
    Match,
    /// The whole lines spanned by the match.
    MatchLine,
    /// The text of a named capture.
    Capture(String),
}

impl Field {
    fn named(name: &str) -> Self {
        match name {
            "Filename" => Self::Filename,
            "Line" => Self::Line,
            "Match" => Self::Match,
            "MatchLine" => Self::MatchLine,
            other => Self::Capture(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text(String),
    Field(Field),
}

/// A parsed output template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Template {
    parts: Vec<Part>,
}

impl Template {
    /// Parses `format`, rejecting any `{{ }}` action other than a field.
    pub(crate) fn parse(format: &str) -> Result<Self, CliError> {
        let placeholder =
            Regex::new(PLACEHOLDER).map_err(|err| CliError::Template(err.to_string()))?;
        let mut parts = Vec::new();
        let mut last = 0;
        for found in placeholder.captures_iter(format) {
            let (Some(whole), Some(name)) = (found.get(0), found.get(1)) else {
                continue;
            };
            push_text(&mut parts, format.get(last..whole.start()).unwrap_or_default())?;
            parts.push(Part::Field(Field::named(name.as_str())));
            last = whole.end();
        }
        push_text(&mut parts, format.get(last..).unwrap_or_default())?;
        Ok(Self { parts })
    }

    /// Names of the captures the template prints.
    pub(crate) fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Field(Field::Capture(name)) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Renders the template, asking `value` for each field.
    pub(crate) fn render<F>(&self, mut value: F) -> String
    where
        F: FnMut(&Field) -> String,
    {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Field(field) => out.push_str(&value(field)),
            }
        }
        out
    }
}

fn push_text(parts: &mut Vec<Part>, text: &str) -> Result<(), CliError> {
    if let Some(start) = text.find("{{") {
        let action = text.get(start..).unwrap_or_default();
        return Err(CliError::Template(format!(
            "unsupported template action near `{action}`"
        )));
    }
    if !text.is_empty() {
        parts.push(Part::Text(text.to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn render(format: &str) -> String {
        let template =
            Template::parse(format).unwrap_or_else(|err| panic!("parse {format:?}: {err}"));
        template.render(|field| match field {
            Field::Filename => "a.go".to_owned(),
            Field::Line => "7".to_owned(),
            Field::Match => "f(x)".to_owned(),
            Field::MatchLine => "\tf(x)".to_owned(),
            Field::Capture(name) => format!("<{name}>"),
        })
    }

    #[rstest]
    #[case("{{.Filename}}:{{.Line}}: {{.MatchLine}}", "a.go:7: \tf(x)")]
    #[case("{{ .Match }} at {{.Line}}", "f(x) at 7")]
    #[case("{{.x}}/{{.rest}}", "<x>/<rest>")]
    #[case("plain", "plain")]
    #[case("", "")]
    fn placeholders_are_substituted(#[case] format: &str, #[case] expected: &str) {
        assert_eq!(render(format), expected);
    }

    #[rstest]
    #[case("{{.Filename}")]
    #[case("{{if .x}}y{{end}}")]
    #[case("{{.Line | printf}}")]
    fn other_actions_are_rejected(#[case] format: &str) {
        assert!(matches!(
            Template::parse(format),
            Err(CliError::Template(_))
        ));
    }

    #[test]
    fn capture_names_skip_builtin_fields() {
        let template = Template::parse("{{.Filename}} {{.x}} {{.Match}} {{.y}}")
            .unwrap_or_else(|err| panic!("parse: {err}"));
        assert_eq!(template.capture_names().collect::<Vec<_>>(), ["x", "y"]);
    }
}
