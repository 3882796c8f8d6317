//! Rendering matches for the terminal.

mod color;
mod template;

use std::ops::Range;
use std::path::{self, Path, PathBuf};

use gogrep_syntax::{MatchData, line_at_offset, line_bounds};

use crate::errors::CliError;
pub use color::Color;
pub(crate) use template::{Field, Template};

/// Everything needed to print one match after its file is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FoundMatch {
    path: PathBuf,
    line: u32,
    line_text: String,
    matched: Range<usize>,
    captures: Vec<(String, String)>,
}

impl FoundMatch {
    /// Copies what the template needs out of a match in `path`, keeping the
    /// captures listed in `capture_names`.
    pub(crate) fn new(path: &Path, data: &MatchData<'_, '_>, capture_names: &[String]) -> Self {
        let source = data.source();
        let range = data.byte_range();
        let lines = line_bounds(source, range.clone());
        let captures = capture_names
            .iter()
            .filter_map(|name| {
                data.capture(name)
                    .map(|capture| (name.clone(), capture.text().to_owned()))
            })
            .collect();
        Self {
            path: path.to_path_buf(),
            line: line_at_offset(source, range.start),
            line_text: source.get(lines.clone()).unwrap_or_default().to_owned(),
            matched: range.start.saturating_sub(lines.start)..range.end.saturating_sub(lines.start),
            captures,
        }
    }

    fn match_text(&self) -> &str {
        self.line_text.get(self.matched.clone()).unwrap_or_default()
    }

    fn capture(&self, name: &str) -> &str {
        self.captures
            .iter()
            .find(|(captured, _)| captured == name)
            .map_or("", |(_, text)| text.as_str())
    }
}

/// Colours for the fields that can be coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    pub(crate) filename: Color,
    pub(crate) line: Color,
    pub(crate) matched: Color,
}

/// Turns matches into output lines.
#[derive(Debug, Clone)]
pub(crate) struct Renderer {
    pub(crate) template: Template,
    pub(crate) palette: Option<Palette>,
    pub(crate) multiline: bool,
    pub(crate) absolute: bool,
}

impl Renderer {
    /// Renders one match.
    pub(crate) fn render(&self, found: &FoundMatch) -> Result<String, CliError> {
        let filename = self.filename(&found.path)?;
        let matched = found.match_text();
        let prefix = found
            .line_text
            .get(..found.matched.start)
            .unwrap_or_default();
        let suffix = found.line_text.get(found.matched.end..).unwrap_or_default();
        let paint = |color: fn(&Palette) -> Color, text: &str| {
            self.palette
                .as_ref()
                .map_or_else(|| text.to_owned(), |palette| color(palette).paint(text))
        };
        let rendered = self.template.render(|field| match field {
            Field::Filename => paint(|p| p.filename, &filename),
            Field::Line => paint(|p| p.line, &found.line.to_string()),
            Field::Match => self.escape(paint(|p| p.matched, matched)),
            Field::MatchLine => {
                self.escape(format!("{prefix}{}{suffix}", paint(|p| p.matched, matched)))
            }
            Field::Capture(name) => self.escape(found.capture(name).to_owned()),
        });
        Ok(rendered)
    }

    fn filename(&self, path: &Path) -> Result<String, CliError> {
        if !self.absolute {
            return Ok(path.display().to_string());
        }
        path::absolute(path)
            .map(|absolute| absolute.display().to_string())
            .map_err(|source| CliError::AbsolutePath {
                path: path.to_path_buf(),
                source,
            })
    }

    fn escape(&self, text: String) -> String {
        if self.multiline {
            text
        } else {
            text.replace('\n', "\\n")
        }
    }
}
