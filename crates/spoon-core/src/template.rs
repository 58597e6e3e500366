//! Command templates.
//!
//! Each template setting has a typed accessor with a fixed set of
//! placeholders, so a template can only ask for values the caller is able to
//! provide:
//!
//! | setting      | placeholders                                |
//! |--------------|---------------------------------------------|
//! | `run_all`    | `relative_path`                             |
//! | `run_single` | `relative_path`, `test_name`, `line_number` |
//!
//! Placeholders are written `{name}`; `{{` and `}}` produce literal braces.
//!
//! [`CommandTemplates`] renders shell lines, so every substituted value is
//! shell-quoted. A label such as `costs $HOME "x"` becomes one word,
//! `'costs $HOME "x"'`, and nothing in it is expanded. Templates must
//! therefore leave placeholders unquoted: write `--filter={test_name}`,
//! not `--filter="{test_name}"`.

use std::borrow::Cow;
use std::str::FromStr;

use thiserror::Error;

use crate::config::CommandsConfig;

/// Template errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unclosed '{{' at byte {at} in template: {template}")]
    Unclosed { template: String, at: usize },

    #[error("unmatched '}}' at byte {at} in template: {template}")]
    Unmatched { template: String, at: usize },

    #[error("empty placeholder at byte {at} in template: {template}")]
    EmptyPlaceholder { template: String, at: usize },

    #[error("setting '{setting}' does not provide placeholder '{{{name}}}'")]
    UnknownPlaceholder { setting: &'static str, name: String },

    #[error("unknown template setting: {0}")]
    UnknownSetting(String),
}

/// Template settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    RunAll,
    RunSingle,
}

impl SettingKey {
    pub const ALL: [SettingKey; 2] = [SettingKey::RunAll, SettingKey::RunSingle];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RunAll => "run_all",
            Self::RunSingle => "run_single",
        }
    }

    /// Placeholders the setting's accessor supplies.
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            Self::RunAll => &["relative_path"],
            Self::RunSingle => &["relative_path", "test_name", "line_number"],
        }
    }
}

impl FromStr for SettingKey {
    type Err = TemplateError;

    /// Accepts the short names and the Teaspoon plugin's long names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run_all" | "run_teaspoon_unit_command" => Ok(Self::RunAll),
            "run_single" | "run_single_teaspoon_unit_command" => Ok(Self::RunSingle),
            other => Err(TemplateError::UnknownSetting(other.to_string())),
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    Literal(String),
    Placeholder(&'a str),
}

/// A parsed `{name}` template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> Template<'a> {
    pub fn parse(template: &'a str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let rest = &template[i + 1..];
                    let close = rest.find('}').ok_or_else(|| TemplateError::Unclosed {
                        template: template.to_string(),
                        at: i,
                    })?;
                    let name = rest[..close].trim();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyPlaceholder {
                            template: template.to_string(),
                            at: i,
                        });
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                    let end = i + 1 + close;
                    while chars.peek().is_some_and(|&(j, _)| j <= end) {
                        chars.next();
                    }
                }
                '}' => {
                    return Err(TemplateError::Unmatched {
                        template: template.to_string(),
                        at: i,
                    });
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(*name),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute `values`. A placeholder without a value is an error.
    pub fn render(&self, setting: SettingKey, values: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| TemplateError::UnknownPlaceholder {
                            setting: setting.as_str(),
                            name: name.to_string(),
                        })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Typed accessors over the `[commands]` templates.
#[derive(Debug, Clone, Copy)]
pub struct CommandTemplates<'a> {
    commands: &'a CommandsConfig,
}

impl<'a> CommandTemplates<'a> {
    pub fn new(commands: &'a CommandsConfig) -> Self {
        Self { commands }
    }

    /// Raw template text of a setting.
    pub fn template(&self, key: SettingKey) -> &'a str {
        match key {
            SettingKey::RunAll => &self.commands.run_all,
            SettingKey::RunSingle => &self.commands.run_single,
        }
    }

    /// Command running every spec in `relative_path`.
    pub fn run_all(&self, relative_path: &str) -> Result<String, TemplateError> {
        let relative_path = quote(relative_path);
        Template::parse(self.template(SettingKey::RunAll))?
            .render(SettingKey::RunAll, &[("relative_path", &relative_path)])
    }

    /// Command running the spec `test_name` in `relative_path`.
    pub fn run_single(
        &self,
        relative_path: &str,
        test_name: &str,
        line_number: usize,
    ) -> Result<String, TemplateError> {
        let relative_path = quote(relative_path);
        let test_name = quote(test_name);
        let line_number = line_number.to_string();
        Template::parse(self.template(SettingKey::RunSingle))?.render(
            SettingKey::RunSingle,
            &[
                ("relative_path", &relative_path),
                ("test_name", &test_name),
                ("line_number", &line_number),
            ],
        )
    }

    /// Check that every template parses and asks only for the
    /// placeholders its setting provides.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for key in SettingKey::ALL {
            let template = Template::parse(self.template(key))?;
            let unknown = template
                .placeholders()
                .find(|name| !key.placeholders().contains(name));
            if let Some(name) = unknown {
                return Err(TemplateError::UnknownPlaceholder {
                    setting: key.as_str(),
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Quote `value` as a single POSIX shell word. Plain words stay as they are.
fn quote(value: &str) -> Cow<'_, str> {
    shell_words::quote(value)
}
