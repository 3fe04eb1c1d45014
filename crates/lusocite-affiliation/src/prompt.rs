//! Interactive terminal resolver.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use lusocite_common::resolver::{parse_answer, Subject, UnknownResolver};
use lusocite_common::{LusociteError, Result};

/// Asks the operator on stderr, looping until a yes/no token is given.
pub struct TerminalResolver {
    term: Term,
    theme: ColorfulTheme,
}

impl TerminalResolver {
    pub fn new() -> Self {
        Self { term: Term::stderr(), theme: ColorfulTheme::default() }
    }
}

impl Default for TerminalResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn question(subject: Subject) -> &'static str {
    match subject {
        Subject::Affiliation => "A afiliação / The affiliation",
        Subject::Biography   => "A biografia / The biography",
    }
}

impl UnknownResolver for TerminalResolver {
    fn resolve(&mut self, subject: Subject, text: &str) -> Result<Option<bool>> {
        let prompt_err = |e: std::io::Error| LusociteError::Prompt(e.to_string());
        self.term.write_line("").map_err(prompt_err)?;
        self.term.write_line(question(subject)).map_err(prompt_err)?;
        self.term
            .write_line(&format!("  {}", style(format!("\"{text}\"")).cyan().bold()))
            .map_err(prompt_err)?;

        let answer: String = Input::with_theme(&self.theme)
            .with_prompt("é relacionada à língua portuguesa? / related to the Portuguese-speaking world? (s/n)")
            .validate_with(|input: &String| -> std::result::Result<(), &str> {
                parse_answer(input).map(|_| ()).ok_or("s, sim, y, yes / n, nao, não, no")
            })
            .interact_text_on(&self.term)
            .map_err(|e| LusociteError::Prompt(e.to_string()))?;

        Ok(parse_answer(&answer))
    }
}
