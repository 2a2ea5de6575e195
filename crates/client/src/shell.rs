//! Line-oriented terminal front end for the checker and the review flow.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use skinfit_ai::{CompatibilityVerdict, ReviewKeyPoints};
use skinfit_core::{COMPATIBILITY_SKIN_TYPES, REVIEW_SKIN_TYPES, Routine};

use crate::analysis::AnalysisState;
use crate::api::ReviewService;
use crate::checker::CompatibilityChecker;
use crate::error::WizardError;
use crate::review::{MarkdownRenderer, ReviewForm, ReviewPage, ReviewView};
use crate::wizard::{Placement, WizardStep};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A bare 1-based number: skin type or search candidate.
    Choose(usize),
    Routine(Routine),
    Search(String),
    Manual(String),
    Remove(Option<Routine>, usize),
    Next,
    Back,
    Reset,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// `None` for blank lines.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "search" | "s" if !rest.is_empty() => Command::Search(rest.to_string()),
            "manual" | "m" if !rest.is_empty() => Command::Manual(rest.to_string()),
            "remove" | "rm" => parse_remove(rest).unwrap_or_else(|| Command::Unknown(line.to_string())),
            "next" | "n" if rest.is_empty() => Command::Next,
            "back" | "b" if rest.is_empty() => Command::Back,
            "reset" if rest.is_empty() => Command::Reset,
            "help" | "?" if rest.is_empty() => Command::Help,
            "quit" | "exit" | "q" if rest.is_empty() => Command::Quit,
            word if rest.is_empty() => match (word.parse::<usize>(), word.parse::<Routine>()) {
                (Ok(n), _) if n > 0 => Command::Choose(n),
                (_, Ok(routine)) => Command::Routine(routine),
                _ => Command::Unknown(line.to_string()),
            },
            _ => Command::Unknown(line.to_string()),
        };
        Some(command)
    }
}

fn parse_remove(rest: &str) -> Option<Command> {
    let mut words = rest.split_whitespace();
    let first = words.next()?;
    let (routine, index) = match first.parse::<Routine>() {
        Ok(routine) => (Some(routine), words.next()?),
        Err(_) => (None, first),
    };
    if words.next().is_some() {
        return None;
    }
    match index.parse::<usize>() {
        Ok(n) if n > 0 => Some(Command::Remove(routine, n)),
        _ => None,
    }
}

/// Resolve a numbered choice against `options`, or take the text as typed.
fn pick_option(input: &str, options: &[&str]) -> String {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].to_string(),
        _ => input.to_string(),
    }
}

/// Plain-text rendering for a terminal: drops emphasis and heading markers and
/// any control characters other than newlines and tabs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer;

impl MarkdownRenderer for TerminalRenderer {
    fn render(&self, markdown: &str) -> String {
        markdown
            .lines()
            .map(|line| {
                let line = line.trim_start_matches('#').trim_start();
                line.replace("**", "")
                    .chars()
                    .filter(|c| !c.is_control() || *c == '\t')
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

const WIZARD_HELP: &str = "\
commands:
  <n>                 choose skin type / pick search result n
  am | pm             choose the routine for the new product
  search <name>       look a product up
  manual <a, b, c>    enter ingredients by hand
  remove [am|pm] <n>  remove product n
  next | back | reset | help | quit";

pub struct WizardShell<W> {
    checker: CompatibilityChecker,
    out: W,
}

impl<W: Write> WizardShell<W> {
    pub fn new(checker: CompatibilityChecker, out: W) -> Self {
        Self { checker, out }
    }

    pub fn checker(&self) -> &CompatibilityChecker {
        &self.checker
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run<R>(&mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.show_step()?;

        while let Some(line) = lines.next_line().await.context("failed to read input")? {
            let Some(command) = Command::parse(&line) else {
                continue;
            };
            if command == Command::Quit {
                break;
            }
            self.execute(command).await?;
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        let before = self.checker.step();
        let outcome = match command {
            Command::Choose(n) => self.choose(n),
            Command::Routine(routine) => self.routine(routine),
            Command::Search(query) => self.search(&query).await,
            Command::Manual(text) => self.manual(&text),
            Command::Remove(routine, n) => self.remove(routine, n),
            Command::Next => self.checker.advance().map(drop).map_err(Into::into),
            Command::Back => {
                self.checker.back();
                Ok(())
            }
            Command::Reset => {
                self.checker.reset();
                Ok(())
            }
            Command::Help => writeln!(self.out, "{WIZARD_HELP}").map_err(Into::into),
            Command::Quit => Ok(()),
            Command::Unknown(line) => {
                writeln!(self.out, "unknown command `{line}`; type `help`").map_err(Into::into)
            }
        };

        if let Err(e) = outcome {
            match e.downcast_ref::<WizardError>() {
                Some(wizard) => writeln!(self.out, "! {wizard}")?,
                None => return Err(e),
            }
        }

        if self.checker.step() != before {
            self.show_step()?;
        }
        if self.checker.step() == WizardStep::Results && self.checker.drive_analysis().await {
            self.show_results()?;
        }
        Ok(())
    }

    fn choose(&mut self, n: usize) -> anyhow::Result<()> {
        match self.checker.step() {
            WizardStep::SkinType => {
                let Some(skin_type) = n.checked_sub(1).and_then(|i| COMPATIBILITY_SKIN_TYPES.get(i))
                else {
                    writeln!(self.out, "! no skin type {n}")?;
                    return Ok(());
                };
                self.checker.choose_skin_type(skin_type)?;
                self.checker.advance()?;
            }
            _ => {
                let placement = self.checker.select_candidate(n - 1)?;
                self.report_placement(placement)?;
            }
        }
        Ok(())
    }

    fn routine(&mut self, routine: Routine) -> anyhow::Result<()> {
        self.checker.choose_routine(routine)?;
        self.checker.advance()?;
        Ok(())
    }

    async fn search(&mut self, query: &str) -> anyhow::Result<()> {
        writeln!(self.out, "searching for \"{}\"...", query.trim())?;
        if let Some(ticket) = self.checker.search_local(query).await? {
            if let Some(status) = self.checker.search().status() {
                writeln!(self.out, "{status}")?;
            }
            self.checker.search_online(&ticket).await;
        }
        let search = self.checker.search();

        if let Some(error) = search.error().filter(|e| e.is_user_visible()) {
            writeln!(self.out, "{error}")?;
            if error.recommends_manual_entry() {
                writeln!(self.out, "use `manual <ingredients>` to add it yourself")?;
            }
            return Ok(());
        }
        if !search.visible() {
            writeln!(self.out, "type at least two characters to search")?;
            return Ok(());
        }
        for (i, candidate) in search.candidates().iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, candidate.label())?;
        }
        Ok(())
    }

    fn manual(&mut self, text: &str) -> anyhow::Result<()> {
        let placement = self.checker.submit_manual(text)?;
        self.report_placement(placement)
    }

    fn remove(&mut self, routine: Option<Routine>, n: usize) -> anyhow::Result<()> {
        let step = self.checker.step();
        let routine = routine
            .or_else(|| step.collecting_routine())
            .ok_or(WizardError::WrongStep {
                action: "remove product",
                step,
            })?;

        match self.checker.remove_product(routine, n - 1) {
            Some(product) => writeln!(self.out, "removed {}", product.display_name())?,
            None => writeln!(self.out, "! no {routine} product {n}")?,
        }
        Ok(())
    }

    fn report_placement(&mut self, placement: Placement) -> anyhow::Result<()> {
        if let Placement::Routine(routine) = placement {
            let products = self.checker.wizard().routine(routine);
            if let Some(product) = products.list().last() {
                writeln!(self.out, "added {} to {routine}", product.display_name())?;
            }
            self.show_routine(routine)?;
        }
        Ok(())
    }

    fn show_routine(&mut self, routine: Routine) -> anyhow::Result<()> {
        let products = self.checker.wizard().routine(routine);
        if products.is_empty() {
            writeln!(self.out, "  ({routine} routine is empty)")?;
        }
        for (i, product) in products.list().iter().enumerate() {
            writeln!(self.out, "  {}. {}", i + 1, product.display_name())?;
        }
        Ok(())
    }

    fn show_step(&mut self) -> anyhow::Result<()> {
        let step = self.checker.step();
        writeln!(self.out)?;
        match step {
            WizardStep::SkinType => {
                writeln!(self.out, "What's your skin type?")?;
                for (i, name) in COMPATIBILITY_SKIN_TYPES.iter().enumerate() {
                    writeln!(self.out, "  {}. {name}", i + 1)?;
                }
            }
            WizardStep::AddAmProducts | WizardStep::AddPmProducts => {
                let routine = step.collecting_routine().unwrap_or(Routine::Am);
                writeln!(self.out, "Add your {routine} products (`next` when done)")?;
                self.show_routine(routine)?;
            }
            WizardStep::SelectNewProductRoutine => {
                writeln!(self.out, "Which routine is the new product for? (am | pm)")?;
            }
            WizardStep::SelectNewProduct => {
                writeln!(self.out, "Search for the product you want to check")?;
            }
            WizardStep::Results => {
                writeln!(self.out, "Analyzing compatibility...")?;
            }
        }
        Ok(())
    }

    fn show_results(&mut self) -> anyhow::Result<()> {
        let trigger = self.checker.trigger();
        let score = trigger.display_score();
        writeln!(self.out, "Compatibility score: {score}/5")?;
        writeln!(self.out, "{}", CompatibilityVerdict::from_score(score).message())?;

        match trigger.state() {
            AnalysisState::Ready(result) => {
                if !result.explanation.is_empty() {
                    writeln!(self.out, "\n{}", result.explanation)?;
                }
                if !result.recommendations.is_empty() {
                    writeln!(self.out, "\nRecommendations:")?;
                    for recommendation in &result.recommendations {
                        writeln!(self.out, "  - {recommendation}")?;
                    }
                }
            }
            AnalysisState::Failed => writeln!(self.out, "(analysis unavailable)")?,
            AnalysisState::Idle | AnalysisState::Pending => {}
        }
        writeln!(self.out, "\n`reset` to start over, `back` to pick another product")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewPrompt {
    ProductName,
    SkinType,
    Page,
}

pub struct ReviewShell<W> {
    service: Arc<dyn ReviewService>,
    out: W,
}

impl<W: Write> ReviewShell<W> {
    pub fn new(service: Arc<dyn ReviewService>, out: W) -> Self {
        Self { service, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub async fn run<R>(&mut self, input: R) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut form = ReviewForm::default();
        let mut page: Option<ReviewPage> = None;
        let mut prompt = ReviewPrompt::ProductName;
        writeln!(self.out, "Product name:")?;

        while let Some(line) = lines.next_line().await.context("failed to read input")? {
            match prompt {
                ReviewPrompt::ProductName => {
                    form.product_name = line.trim().to_string();
                    self.ask_skin_type()?;
                    prompt = ReviewPrompt::SkinType;
                }
                ReviewPrompt::SkinType => {
                    form.skin_type = pick_option(&line, &REVIEW_SKIN_TYPES);
                    writeln!(self.out, "generating review...")?;
                    let outcome = form.generate(self.service.as_ref()).await;
                    match outcome {
                        Ok(review) => {
                            let loaded = ReviewPage::load(self.service.as_ref(), review).await;
                            self.show_page(&loaded)?;
                            page = Some(loaded);
                            prompt = ReviewPrompt::Page;
                        }
                        Err(e) => {
                            writeln!(self.out, "! {}", e.user_message())?;
                            form = ReviewForm::default();
                            writeln!(self.out, "Product name:")?;
                            prompt = ReviewPrompt::ProductName;
                        }
                    }
                }
                ReviewPrompt::Page => match line.trim().to_ascii_lowercase().as_str() {
                    "quit" | "exit" | "q" => break,
                    "new" => {
                        form = ReviewForm::default();
                        page = None;
                        writeln!(self.out, "Product name:")?;
                        prompt = ReviewPrompt::ProductName;
                    }
                    "more" | "less" => {
                        if let Some(current) = page.as_mut() {
                            if current.is_expanded() {
                                current.collapse();
                            } else {
                                current.expand();
                            }
                            self.show_page(current)?;
                        }
                    }
                    "" => {}
                    _ => writeln!(self.out, "commands: more | less | new | quit")?,
                },
            }
        }
        Ok(())
    }

    fn ask_skin_type(&mut self) -> anyhow::Result<()> {
        writeln!(self.out, "Skin type:")?;
        for (i, name) in REVIEW_SKIN_TYPES.iter().enumerate() {
            writeln!(self.out, "  {}. {name}", i + 1)?;
        }
        Ok(())
    }

    fn show_page(&mut self, page: &ReviewPage) -> anyhow::Result<()> {
        let review = page.review();
        writeln!(self.out, "\n{} ({} skin)", review.product_name, review.skin_type)?;
        writeln!(self.out, "image: {}", page.image_url())?;

        match page.view() {
            ReviewView::Collapsed(points) => {
                self.show_key_points(points)?;
                writeln!(self.out, "\n`more` for the full review")?;
            }
            ReviewView::Expanded(_) => {
                writeln!(self.out, "\n{}", page.render_full(&TerminalRenderer))?;
                writeln!(self.out, "\n`less` to collapse")?;
            }
        }
        Ok(())
    }

    fn show_key_points(&mut self, points: &ReviewKeyPoints) -> anyhow::Result<()> {
        if !points.decision.is_empty() {
            writeln!(self.out, "Decision: {}", points.decision)?;
        }
        for (label, items) in [("Pros", &points.pros), ("Cons", &points.cons)] {
            if items.is_empty() {
                continue;
            }
            writeln!(self.out, "{label}:")?;
            for item in items {
                writeln!(self.out, "  - {item}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockBackend, raw};
    use skinfit_ai::AnalysisResult;

    fn output(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse("2"), Some(Command::Choose(2)));
        assert_eq!(Command::parse("PM"), Some(Command::Routine(Routine::Pm)));
        assert_eq!(
            Command::parse("search The Ordinary Niacinamide"),
            Some(Command::Search("The Ordinary Niacinamide".into()))
        );
        assert_eq!(
            Command::parse("manual Water, Glycerin"),
            Some(Command::Manual("Water, Glycerin".into()))
        );
        assert_eq!(Command::parse("remove 2"), Some(Command::Remove(None, 2)));
        assert_eq!(Command::parse("rm am 1"), Some(Command::Remove(Some(Routine::Am), 1)));
        assert_eq!(Command::parse("back"), Some(Command::Back));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(Command::parse("0"), Some(Command::Unknown("0".into())));
        assert_eq!(Command::parse("search"), Some(Command::Unknown("search".into())));
        assert_eq!(Command::parse("remove am"), Some(Command::Unknown("remove am".into())));
        assert_eq!(Command::parse("next please"), Some(Command::Unknown("next please".into())));
    }

    #[test]
    fn numbered_options_resolve() {
        assert_eq!(pick_option("6", &REVIEW_SKIN_TYPES), "Acne-Prone");
        assert_eq!(pick_option("9", &REVIEW_SKIN_TYPES), "9");
        assert_eq!(pick_option(" Oily ", &COMPATIBILITY_SKIN_TYPES), "Oily");
    }

    #[test]
    fn terminal_renderer_strips_markup_and_controls() {
        let rendered = TerminalRenderer.render("## Verdict\n**Decision:** Buy\x1b[31m it\u{7}");
        assert_eq!(rendered, "Verdict\nDecision: Buy[31m it");
    }

    #[tokio::test]
    async fn wizard_session_reaches_results() {
        let backend = Arc::new(
            MockBackend::new()
                .with_local(raw("CeraVe", "Foaming Cleanser"))
                .with_local(raw("The Ordinary", "Niacinamide 10% + Zinc 1%"))
                .with_analysis(
                    AnalysisResult::new(4)
                        .with_explanation("Works well together.")
                        .with_recommendations(vec!["Apply before moisturizer".into()]),
                ),
        );
        let mut shell = WizardShell::new(CompatibilityChecker::with_backend(backend.clone()), Vec::new());

        let script = "1\nsearch cerave\n1\nnext\nnext\npm\nsearch the ordinary\n1\nquit\n";
        shell.run(script.as_bytes()).await.unwrap();

        assert_eq!(shell.checker().step(), WizardStep::Results);
        let text = output(shell.into_output());
        assert!(text.contains("1. CeraVe - Foaming Cleanser"));
        assert!(text.contains("Compatibility score: 4/5"));
        assert!(text.contains("Perfect fit!"));
        assert!(text.contains("  - Apply before moisturizer"));
        assert_eq!(backend.analysis_requests().len(), 1);
    }

    #[tokio::test]
    async fn wizard_shell_reports_errors_and_continues() {
        let backend = Arc::new(MockBackend::new());
        let mut shell = WizardShell::new(CompatibilityChecker::with_backend(backend), Vec::new());

        shell
            .run("next\n9\nfoo\n2\nsearch Mystery Mist\nmanual Water, Aloe\nremove 1\n".as_bytes())
            .await
            .unwrap();

        let text = output(shell.into_output());
        assert!(text.contains("! choose a skin type first"));
        assert!(text.contains("! no skin type 9"));
        assert!(text.contains("unknown command `foo`"));
        assert!(text.contains("Product not found online."));
        assert!(text.contains("added Custom - Mystery Mist to AM"));
        assert!(text.contains("removed Custom - Mystery Mist"));
    }

    #[tokio::test]
    async fn online_fallback_is_announced_before_results() {
        let backend = Arc::new(
            MockBackend::new()
                .with_local(raw("CeraVe", "Foaming Cleanser"))
                .with_online(raw("La Roche-Posay", "Cicaplast Baume B5")),
        );
        let mut shell = WizardShell::new(CompatibilityChecker::with_backend(backend), Vec::new());

        shell
            .run("1\nsearch cerave\nsearch Cicaplast\nquit\n".as_bytes())
            .await
            .unwrap();

        let text = output(shell.into_output());
        let status = "Not found in database. Searching online...";
        assert_eq!(text.matches(status).count(), 1);
        let announced = text.find(status).unwrap();
        assert!(text.find("searching for \"Cicaplast\"").unwrap() < announced);
        assert!(announced < text.find("1. La Roche-Posay - Cicaplast Baume B5").unwrap());
    }

    #[tokio::test]
    async fn review_session_shows_key_points_then_full_text() {
        let backend: Arc<dyn ReviewService> = Arc::new(
            MockBackend::new().with_review("**Decision:** Worth it\n**👍 Pros**\n- Soothing\n**👎 Cons**\n- Sticky"),
        );
        let mut shell = ReviewShell::new(backend, Vec::new());

        shell
            .run("Cicaplast Baume B5\n2\nmore\nquit\n".as_bytes())
            .await
            .unwrap();

        let text = output(shell.into_output());
        assert!(text.contains("Cicaplast Baume B5 (Dry skin)"));
        assert!(text.contains("Decision: Worth it"));
        assert!(text.contains("  - Soothing"));
        assert!(text.contains("image: https://images.placeholders.dev/"));
        assert!(text.contains("👍 Pros\n- Soothing"));
    }

    #[tokio::test]
    async fn review_form_errors_restart_the_prompt() {
        let backend: Arc<dyn ReviewService> = Arc::new(MockBackend::new().with_review("text"));
        let mut shell = ReviewShell::new(backend, Vec::new());

        shell.run("\n1\n".as_bytes()).await.unwrap();

        let text = output(shell.into_output());
        assert!(text.contains("! Please fill in all fields"));
        assert_eq!(text.matches("Product name:").count(), 2);
    }
}
