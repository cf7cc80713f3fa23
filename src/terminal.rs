//! Line-oriented front-end: reads questions from stdin and prints the
//! transcript as it grows.

use crate::commands::feedback::{get_feedback, set_feedback};
use crate::commands::ChatSession;
use crate::conversation::{InputError, Snapshot};
use crate::db::KeyValueStore;
use crate::feedback::FeedbackStore;
use crate::hydration::{HydrationGate, Layout, Viewport};
use crate::models::{Message, Rating, Role};
use tokio::io::{AsyncBufReadExt, BufReader};

const RATING_PLACEHOLDER: &str = "   ";

/// Rough pixel width of one terminal cell, used to map columns onto the
/// mobile breakpoint.
const CELL_WIDTH_PX: u32 = 8;

/// Terminal width as reported through `COLUMNS` at startup.
pub struct TerminalViewport {
    pub columns: Option<u32>,
}

impl Viewport for TerminalViewport {
    fn width(&self) -> Option<u32> {
        self.columns.map(|c| c.saturating_mul(CELL_WIDTH_PX))
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Ask(String),
    Stop,
    Retry,
    Reset,
    Rate(Rating),
    Quit,
    Unknown(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/stop" => Input::Stop,
            "/retry" => Input::Retry,
            "/reset" => Input::Reset,
            "/up" => Input::Rate(Rating::Up),
            "/down" => Input::Rate(Rating::Down),
            "/quit" | "/exit" => Input::Quit,
            cmd if cmd.starts_with('/') && !cmd.contains(char::is_whitespace) => {
                Input::Unknown(cmd.to_string())
            }
            _ => Input::Ask(line.to_string()),
        }
    }
}

fn rating_marker(rating: Option<Rating>) -> &'static str {
    match rating {
        Some(Rating::Up) => "[+]",
        Some(Rating::Down) => "[-]",
        None => "[ ]",
    }
}

fn format_message(message: &Message, marker: &str, layout: Layout) -> String {
    match message.role {
        Role::User => format!("You: {}", message.content),
        Role::Assistant => {
            let mut out = format!("Yaseen {}: {}", marker, message.content);
            let labels: Vec<String> = message.citations.iter().map(|c| c.label()).collect();
            let percent = message.confidence_percent();
            match layout {
                Layout::Desktop => {
                    if !labels.is_empty() {
                        out.push_str(&format!("\n  sources: {}", labels.join(", ")));
                    }
                    if let Some(percent) = percent {
                        out.push_str(&format!("\n  confidence: {}%", percent));
                    }
                }
                // one short trailer line on narrow screens
                Layout::Mobile => {
                    let mut trailer = labels;
                    if let Some(percent) = percent {
                        trailer.push(format!("{}%", percent));
                    }
                    if !trailer.is_empty() {
                        out.push_str(&format!("\n  [{}]", trailer.join(" | ")));
                    }
                }
            }
            out
        }
    }
}

struct Renderer<'a, S> {
    gate: HydrationGate,
    layout: Layout,
    feedback: &'a FeedbackStore<S>,
    generation: u64,
    printed: usize,
    was_loading: bool,
}

impl<'a, S: KeyValueStore> Renderer<'a, S> {
    fn new(feedback: &'a FeedbackStore<S>) -> Self {
        Self {
            gate: HydrationGate::new(),
            layout: Layout::Desktop,
            feedback,
            generation: 0,
            printed: 0,
            was_loading: false,
        }
    }

    async fn hydrate(&mut self, viewport: &dyn Viewport) {
        self.gate.ready_on_next_tick().await;
        self.layout = Layout::detect(&self.gate, viewport);
    }

    fn marker(&self, message: &Message) -> String {
        self.gate.select(RATING_PLACEHOLDER.to_string(), || {
            let rating = get_feedback(self.feedback, message).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read feedback");
                None
            });
            rating_marker(rating).to_string()
        })
    }

    /// Lines to print for `snapshot`, given everything printed so far.
    fn frame(&mut self, snapshot: &Snapshot, show_controls: bool) -> Vec<String> {
        let mut lines = Vec::new();
        if snapshot.generation != self.generation {
            lines.push("-- new conversation --".to_string());
            self.generation = snapshot.generation;
            self.printed = 0;
            self.was_loading = false;
        }
        for message in snapshot.messages.iter().skip(self.printed) {
            lines.push(format_message(message, &self.marker(message), self.layout));
        }
        self.printed = snapshot.messages.len();

        if snapshot.loading && !self.was_loading {
            if show_controls {
                lines.push("Yaseen is thinking... (/stop to cancel)".to_string());
            } else {
                lines.push("Yaseen is thinking...".to_string());
            }
        }
        self.was_loading = snapshot.loading;

        if snapshot.errored && show_controls {
            lines.push("An error occurred. Type /retry to try again.".to_string());
        }
        lines
    }

    fn render(&mut self, snapshot: &Snapshot, show_controls: bool) {
        for line in self.frame(snapshot, show_controls) {
            println!("{}", line);
        }
    }
}

pub async fn run<S: KeyValueStore>(
    session: ChatSession,
    feedback: FeedbackStore<S>,
    viewport: &dyn Viewport,
) -> std::io::Result<()> {
    let variant = session.variant();
    let show_controls = variant.exposes_controls();
    let mut renderer = Renderer::new(&feedback);

    println!("Ask Yaseen. Commands: /up /down /reset /quit");
    if show_controls {
        println!("While waiting: /stop. After an error: /retry.");
    }
    renderer.hydrate(viewport).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut updates = session.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Input::parse(&line) {
                    Input::Quit => break,
                    Input::Stop => {
                        if !session.stop() {
                            println!("Nothing to stop.");
                        }
                    }
                    Input::Retry => {
                        if let Err(e) = session.retry() {
                            println!("{}", e);
                        }
                    }
                    Input::Reset => session.reset(),
                    Input::Rate(rating) => {
                        let snapshot = session.snapshot();
                        match snapshot.messages.iter().rev().find(|m| m.is_assistant()) {
                            Some(answer) => match set_feedback(&feedback, answer, rating) {
                                Ok(rating) => println!("Feedback saved: {}", rating.as_str()),
                                Err(e) => println!("{}", e),
                            },
                            None => println!("No answer to rate yet."),
                        }
                    }
                    Input::Unknown(cmd) => println!("Unknown command: {}", cmd),
                    Input::Ask(text) => match session.submit(&text) {
                        Ok(()) => {}
                        Err(InputError::Empty) => {}
                        Err(e @ InputError::Busy) => println!("{}", e),
                        Err(e) if variant.reports_rejections() => println!("{}", e),
                        Err(e) => tracing::debug!(error = %e, "input ignored"),
                    },
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                renderer.render(&snapshot, show_controls);
            }
        }
    }

    session.stop();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{Citation, CitationKind};

    fn answer() -> Message {
        Message {
            role: Role::Assistant,
            content: "Answer".into(),
            citations: vec![
                Citation {
                    kind: CitationKind::Scripture,
                    reference: "2:255".into(),
                },
                Citation {
                    kind: CitationKind::Narration,
                    reference: "Bukhari 1/2".into(),
                },
            ],
            confidence: Some(0.9),
        }
    }

    fn snapshot(generation: u64, messages: Vec<Message>) -> Snapshot {
        Snapshot {
            show_intro: messages.is_empty(),
            messages,
            loading: false,
            errored: false,
            generation,
        }
    }

    #[test]
    fn parses_commands_and_questions() {
        assert_eq!(Input::parse("/stop"), Input::Stop);
        assert_eq!(Input::parse(" /up "), Input::Rate(Rating::Up));
        assert_eq!(Input::parse("/down"), Input::Rate(Rating::Down));
        assert_eq!(Input::parse("/exit"), Input::Quit);
        assert_eq!(Input::parse("/bogus"), Input::Unknown("/bogus".into()));
        assert_eq!(
            Input::parse("/ what is this"),
            Input::Ask("/ what is this".into())
        );
        assert_eq!(Input::parse("What is salah?"), Input::Ask("What is salah?".into()));
    }

    #[test]
    fn assistant_lines_show_sources_and_confidence() {
        assert_eq!(
            format_message(&answer(), "[+]", Layout::Desktop),
            "Yaseen [+]: Answer\n  sources: Q 2:255, Bukhari 1/2\n  confidence: 90%"
        );
        assert_eq!(
            format_message(&Message::user("hi"), "[ ]", Layout::Desktop),
            "You: hi"
        );
    }

    #[test]
    fn narrow_layout_folds_sources_into_one_line() {
        assert_eq!(
            format_message(&answer(), "[ ]", Layout::Mobile),
            "Yaseen [ ]: Answer\n  [Q 2:255 | Bukhari 1/2 | 90%]"
        );
        assert_eq!(
            format_message(&Message::assistant("bare"), "[ ]", Layout::Mobile),
            "Yaseen [ ]: bare"
        );
    }

    #[tokio::test]
    async fn layout_follows_terminal_columns_once_hydrated() {
        let feedback = FeedbackStore::new(MemoryStore::new());

        let mut narrow = Renderer::new(&feedback);
        assert_eq!(narrow.layout, Layout::Desktop);
        narrow.hydrate(&TerminalViewport { columns: Some(60) }).await;
        assert_eq!(narrow.layout, Layout::Mobile);

        let mut wide = Renderer::new(&feedback);
        wide.hydrate(&TerminalViewport { columns: Some(120) }).await;
        assert_eq!(wide.layout, Layout::Desktop);

        let mut unknown = Renderer::new(&feedback);
        unknown.hydrate(&TerminalViewport { columns: None }).await;
        assert_eq!(unknown.layout, Layout::Desktop);
    }

    #[test]
    fn reset_merged_with_next_question_starts_a_new_transcript() {
        let feedback = FeedbackStore::new(MemoryStore::new());
        let mut renderer = Renderer::new(&feedback);

        let first = renderer.frame(&snapshot(0, vec![Message::user("first")]), false);
        assert_eq!(first, ["You: first"]);

        // `/reset` then a question, observed as a single update
        let next = renderer.frame(&snapshot(1, vec![Message::user("second")]), false);
        assert_eq!(next, ["-- new conversation --", "You: second"]);

        assert!(renderer
            .frame(&snapshot(1, vec![Message::user("second")]), false)
            .is_empty());
    }

    #[test]
    fn markers_stay_neutral_until_hydrated() {
        let feedback = FeedbackStore::new(MemoryStore::new());
        let reply = Message::assistant("ok");
        feedback.rate_message(&reply, Rating::Up).unwrap();

        let mut renderer = Renderer::new(&feedback);
        assert_eq!(renderer.marker(&reply), RATING_PLACEHOLDER);
        renderer.gate.mark_ready();
        assert_eq!(renderer.marker(&reply), "[+]");
    }

    #[test]
    fn rating_marker_reflects_selection() {
        assert_eq!(rating_marker(None), "[ ]");
        assert_eq!(rating_marker(Some(Rating::Up)), "[+]");
        assert_eq!(rating_marker(Some(Rating::Down)), "[-]");
    }
}
